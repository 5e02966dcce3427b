//! Green finance risk prediction service.
//!
//! The crate exposes one workflow: a caller picks a company from the tabular
//! directory, submits qualitative impact scores, and receives a composite ESG
//! score, a derived risk probability, and a markdown investment report
//! produced by a remote completion service (or a deterministic local fallback
//! when that service is unavailable).

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
