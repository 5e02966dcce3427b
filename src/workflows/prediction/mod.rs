//! Green finance prediction workflow.
//!
//! A single linear pipeline: compute the composite ESG score from the
//! weighted impact values, derive the risk probability through the selected
//! strategy, then narrate the result via the remote completion service with
//! a deterministic local fallback. One record is persisted per request.

pub mod classifier;
pub mod directory;
pub mod domain;
pub mod llm;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

pub use classifier::{ClassifierArtifact, ModelRisk, RiskModelError, ScalerArtifact};
pub use directory::{clean_text, CompanyDirectory, DirectoryError};
pub use domain::{
    CompanyDetails, EsgWeights, ImpactScores, PredictionResult, ReadinessBand, RiskBand,
};
pub use llm::{
    CompletionGateway, DisabledCompletionGateway, GroqCompletionClient, ReportGenerationError,
};
pub use report::{ReportGenerator, ReportInputs};
pub use repository::{
    InMemoryPredictionRepository, PredictionId, PredictionRecord, PredictionRepository,
    PredictionView, RepositoryError,
};
pub use router::{prediction_router, PredictionRequest};
pub use scoring::{esg_score, risk_from_score, FormulaRisk, RiskEstimationStrategy};
pub use service::{PredictionError, PredictionService};
