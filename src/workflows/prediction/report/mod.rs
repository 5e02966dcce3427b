//! Narrative investment report generation.
//!
//! The generator owns prompt construction and the single remote call; it
//! deliberately does NOT hide failures behind an internal fallback. Callers
//! receive a typed error and decide whether to render the deterministic
//! local report via [`ReportGenerator::fallback_report`].

mod fallback;
mod prompt;

use tracing::info;

use super::domain::{CompanyDetails, ImpactScores};
use super::llm::{CompletionGateway, ReportGenerationError};

/// Everything the report narrates: the company row, the four impact values
/// with the certification cycle, and the two computed figures.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub details: &'a CompanyDetails,
    pub scores: &'a ImpactScores,
    pub esg_score: f64,
    pub risk_probability: f64,
}

pub struct ReportGenerator {
    gateway: Box<dyn CompletionGateway>,
}

impl ReportGenerator {
    pub fn new(gateway: Box<dyn CompletionGateway>) -> Self {
        Self { gateway }
    }

    /// Primary path: one single-turn completion request, first choice
    /// returned verbatim. No retries.
    pub fn generate(&self, inputs: &ReportInputs<'_>) -> Result<String, ReportGenerationError> {
        let payload = prompt::payload(inputs);
        let refined = prompt::instructional(&payload);
        let report = self.gateway.complete(&refined)?;
        info!(
            company = %inputs.details.company_name,
            report_bytes = report.len(),
            "completion service returned a report"
        );
        Ok(report)
    }

    /// Deterministic substitute following the same nine-section outline,
    /// derived by re-parsing the payload the primary path would have sent.
    pub fn fallback_report(&self, inputs: &ReportInputs<'_>) -> String {
        fallback::render(&prompt::payload(inputs))
    }
}
