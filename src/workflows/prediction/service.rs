use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::classifier::RiskModelError;
use super::domain::{CompanyDetails, EsgWeights, ImpactScores, PredictionResult};
use super::report::{ReportGenerator, ReportInputs};
use super::repository::{
    PredictionId, PredictionRecord, PredictionRepository, RepositoryError,
};
use super::scoring::{self, RiskEstimationStrategy};

/// Orchestrates the linear prediction pipeline: ESG score, risk probability,
/// narrative report, persistence. A report failure never aborts the request;
/// it is recorded on the result and replaced with the deterministic fallback.
pub struct PredictionService<R> {
    weights: EsgWeights,
    risk: Box<dyn RiskEstimationStrategy>,
    reports: ReportGenerator,
    repository: Arc<R>,
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("impact inputs must be finite numbers")]
    NonFiniteInput,
    #[error(transparent)]
    Risk(#[from] RiskModelError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static PREDICTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_prediction_id() -> PredictionId {
    let id = PREDICTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PredictionId(format!("pred-{id:06}"))
}

impl<R> PredictionService<R>
where
    R: PredictionRepository + 'static,
{
    pub fn new(
        weights: EsgWeights,
        risk: Box<dyn RiskEstimationStrategy>,
        reports: ReportGenerator,
        repository: Arc<R>,
    ) -> Self {
        Self {
            weights,
            risk,
            reports,
            repository,
        }
    }

    /// Run the full pipeline for one request and persist the outcome.
    ///
    /// Only a score/risk failure surfaces as an error; report generation is
    /// degraded into `llm_error` plus a locally rendered report.
    pub fn predict(
        &self,
        username: &str,
        details: &CompanyDetails,
        scores: ImpactScores,
    ) -> Result<PredictionRecord, PredictionError> {
        if !scores.all_finite() {
            return Err(PredictionError::NonFiniteInput);
        }

        info!(company = %details.company_name, %username, "starting prediction");

        let esg_score = scoring::esg_score(&scores, &self.weights);
        let risk_probability = self.risk.estimate(esg_score, &scores)?;
        info!(
            esg_score,
            risk_probability,
            strategy = self.risk.name(),
            "computed score and risk"
        );

        let inputs = ReportInputs {
            details,
            scores: &scores,
            esg_score,
            risk_probability,
        };

        let (llm_report, llm_error) = match self.reports.generate(&inputs) {
            Ok(markdown) => (markdown, None),
            Err(err) => {
                warn!(error = %err, "report generation failed, rendering local fallback");
                let fallback = self.reports.fallback_report(&inputs);
                let report = if fallback.trim().is_empty() {
                    minimal_report(&details.company_name, esg_score, risk_probability)
                } else {
                    fallback
                };
                (report, Some(err.to_string()))
            }
        };

        let record = PredictionRecord {
            id: next_prediction_id(),
            username: username.to_string(),
            company_name: details.company_name.clone(),
            scores,
            result: PredictionResult {
                esg_score,
                risk_probability,
                llm_report,
                llm_error,
            },
            recorded_at: Utc::now(),
        };

        Ok(self.repository.insert(record)?)
    }

    pub fn get(&self, id: &PredictionId) -> Result<PredictionRecord, PredictionError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn delete(&self, id: &PredictionId) -> Result<(), PredictionError> {
        Ok(self.repository.remove(id)?)
    }

    pub fn history(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, PredictionError> {
        Ok(self.repository.history(username, limit)?)
    }
}

/// Last-resort inline notice used if the deterministic fallback ever yields
/// an empty document.
fn minimal_report(company_name: &str, esg_score: f64, risk_probability: f64) -> String {
    format!(
        "### {company_name} - Green Finance Report\n\
         \n\
         **Note:** This is a simplified report due to an error in the report service.\n\
         \n\
         #### ESG Score: {esg_score:.2}\n\
         #### Risk Probability: {risk_pct:.2}%\n\
         \n\
         Please try again later for a complete analysis.\n",
        risk_pct = risk_probability * 100.0,
    )
}
