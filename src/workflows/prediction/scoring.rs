use super::classifier::RiskModelError;
use super::domain::{EsgWeights, ImpactScores};

/// Composite ESG score: exact weighted sum of the environment, community
/// (social weight), and governance impact values. The customers value is
/// intentionally absent from the formula; it only feeds the narrative report.
pub fn esg_score(scores: &ImpactScores, weights: &EsgWeights) -> f64 {
    weights.environment * scores.environment
        + weights.social * scores.community
        + weights.governance * scores.governance
}

/// Affine map from an ESG score to a risk probability, clamped to [0, 1].
pub fn risk_from_score(esg_score: f64) -> f64 {
    ((100.0 - esg_score) / 100.0).clamp(0.0, 1.0)
}

/// Strategy seam for deriving the risk probability. The formula variant is
/// the live path; the classifier variant exists for installs that ship the
/// trained scaler/model artifacts.
pub trait RiskEstimationStrategy: Send + Sync {
    fn estimate(&self, esg_score: f64, scores: &ImpactScores) -> Result<f64, RiskModelError>;

    /// Short name used in logs and the CLI rendering.
    fn name(&self) -> &'static str;
}

/// Live estimation path: risk derived directly from the ESG score.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormulaRisk;

impl RiskEstimationStrategy for FormulaRisk {
    fn estimate(&self, esg_score: f64, _scores: &ImpactScores) -> Result<f64, RiskModelError> {
        Ok(risk_from_score(esg_score))
    }

    fn name(&self) -> &'static str {
        "formula"
    }
}
