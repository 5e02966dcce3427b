use serde::{Deserialize, Serialize};

/// Caller-supplied qualitative inputs for one prediction request.
///
/// All four impact values are free-range floats; the certification cycle is
/// an integer counting elapsed certification periods. None of the fields are
/// range-validated beyond numeric parsing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactScores {
    pub community: f64,
    pub environment: f64,
    pub customers: f64,
    pub governance: f64,
    pub certification_cycle: i64,
}

impl ImpactScores {
    /// Feature ordering expected by the trained classifier artifacts.
    pub fn feature_vector(&self) -> [f64; 5] {
        [
            self.community,
            self.customers,
            self.environment,
            self.governance,
            self.certification_cycle as f64,
        ]
    }

    pub fn all_finite(&self) -> bool {
        self.community.is_finite()
            && self.environment.is_finite()
            && self.customers.is_finite()
            && self.governance.is_finite()
    }
}

/// One row of the company directory, cleaned for narrative use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub company_name: String,
    pub country: String,
    pub industry_category: String,
    pub sector: String,
    pub industry: String,
    pub products_and_services: String,
    pub description: String,
}

/// Outcome of one pipeline run. Immutable once built, persisted verbatim.
///
/// `esg_score` is notionally 0-100 but the upper bound is not enforced;
/// `risk_probability` is always clamped to [0, 1]. `llm_error` is populated
/// whenever `llm_report` came from the local fallback instead of the remote
/// completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub esg_score: f64,
    pub risk_probability: f64,
    pub llm_report: String,
    pub llm_error: Option<String>,
}

/// Category weights for the composite ESG score. The weights must sum to 1.0;
/// `AppConfig` validates that at load time. Community maps onto the social
/// weight, and the customers impact value carries no weight at all: it is
/// narrated in the report but never scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsgWeights {
    pub environment: f64,
    pub social: f64,
    pub governance: f64,
}

impl EsgWeights {
    pub fn sum(&self) -> f64 {
        self.environment + self.social + self.governance
    }
}

impl Default for EsgWeights {
    fn default() -> Self {
        Self {
            environment: 0.5,
            social: 0.3,
            governance: 0.2,
        }
    }
}

/// Green finance readiness bucket for an ESG score out of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessBand {
    Good,
    Fair,
    Poor,
}

impl ReadinessBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

/// Qualitative bucket for a risk probability in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    High,
    Moderate,
    Low,
}

impl RiskBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.7 {
            Self::High
        } else if probability >= 0.3 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}
