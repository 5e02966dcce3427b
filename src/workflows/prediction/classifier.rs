//! Model-based risk estimation from pre-trained artifacts.
//!
//! Installs that ship a trained standard scaler and logistic classifier can
//! select this strategy instead of the score-derived formula. Both artifacts
//! are JSON documents loaded once at startup; a missing or inconsistent file
//! leaves the model path unusable without affecting the formula path.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use super::domain::ImpactScores;
use super::scoring::RiskEstimationStrategy;

pub const SCALER_FILE: &str = "feature_scaler.json";
pub const CLASSIFIER_FILE: &str = "risk_classifier.json";

#[derive(Debug, thiserror::Error)]
pub enum RiskModelError {
    #[error("model artifact unavailable: {0}")]
    ModelLoading(String),
    #[error("feature preprocessing failed: {0}")]
    Preprocessing(String),
    #[error("classifier prediction failed: {0}")]
    Prediction(String),
}

/// Standard-scaler parameters exported from the training run.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerArtifact {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

/// Logistic classifier over the scaled feature vector; `coefficients` follow
/// the `ImpactScores::feature_vector` ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug)]
pub struct ModelRisk {
    scaler: ScalerArtifact,
    classifier: ClassifierArtifact,
}

impl ModelRisk {
    pub fn from_dir(models_dir: &Path) -> Result<Self, RiskModelError> {
        let scaler_path = models_dir.join(SCALER_FILE);
        let classifier_path = models_dir.join(CLASSIFIER_FILE);
        info!(scaler = %scaler_path.display(), classifier = %classifier_path.display(), "loading risk model artifacts");

        let scaler = load_artifact(&scaler_path)?;
        let classifier = load_artifact(&classifier_path)?;
        Self::from_artifacts(scaler, classifier)
    }

    pub fn from_artifacts(
        scaler: ScalerArtifact,
        classifier: ClassifierArtifact,
    ) -> Result<Self, RiskModelError> {
        if scaler.means.len() != scaler.scales.len() {
            return Err(RiskModelError::ModelLoading(format!(
                "scaler has {} means but {} scales",
                scaler.means.len(),
                scaler.scales.len()
            )));
        }
        if scaler.means.len() != classifier.coefficients.len() {
            return Err(RiskModelError::ModelLoading(format!(
                "scaler expects {} features but classifier has {} coefficients",
                scaler.means.len(),
                classifier.coefficients.len()
            )));
        }
        if scaler.scales.iter().any(|scale| *scale == 0.0 || !scale.is_finite()) {
            return Err(RiskModelError::ModelLoading(
                "scaler contains a zero or non-finite scale".to_string(),
            ));
        }

        Ok(Self { scaler, classifier })
    }

    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, RiskModelError> {
        if features.len() != self.scaler.means.len() {
            return Err(RiskModelError::Preprocessing(format!(
                "expected {} features, got {}",
                self.scaler.means.len(),
                features.len()
            )));
        }
        if features.iter().any(|value| !value.is_finite()) {
            return Err(RiskModelError::Preprocessing(
                "feature vector contains a non-finite value".to_string(),
            ));
        }

        Ok(features
            .iter()
            .zip(self.scaler.means.iter().zip(self.scaler.scales.iter()))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect())
    }

    /// Class-1 (at-risk) probability from the logistic decision function.
    fn class_one_probability(&self, scaled: &[f64]) -> Result<f64, RiskModelError> {
        let activation: f64 = self.classifier.intercept
            + scaled
                .iter()
                .zip(self.classifier.coefficients.iter())
                .map(|(value, coefficient)| value * coefficient)
                .sum::<f64>();

        if !activation.is_finite() {
            return Err(RiskModelError::Prediction(
                "decision function produced a non-finite activation".to_string(),
            ));
        }

        Ok(sigmoid(activation))
    }
}

impl RiskEstimationStrategy for ModelRisk {
    fn estimate(&self, _esg_score: f64, scores: &ImpactScores) -> Result<f64, RiskModelError> {
        let scaled = self.scale(&scores.feature_vector())?;
        self.class_one_probability(&scaled)
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

fn sigmoid(activation: f64) -> f64 {
    1.0 / (1.0 + (-activation).exp())
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, RiskModelError> {
    let file = File::open(path).map_err(|err| {
        RiskModelError::ModelLoading(format!("{}: {}", path.display(), err))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| {
        RiskModelError::ModelLoading(format!("{}: {}", path.display(), err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> ImpactScores {
        ImpactScores {
            community: 60.0,
            environment: 80.0,
            customers: 55.0,
            governance: 70.0,
            certification_cycle: 2,
        }
    }

    fn strategy() -> ModelRisk {
        let scaler = ScalerArtifact {
            means: vec![50.0; 5],
            scales: vec![10.0; 5],
        };
        let classifier = ClassifierArtifact {
            intercept: 0.0,
            coefficients: vec![-0.5, -0.1, -0.8, -0.3, 0.2],
        };
        ModelRisk::from_artifacts(scaler, classifier).expect("consistent artifacts")
    }

    #[test]
    fn probability_is_bounded_and_favors_strong_scores() {
        let strategy = strategy();
        let strong = strategy.estimate(0.0, &scores()).expect("estimate");
        assert!((0.0..=1.0).contains(&strong));

        let weak = ImpactScores {
            community: 10.0,
            environment: 5.0,
            customers: 10.0,
            governance: 5.0,
            certification_cycle: 0,
        };
        let weak_probability = strategy.estimate(0.0, &weak).expect("estimate");
        assert!(weak_probability > strong);
    }

    #[test]
    fn mismatched_artifacts_are_loading_errors() {
        let scaler = ScalerArtifact {
            means: vec![0.0; 5],
            scales: vec![1.0; 5],
        };
        let classifier = ClassifierArtifact {
            intercept: 0.0,
            coefficients: vec![0.1; 3],
        };
        let err = ModelRisk::from_artifacts(scaler, classifier).unwrap_err();
        assert!(matches!(err, RiskModelError::ModelLoading(_)));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let scaler = ScalerArtifact {
            means: vec![0.0; 2],
            scales: vec![1.0, 0.0],
        };
        let classifier = ClassifierArtifact {
            intercept: 0.0,
            coefficients: vec![0.1, 0.1],
        };
        assert!(ModelRisk::from_artifacts(scaler, classifier).is_err());
    }

    #[test]
    fn non_finite_features_are_preprocessing_errors() {
        let strategy = strategy();
        let mut bad = scores();
        bad.environment = f64::INFINITY;
        let err = strategy.estimate(0.0, &bad).unwrap_err();
        assert!(matches!(err, RiskModelError::Preprocessing(_)));
    }

    #[test]
    fn missing_artifact_directory_reports_loading_error() {
        let err = ModelRisk::from_dir(Path::new("does/not/exist")).unwrap_err();
        assert!(matches!(err, RiskModelError::ModelLoading(_)));
    }
}
