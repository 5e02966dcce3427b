use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ImpactScores, PredictionResult, ReadinessBand, RiskBand};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionId(pub String);

/// One persisted prediction: the requesting user, the original inputs, and
/// the immutable result, stamped at insertion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: PredictionId,
    pub username: String,
    pub company_name: String,
    pub scores: ImpactScores,
    pub result: PredictionResult,
    pub recorded_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn view(&self) -> PredictionView {
        PredictionView {
            id: self.id.clone(),
            username: self.username.clone(),
            company_name: self.company_name.clone(),
            impact_area_community: self.scores.community,
            impact_area_environment: self.scores.environment,
            impact_area_customers: self.scores.customers,
            impact_area_governance: self.scores.governance,
            certification_cycle: self.scores.certification_cycle,
            esg_score: self.result.esg_score,
            risk_probability: self.result.risk_probability,
            readiness: ReadinessBand::from_score(self.result.esg_score).label().to_string(),
            risk_band: RiskBand::from_probability(self.result.risk_probability)
                .label()
                .to_string(),
            llm_report: self.result.llm_report.clone(),
            llm_error: self.result.llm_error.clone(),
            recorded_at: self.recorded_at,
        }
    }
}

/// Serialized shape returned by the API and rendered by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionView {
    pub id: PredictionId,
    pub username: String,
    pub company_name: String,
    pub impact_area_community: f64,
    pub impact_area_environment: f64,
    pub impact_area_customers: f64,
    pub impact_area_governance: f64,
    pub certification_cycle: i64,
    pub esg_score: f64,
    pub risk_probability: f64,
    pub readiness: String,
    pub risk_band: String,
    pub llm_report: String,
    pub llm_error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait PredictionRepository: Send + Sync {
    fn insert(&self, record: PredictionRecord) -> Result<PredictionRecord, RepositoryError>;
    fn fetch(&self, id: &PredictionId) -> Result<Option<PredictionRecord>, RepositoryError>;
    fn remove(&self, id: &PredictionId) -> Result<(), RepositoryError>;
    /// History for one user, newest first.
    fn history(&self, username: &str, limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default, Clone)]
pub struct InMemoryPredictionRepository {
    records: Arc<Mutex<HashMap<PredictionId, PredictionRecord>>>,
}

impl PredictionRepository for InMemoryPredictionRepository {
    fn insert(&self, record: PredictionRecord) -> Result<PredictionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &PredictionId) -> Result<Option<PredictionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &PredictionId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn history(&self, username: &str, limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut matching: Vec<PredictionRecord> = guard
            .values()
            .filter(|record| record.username == username)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str, username: &str, offset_minutes: i64) -> PredictionRecord {
        PredictionRecord {
            id: PredictionId(id.to_string()),
            username: username.to_string(),
            company_name: "Solaria Energy".to_string(),
            scores: ImpactScores {
                community: 60.0,
                environment: 80.0,
                customers: 55.0,
                governance: 70.0,
                certification_cycle: 1,
            },
            result: PredictionResult {
                esg_score: 72.0,
                risk_probability: 0.28,
                llm_report: "report".to_string(),
                llm_error: None,
            },
            recorded_at: Utc::now() + Duration::minutes(offset_minutes),
        }
    }

    #[test]
    fn insert_then_fetch_round_trips() {
        let repository = InMemoryPredictionRepository::default();
        let stored = repository.insert(record("pred-000001", "ada", 0)).expect("inserts");
        let fetched = repository
            .fetch(&stored.id)
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(fetched.result.esg_score, 72.0);
    }

    #[test]
    fn duplicate_ids_conflict() {
        let repository = InMemoryPredictionRepository::default();
        repository.insert(record("pred-000001", "ada", 0)).expect("inserts");
        let err = repository.insert(record("pred-000001", "ada", 1)).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict));
    }

    #[test]
    fn history_is_per_user_newest_first_and_limited() {
        let repository = InMemoryPredictionRepository::default();
        repository.insert(record("pred-000001", "ada", 0)).expect("inserts");
        repository.insert(record("pred-000002", "ada", 5)).expect("inserts");
        repository.insert(record("pred-000003", "grace", 10)).expect("inserts");

        let history = repository.history("ada", 10).expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id.0, "pred-000002");

        let limited = repository.history("ada", 1).expect("history");
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn remove_deletes_the_record_or_reports_not_found() {
        let repository = InMemoryPredictionRepository::default();
        let stored = repository.insert(record("pred-000001", "ada", 0)).expect("inserts");

        repository.remove(&stored.id).expect("removes");
        assert!(repository.fetch(&stored.id).expect("fetch succeeds").is_none());

        let err = repository.remove(&stored.id).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn view_labels_follow_the_buckets() {
        let view = record("pred-000001", "ada", 0).view();
        assert_eq!(view.readiness, "Good");
        assert_eq!(view.risk_band, "Low");
    }

    #[test]
    fn view_carries_the_submitted_inputs() {
        let view = record("pred-000001", "ada", 0).view();
        assert_eq!(view.impact_area_community, 60.0);
        assert_eq!(view.impact_area_environment, 80.0);
        assert_eq!(view.impact_area_customers, 55.0);
        assert_eq!(view.impact_area_governance, 70.0);
        assert_eq!(view.certification_cycle, 1);
    }
}
