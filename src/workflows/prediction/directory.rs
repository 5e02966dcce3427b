//! Tabular company directory backing the prediction form.
//!
//! The dataset is a CSV loaded once at startup; free-text columns arrive with
//! spreadsheet artifacts (`_x000D_` carriage returns, literal underscores,
//! ragged whitespace) and are sanitized on ingest so the narrative report
//! never sees them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::info;

use super::domain::CompanyDetails;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("unable to read company dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed company dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("company not found: {0}")]
    NotFound(String),
}

/// Load-once, read-many directory keyed by exact company name.
#[derive(Debug, Default, Clone)]
pub struct CompanyDirectory {
    companies: BTreeMap<String, CompanyDetails>,
}

impl CompanyDirectory {
    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let file = File::open(path)?;
        let directory = Self::from_reader(file)?;
        info!(path = %path.display(), companies = directory.len(), "company directory loaded");
        Ok(directory)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut companies = BTreeMap::new();
        for record in csv_reader.deserialize::<CompanyRow>() {
            let row = record?;
            let details = row.into_details();
            companies.insert(details.company_name.clone(), details);
        }

        Ok(Self { companies })
    }

    pub fn lookup(&self, company_name: &str) -> Result<&CompanyDetails, DirectoryError> {
        self.companies
            .get(company_name)
            .ok_or_else(|| DirectoryError::NotFound(company_name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.companies.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    company_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    industry_category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sector: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    industry: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    products_and_services: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

impl CompanyRow {
    fn into_details(self) -> CompanyDetails {
        CompanyDetails {
            company_name: self.company_name.trim().to_string(),
            country: or_unknown(self.country),
            industry_category: or_unknown(self.industry_category),
            sector: or_unknown(self.sector),
            industry: or_unknown(self.industry),
            products_and_services: cleaned_or_unknown(self.products_and_services),
            description: cleaned_or_unknown(self.description),
        }
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

fn cleaned_or_unknown(value: Option<String>) -> String {
    match value {
        Some(raw) => {
            let cleaned = clean_text(&raw);
            if cleaned.is_empty() {
                UNKNOWN.to_string()
            } else {
                cleaned
            }
        }
        None => UNKNOWN.to_string(),
    }
}

/// Normalize free text: strip newlines, spreadsheet `x000D` markers, and
/// underscores, then collapse runs of whitespace to single spaces.
pub fn clean_text(raw: &str) -> String {
    let replaced = raw
        .replace('\n', " ")
        .replace('\r', " ")
        .replace("x000D", "")
        .replace('_', "");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
