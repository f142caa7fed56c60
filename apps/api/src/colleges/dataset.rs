//! Dataset collaborator: static college ranking files served over HTTP.
//!
//! No authentication, no retry. The bounded wait comes from `DATASET_TIMEOUT_SECS`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::colleges::field_mapper::FieldTag;

/// One flat dataset row (name, state, city, rank, ...). Carried opaquely.
pub type CollegeRecord = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dataset {filename} returned status {status}")]
    Status { filename: String, status: u16 },

    #[error("dataset {0} is not a JSON array of records")]
    Shape(String),
}

#[async_trait]
pub trait CollegeDataset: Send + Sync {
    async fn fetch(&self, filename: &str) -> Result<Vec<CollegeRecord>, DatasetError>;
}

pub struct HttpCollegeDataset {
    client: Client,
    base_url: String,
}

impl HttpCollegeDataset {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CollegeDataset for HttpCollegeDataset {
    async fn fetch(&self, filename: &str) -> Result<Vec<CollegeRecord>, DatasetError> {
        let url = format!("{}/{}", self.base_url, filename);
        debug!("Fetching dataset {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                filename: filename.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        records_from_value(filename, body)
    }
}

fn records_from_value(filename: &str, body: Value) -> Result<Vec<CollegeRecord>, DatasetError> {
    let Value::Array(rows) = body else {
        return Err(DatasetError::Shape(filename.to_string()));
    };
    // Non-object rows carry no location and can never match a filter.
    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect())
}

/// Which location attribute a query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    State,
    City,
}

impl std::str::FromStr for LocationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(LocationKind::State),
            "city" => Ok(LocationKind::City),
            other => Err(format!("location type must be 'state' or 'city', got '{other}'")),
        }
    }
}

/// Ranking file per field.
pub fn dataset_file(field: FieldTag) -> &'static str {
    match field {
        FieldTag::Engineering => "engineering_ranking.json",
        FieldTag::Medical => "medical_ranking.json",
        FieldTag::Management => "management_ranking.json",
        FieldTag::Agriculture => "allAgriculture.json",
        FieldTag::Dental => "dental_ranking.json",
        FieldTag::Law => "law_ranking.json",
        FieldTag::Pharmacy => "pharmacy_ranking.json",
        FieldTag::Architecture => "architecture_ranking.json",
    }
}

/// Attribute holding the location in a field's dataset. The agriculture file
/// capitalizes its keys (`State`/`City`), every other file uses lowercase.
fn location_attribute(field: FieldTag, kind: LocationKind) -> &'static str {
    match (field, kind) {
        (FieldTag::Agriculture, LocationKind::State) => "State",
        (FieldTag::Agriculture, LocationKind::City) => "City",
        (_, LocationKind::State) => "state",
        (_, LocationKind::City) => "city",
    }
}

/// Case-insensitive equality filter on the location attribute, preserving dataset order.
pub fn filter_by_location(
    records: &[CollegeRecord],
    field: FieldTag,
    kind: LocationKind,
    location: &str,
) -> Vec<CollegeRecord> {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return Vec::new();
    }
    let attribute = location_attribute(field, kind);
    records
        .iter()
        .filter(|record| {
            record
                .get(attribute)
                .and_then(Value::as_str)
                .is_some_and(|value| value.trim().to_lowercase() == location)
        })
        .cloned()
        .collect()
}

/// Fetches a field's file and filters it. Errors are returned, not absorbed;
/// callers decide the policy.
pub async fn query_field(
    dataset: &dyn CollegeDataset,
    field: FieldTag,
    kind: LocationKind,
    location: &str,
) -> Result<Vec<CollegeRecord>, DatasetError> {
    if location.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records = dataset.fetch(dataset_file(field)).await?;
    Ok(filter_by_location(&records, field, kind, location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<CollegeRecord> {
        records_from_value("test.json", value).unwrap()
    }

    #[test]
    fn test_filter_state_case_insensitive() {
        let records = rows(json!([
            {"name": "IISc", "state": "Karnataka", "city": "Bangalore"},
            {"name": "IIT Madras", "state": "Tamil Nadu", "city": "Chennai"},
            {"name": "RVCE", "state": "KARNATAKA", "city": "Bangalore"}
        ]));
        let hits =
            filter_by_location(&records, FieldTag::Engineering, LocationKind::State, "karnataka");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["name"], "IISc");
        assert_eq!(hits[1]["name"], "RVCE");
    }

    #[test]
    fn test_agriculture_uses_capitalized_keys() {
        let records = rows(json!([
            {"Name": "UAS Bangalore", "State": "Karnataka", "City": "Bangalore"},
            {"name": "Lowercase row", "state": "Karnataka", "city": "Bangalore"}
        ]));
        let hits =
            filter_by_location(&records, FieldTag::Agriculture, LocationKind::City, "Bangalore");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["Name"], "UAS Bangalore");

        let engineering =
            filter_by_location(&records, FieldTag::Engineering, LocationKind::City, "Bangalore");
        assert_eq!(engineering.len(), 1);
        assert_eq!(engineering[0]["name"], "Lowercase row");
    }

    #[test]
    fn test_empty_location_matches_nothing() {
        let records = rows(json!([{"name": "No state", "state": ""}]));
        assert!(filter_by_location(&records, FieldTag::Law, LocationKind::State, "  ").is_empty());
    }

    #[test]
    fn test_non_array_body_is_shape_error() {
        let result = records_from_value("law_ranking.json", json!({"detail": "moved"}));
        assert!(matches!(result, Err(DatasetError::Shape(_))));
    }

    #[test]
    fn test_non_object_rows_are_skipped() {
        let records = rows(json!([1, "x", {"name": "Real", "state": "Goa"}]));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_location_kind_parse() {
        assert_eq!("State".parse::<LocationKind>(), Ok(LocationKind::State));
        assert_eq!("city".parse::<LocationKind>(), Ok(LocationKind::City));
        assert!("district".parse::<LocationKind>().is_err());
    }

    #[test]
    fn test_every_field_has_a_dataset_file() {
        for field in FieldTag::ALL {
            assert!(dataset_file(field).ends_with(".json"));
        }
    }
}
