//! Per-company result data structures.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Tier;

/// Result for a single company after full pipeline processing.
///
/// Created only when both a career page and a position were found; never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct JobSourceResult {
    pub company_name: String,
    pub career_page_url: String,
    pub open_position_url: String,
    pub timestamp: DateTime<Utc>,
    pub source_tier: Tier,
    pub processing_time_seconds: f64,
}

/// The serialized shape of a result in the report file.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub company_name: String,
    pub career_page_url: String,
    pub open_position_url: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&JobSourceResult> for ResultRecord {
    fn from(result: &JobSourceResult) -> Self {
        Self {
            company_name: result.company_name.clone(),
            career_page_url: result.career_page_url.clone(),
            open_position_url: result.open_position_url.clone(),
            timestamp: result.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_report_fields_only() {
        let result = JobSourceResult {
            company_name: "Acme".to_string(),
            career_page_url: "https://acme.com/careers".to_string(),
            open_position_url: "https://acme.com/careers/123".to_string(),
            timestamp: Utc::now(),
            source_tier: Tier::HomepageScrape,
            processing_time_seconds: 1.25,
        };

        let record = ResultRecord::from(&result);
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(object["company_name"], "Acme");
        assert_eq!(object["career_page_url"], "https://acme.com/careers");
        assert_eq!(object["open_position_url"], "https://acme.com/careers/123");
        assert!(object["timestamp"].is_string());
    }
}
