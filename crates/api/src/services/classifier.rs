//! Intent-classifier adapter boundary.
//!
//! Natural-language understanding is delegated to an external service; this
//! module owns the seam. The wire reply is an open map of strings, and
//! everything crossing into the core is converted to the closed domain
//! enums here — unknown action tags, table names, or filter keys are
//! rejected at this boundary, never deeper in execution.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use domain::models::{
    DateComparison, FilterSet, LogTable, OperationAction, OperationDescriptor,
};

use crate::config::ClassifierConfig;

/// Raw classifier reply as it arrives off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifiedIntent {
    pub action: String,
    pub table: Option<String>,
    #[serde(default)]
    pub filters: HashMap<String, String>,
    #[serde(default)]
    pub confidence: f64,
}

/// Classifier adapter failures. Unreachable/misbehaving service is an
/// infrastructure problem, distinct from a reply the boundary rejects.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier service unavailable: {0}")]
    Unavailable(String),

    #[error("classifier reply rejected: {0}")]
    Rejected(String),
}

/// External natural-language classifier, specified at its interface
/// boundary only.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<ClassifiedIntent, ClassifierError>;
}

/// HTTP adapter posting the message to the external classifier service.
pub struct HttpIntentClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIntentClassifier {
    /// Builds the adapter, or `None` when no classifier URL is configured.
    pub fn from_config(config: &ClassifierConfig) -> Option<Self> {
        if config.url.is_empty() {
            return None;
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;
        Some(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IntentClassifier for HttpIntentClassifier {
    async fn classify(&self, message: &str) -> Result<ClassifiedIntent, ClassifierError> {
        let url = format!("{}/classify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        response
            .json::<ClassifiedIntent>()
            .await
            .map_err(|e| ClassifierError::Rejected(e.to_string()))
    }
}

/// Converts a classifier reply into a descriptor, enforcing the closed
/// enums and filter-key set.
pub fn descriptor_from_intent(
    intent: &ClassifiedIntent,
) -> Result<OperationDescriptor, ClassifierError> {
    let action = OperationAction::from_str(&intent.action)
        .map_err(ClassifierError::Rejected)?;

    let table_name = intent.table.as_deref().ok_or_else(|| {
        ClassifierError::Rejected("no target table identified; name the table".into())
    })?;
    let table = LogTable::from_str(table_name).map_err(ClassifierError::Rejected)?;

    let filters = filters_from_map(&intent.filters)?;

    let descriptor = match action {
        OperationAction::Select => OperationDescriptor::select(table, filters),
        OperationAction::Archive => OperationDescriptor::archive(table, filters),
        OperationAction::Delete => OperationDescriptor::delete_archived(table, filters),
    };

    Ok(descriptor.with_confidence(intent.confidence))
}

fn filters_from_map(map: &HashMap<String, String>) -> Result<FilterSet, ClassifierError> {
    let mut filters = FilterSet::default();
    for (key, value) in map {
        match key.as_str() {
            "date_filter" => filters.date_filter = Some(value.clone()),
            "date_start" => filters.date_start = Some(value.clone()),
            "date_end" => filters.date_end = Some(value.clone()),
            "date_comparison" => {
                filters.date_comparison =
                    Some(DateComparison::from_str(value).map_err(ClassifierError::Rejected)?)
            }
            "agent_name" => filters.agent_name = Some(value.clone()),
            "server_name" => filters.server_name = Some(value.clone()),
            "user_id" => filters.user_id = Some(value.clone()),
            "device_id" => filters.device_id = Some(value.clone()),
            other => {
                return Err(ClassifierError::Rejected(format!(
                    "unknown filter key: {}",
                    other
                )))
            }
        }
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(action: &str, table: Option<&str>) -> ClassifiedIntent {
        ClassifiedIntent {
            action: action.into(),
            table: table.map(String::from),
            filters: HashMap::new(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_descriptor_from_archive_intent() {
        let mut i = intent("archive", Some("dsiactivities"));
        i.filters
            .insert("date_filter".into(), "older_than_10_days".into());
        let d = descriptor_from_intent(&i).unwrap();
        assert_eq!(d.action, OperationAction::Archive);
        assert_eq!(d.table, LogTable::DsiActivities);
        assert_eq!(d.confidence, 0.9);
        assert_eq!(d.filters.date_filter.as_deref(), Some("older_than_10_days"));
    }

    #[test]
    fn test_delete_intent_targets_archive_table() {
        let d = descriptor_from_intent(&intent("delete", Some("dsitransactionlog"))).unwrap();
        assert!(d.is_archive_target);
    }

    #[test]
    fn test_unknown_action_rejected_at_boundary() {
        assert!(matches!(
            descriptor_from_intent(&intent("truncate", Some("dsiactivities"))),
            Err(ClassifierError::Rejected(_))
        ));
    }

    #[test]
    fn test_missing_table_rejected() {
        assert!(matches!(
            descriptor_from_intent(&intent("archive", None)),
            Err(ClassifierError::Rejected(_))
        ));
    }

    #[test]
    fn test_unknown_filter_key_rejected() {
        let mut i = intent("select", Some("dsiactivities"));
        i.filters.insert("drop_table".into(), "yes".into());
        assert!(matches!(
            descriptor_from_intent(&i),
            Err(ClassifierError::Rejected(_))
        ));
    }
}
