// Migration request, queued work records and batch reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Dimension, Statistic};
use crate::errors::AppError;

/// One migration unit of work, as posted to the trigger endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    pub namespace: String,
    pub metric_name: String,
    /// Request-side dimension filter; empty matches zero-dimension series only.
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Prefix for output column labels ("<destination>-<statistic>").
    pub destination_metric_name: String,
    /// Object key the archive is uploaded to.
    pub destination_key: String,
    pub cloudwatch_stats: Vec<Statistic>,
}

impl MigrationRequest {
    /// Parses and validates a queued JSON body.
    pub fn from_json(body: &str) -> Result<Self, AppError> {
        let request: MigrationRequest =
            serde_json::from_str(body).map_err(|e| AppError::Validation(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let request: MigrationRequest =
            serde_json::from_value(body.clone()).map_err(|e| AppError::Validation(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.namespace.is_empty() {
            return Err(AppError::validation("No namespace found in body"));
        }
        if self.metric_name.is_empty() {
            return Err(AppError::validation("No metricName found in body"));
        }
        if self.destination_metric_name.is_empty() {
            return Err(AppError::validation(
                "No destination metric name found in body",
            ));
        }
        if self.destination_key.is_empty() {
            return Err(AppError::validation("No destination key found in body"));
        }
        if self.start_time > self.end_time {
            return Err(AppError::validation(
                "startTime must not be later than endTime",
            ));
        }
        if self.cloudwatch_stats.is_empty() {
            return Err(AppError::Validation(format!(
                "cloudwatchStats must contain at least one statistic to migrate; valid stats are {:?}",
                Statistic::ALL.map(|s| s.as_str())
            )));
        }
        Ok(())
    }
}

/// One queued unit of work. The message id is the failure marker identifier
/// in batch reports.
#[derive(Debug, Clone)]
pub struct QueuedRecord {
    pub message_id: String,
    /// Raw JSON body; the worker re-derives the request from it.
    pub body: String,
}

impl QueuedRecord {
    pub fn new(body: String) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Per-batch outcome report; empty failures on full success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}
