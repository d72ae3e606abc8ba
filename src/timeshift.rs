// Timeshift dispatcher: parse the duration argument, delegate the stripped
// query to the external execution service, shift the response timestamps.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::duration::parse_offset_secs;
use crate::errors::AppError;

const CONNECTOR_NAME: &str = "metricshift-timeshift";

const DESCRIPTION: &str = r#"
## Timeshift a metric that's loaded from a CSV archive.

### Query Arguments
ArgNumber | Type | Description
---|---|---
1 | String | Bucket name (not a URL - just the name)
2 | String | Object key (may include slashes)
3 | String | an ISO 8601 duration string by which all data should be shifted forward.

### ISO 8601 example duration strings

Input String | resulting duration
---|---
P2W | two weeks
P2D | two days
P2W2D | two weeks + two days
PT1M | one minute
P1DT1H | one day + one hour
P1DT1M | one day + one minute
"#;

/// Query-execution service the stripped two-argument request is delegated to.
#[async_trait]
pub trait QueryDelegate: Send + Sync {
    async fn get_metric_data(&self, event: &Value) -> Result<Value, AppError>;
}

pub struct HttpQueryDelegate {
    client: reqwest::Client,
    url: String,
}

impl HttpQueryDelegate {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::upstream)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl QueryDelegate for HttpQueryDelegate {
    async fn get_metric_data(&self, event: &Value) -> Result<Value, AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(AppError::upstream)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "delegate returned {status}: {text}"
            )));
        }
        response.json().await.map_err(AppError::upstream)
    }
}

pub struct TimeshiftService {
    delegate: Arc<dyn QueryDelegate>,
}

impl TimeshiftService {
    pub fn new(delegate: Arc<dyn QueryDelegate>) -> Self {
        Self { delegate }
    }

    /// Dispatches one event by its EventType.
    pub async fn dispatch(&self, event: Value) -> Result<Value, AppError> {
        let event_type = event
            .get("EventType")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::validation("EventType missing from event"))?
            .to_string();
        match event_type.as_str() {
            "GetMetricData" => self.get_metric_data(event).await,
            "DescribeGetMetricData" => Ok(describe()),
            other => Err(AppError::validation(format!("Invalid EventType: {other}"))),
        }
    }

    async fn get_metric_data(&self, mut event: Value) -> Result<Value, AppError> {
        let arguments = event
            .get_mut("GetMetricDataRequest")
            .ok_or_else(|| AppError::validation("GetMetricDataRequest missing from event"))?
            .get_mut("Arguments")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| AppError::validation("Arguments missing from GetMetricDataRequest"))?;
        if arguments.len() < 3 {
            return Err(AppError::Validation(format!(
                "Expected at least 3 arguments (bucket, key, duration), got {}",
                arguments.len()
            )));
        }

        let duration_string = arguments[2]
            .as_str()
            .ok_or_else(|| AppError::InvalidDuration(arguments[2].to_string()))?
            .to_string();
        let offset_secs = parse_offset_secs(&duration_string)?;

        // The delegate only understands the two-argument form.
        arguments.remove(2);

        tracing::info!(
            operation = "delegate_query",
            offset_secs,
            "delegating stripped request"
        );
        let mut payload = self.delegate.get_metric_data(&event).await?;
        shift_timestamps(&mut payload, offset_secs)?;
        Ok(payload)
    }
}

/// Adds `offset_secs` to every timestamp of every result series, in place,
/// truncating after the addition. Series order, sample order and all other
/// fields are untouched; a series without a Timestamps field is skipped.
pub fn shift_timestamps(payload: &mut Value, offset_secs: i64) -> Result<(), AppError> {
    let results = payload
        .get_mut("MetricDataResults")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            AppError::MalformedResponse("MetricDataResults missing from response".into())
        })?;

    for result in results {
        let Some(timestamps) = result.get_mut("Timestamps").and_then(Value::as_array_mut) else {
            continue;
        };
        for timestamp in timestamps.iter_mut() {
            let original = timestamp.as_f64().ok_or_else(|| {
                AppError::MalformedResponse(format!("non-numeric timestamp: {timestamp}"))
            })?;
            *timestamp = Value::from((original + offset_secs as f64) as i64);
        }
    }
    Ok(())
}

/// Static descriptor for DescribeGetMetricData; no I/O.
pub fn describe() -> Value {
    json!({
        "DataSourceConnectorName": CONNECTOR_NAME,
        "ArgumentDefaults": [
            { "Value": "archived-metrics" },
            { "Value": "test-key-01" },
            { "Value": "P0D" },
        ],
        "Description": DESCRIPTION,
    })
}
