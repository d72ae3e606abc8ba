// Timeshift tests: dispatcher states, argument stripping, timestamp shifting

mod common;

use common::{FailingDelegate, StaticDelegate};
use metricshift::errors::AppError;
use metricshift::timeshift::{TimeshiftService, describe, shift_timestamps};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn get_metric_data_event(duration: &str) -> serde_json::Value {
    json!({
        "EventType": "GetMetricData",
        "GetMetricDataRequest": {
            "StartTime": 0,
            "EndTime": 3600,
            "Period": 300,
            "Arguments": ["archived-metrics", "test-key-01", duration],
        },
    })
}

fn delegate_payload() -> serde_json::Value {
    json!({
        "MetricDataResults": [
            {
                "StatusCode": "Complete",
                "Label": "X-Sum",
                "Timestamps": [0, 60, 120],
                "Values": [1.0, 2.0, 3.0],
            },
        ],
    })
}

#[test]
fn test_shift_adds_offset_to_every_timestamp() {
    let mut payload = delegate_payload();
    shift_timestamps(&mut payload, 120).unwrap();
    assert_eq!(
        payload["MetricDataResults"][0]["Timestamps"],
        json!([120, 180, 240])
    );
    // values, order and other fields untouched
    assert_eq!(
        payload["MetricDataResults"][0]["Values"],
        json!([1.0, 2.0, 3.0])
    );
    assert_eq!(payload["MetricDataResults"][0]["Label"], json!("X-Sum"));
}

#[test]
fn test_shift_truncates_after_addition() {
    let mut payload = json!({
        "MetricDataResults": [{"Timestamps": [10.9], "Values": [1.0]}],
    });
    shift_timestamps(&mut payload, 0).unwrap();
    assert_eq!(payload["MetricDataResults"][0]["Timestamps"], json!([10]));
}

#[test]
fn test_shift_skips_series_without_timestamps() {
    let mut payload = json!({
        "MetricDataResults": [
            {"Messages": ["no data"]},
            {"Timestamps": [0], "Values": [1.0]},
        ],
    });
    shift_timestamps(&mut payload, 60).unwrap();
    assert_eq!(payload["MetricDataResults"][0], json!({"Messages": ["no data"]}));
    assert_eq!(payload["MetricDataResults"][1]["Timestamps"], json!([60]));
}

#[test]
fn test_shift_rejects_payload_without_result_collection() {
    let mut payload = json!({"Messages": []});
    let err = shift_timestamps(&mut payload, 60).unwrap_err();
    assert!(matches!(err, AppError::MalformedResponse(_)));
}

#[test]
fn test_shift_rejects_non_numeric_timestamp() {
    let mut payload = json!({
        "MetricDataResults": [{"Timestamps": ["noon"], "Values": [1.0]}],
    });
    let err = shift_timestamps(&mut payload, 60).unwrap_err();
    assert!(matches!(err, AppError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_dispatch_strips_duration_and_shifts_response() {
    let delegate = Arc::new(StaticDelegate::new(delegate_payload()));
    let service = TimeshiftService::new(delegate.clone());

    let payload = service
        .dispatch(get_metric_data_event("PT2M"))
        .await
        .unwrap();
    assert_eq!(
        payload["MetricDataResults"][0]["Timestamps"],
        json!([120, 180, 240])
    );

    // the delegate saw the two-argument form, everything else verbatim
    let seen = delegate.last_event.lock().unwrap().clone().unwrap();
    assert_eq!(
        seen["GetMetricDataRequest"]["Arguments"],
        json!(["archived-metrics", "test-key-01"])
    );
    assert_eq!(seen["GetMetricDataRequest"]["Period"], json!(300));
}

#[tokio::test]
async fn test_dispatch_rejects_invalid_duration_before_delegating() {
    let delegate = Arc::new(StaticDelegate::new(delegate_payload()));
    let service = TimeshiftService::new(delegate.clone());

    let err = service
        .dispatch(get_metric_data_event("2 weeks"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDuration(_)));
    assert_eq!(delegate.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dispatch_requires_three_arguments() {
    let delegate = Arc::new(StaticDelegate::new(delegate_payload()));
    let service = TimeshiftService::new(delegate);

    let event = json!({
        "EventType": "GetMetricData",
        "GetMetricDataRequest": {"Arguments": ["archived-metrics", "test-key-01"]},
    });
    let err = service.dispatch(event).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("at least 3 arguments"));
}

#[tokio::test]
async fn test_dispatch_surfaces_delegate_failure() {
    let service = TimeshiftService::new(Arc::new(FailingDelegate));
    let err = service
        .dispatch(get_metric_data_event("P0D"))
        .await
        .unwrap_err();
    match err {
        AppError::UpstreamUnavailable(message) => {
            assert!(message.contains("delegate exploded"));
        }
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatch_rejects_missing_event_type() {
    let service = TimeshiftService::new(Arc::new(FailingDelegate));
    let err = service.dispatch(json!({})).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_dispatch_rejects_unknown_event_type() {
    let service = TimeshiftService::new(Arc::new(FailingDelegate));
    let err = service
        .dispatch(json!({"EventType": "PutMetricData"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid EventType"));
}

#[tokio::test]
async fn test_describe_is_static_and_makes_no_delegate_call() {
    let delegate = Arc::new(StaticDelegate::new(delegate_payload()));
    let service = TimeshiftService::new(delegate.clone());

    let descriptor = service
        .dispatch(json!({"EventType": "DescribeGetMetricData"}))
        .await
        .unwrap();
    assert_eq!(descriptor, describe());
    assert_eq!(
        descriptor["DataSourceConnectorName"],
        json!("metricshift-timeshift")
    );
    assert_eq!(descriptor["ArgumentDefaults"].as_array().unwrap().len(), 3);
    assert_eq!(descriptor["ArgumentDefaults"][2]["Value"], json!("P0D"));
    assert!(
        descriptor["Description"]
            .as_str()
            .unwrap()
            .contains("ISO 8601")
    );
    assert_eq!(delegate.calls.load(Ordering::SeqCst), 0);
}
