// Handlers: version, migration trigger, timeshift dispatcher

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};

use super::AppState;
use crate::errors::AppError;
use crate::models::{MigrationRequest, QueuedRecord};
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /api/migrate — validates the request body and enqueues it for the
/// migration worker. 200 with the echoed request on success.
pub(super) async fn migrate_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let request = MigrationRequest::from_value(&body)?;
    tracing::info!(
        namespace = %request.namespace,
        metric = %request.metric_name,
        destination_key = %request.destination_key,
        "migration request received"
    );

    let record = QueuedRecord::new(body.to_string());
    let message_id = record.message_id.clone();
    state
        .queue_tx
        .try_send(record)
        .map_err(|e| AppError::Internal(format!("enqueue failed: {e}")))?;

    Ok(Json(json!({
        "request": body,
        "messageId": message_id,
        "message": "Query request received successfully",
    })))
}

/// POST /api/timeshift — dispatches a query-interface event.
pub(super) async fn timeshift_handler(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let payload = state.timeshift.dispatch(event).await?;
    Ok(Json(payload))
}
