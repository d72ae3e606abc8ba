// HTTP routes: migration trigger, timeshift dispatcher, version

mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use crate::models::QueuedRecord;
use crate::timeshift::TimeshiftService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) queue_tx: mpsc::Sender<QueuedRecord>,
    pub(crate) timeshift: Arc<TimeshiftService>,
}

pub fn app(queue_tx: mpsc::Sender<QueuedRecord>, timeshift: Arc<TimeshiftService>) -> Router {
    let state = AppState { queue_tx, timeshift };
    Router::new()
        .route("/", get(|| async { "Hello from metricshift!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/migrate", post(http::migrate_handler)) // POST /api/migrate
        .route("/api/timeshift", post(http::timeshift_handler)) // POST /api/timeshift
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
