// Background migration worker: drains the queue in batches and logs each
// batch report. Processing within a batch is strictly sequential.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, interval};

use crate::migration::MigrationService;
use crate::models::QueuedRecord;

/// Service handle, queue, counters and shutdown for the worker.
pub struct WorkerDeps {
    pub service: Arc<MigrationService>,
    pub queue_rx: mpsc::Receiver<QueuedRecord>,
    pub records_processed_total: Arc<AtomicU64>,
    pub records_failed_total: Arc<AtomicU64>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    /// Max records drained into one batch.
    pub batch_size: usize,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        service,
        mut queue_rx,
        records_processed_total,
        records_failed_total,
        mut shutdown_rx,
    } = deps;
    let batch_size = config.batch_size.max(1);
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);

    tokio::spawn(async move {
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut batch: Vec<QueuedRecord> = Vec::with_capacity(batch_size);

        loop {
            tokio::select! {
                received = queue_rx.recv_many(&mut batch, batch_size) => {
                    if received == 0 {
                        tracing::debug!("Queue closed");
                        break;
                    }
                    let report = service.process_batch(&batch).await;
                    records_processed_total.fetch_add(
                        batch.len() as u64,
                        std::sync::atomic::Ordering::Relaxed,
                    );
                    records_failed_total.fetch_add(
                        report.batch_item_failures.len() as u64,
                        std::sync::atomic::Ordering::Relaxed,
                    );
                    tracing::info!(
                        operation = "process_batch",
                        batch_len = batch.len(),
                        report = %serde_json::to_string(&report).unwrap_or_default(),
                        "batch processed"
                    );
                    batch.clear();
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        records_processed_total =
                            records_processed_total.load(std::sync::atomic::Ordering::Relaxed),
                        records_failed_total =
                            records_failed_total.load(std::sync::atomic::Ordering::Relaxed),
                        "app stats"
                    );
                }
            }
        }
    })
}
