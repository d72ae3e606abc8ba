use anyhow::Result;
use metricshift::*;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let timeout = std::time::Duration::from_secs(app_config.upstream.request_timeout_secs);

    let source: Arc<dyn metrics_repo::MetricSource> = Arc::new(metrics_repo::HttpMetricSource::new(
        &app_config.upstream.base_url,
        timeout,
    )?);
    let store: Arc<dyn archive_repo::ObjectStore> = Arc::new(archive_repo::HttpObjectStore::new(
        &app_config.archive.endpoint,
        &app_config.archive.bucket,
        timeout,
    )?);
    let writer = archive_repo::ArchiveWriter::new(store, &app_config.archive.staging_dir);
    let service = Arc::new(migration::MigrationService::new(source, writer));

    // The timeshift endpoint cannot run without its delegate; fail here, not per-request.
    let delegate_url = app_config
        .timeshift
        .as_ref()
        .map(|t| t.delegate_url.clone())
        .ok_or_else(|| {
            errors::AppError::MissingConfiguration(
                "timeshift.delegate_url is required; set the [timeshift] section".into(),
            )
        })?;
    let delegate = Arc::new(timeshift::HttpQueryDelegate::new(&delegate_url, timeout)?);
    let timeshift_service = Arc::new(timeshift::TimeshiftService::new(delegate));

    let (queue_tx, queue_rx) = mpsc::channel(app_config.queue.capacity);
    let records_processed_total = Arc::new(AtomicU64::new(0));
    let records_failed_total = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            service,
            queue_rx,
            records_processed_total: records_processed_total.clone(),
            records_failed_total: records_failed_total.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            batch_size: app_config.queue.batch_size,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(queue_tx, timeshift_service);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}
