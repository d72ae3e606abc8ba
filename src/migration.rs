// Migration pipeline: validate -> page catalog -> filter dimensions ->
// fetch per (metric, statistic) -> pivot -> archive.

use std::sync::Arc;

use crate::archive_repo::ArchiveWriter;
use crate::errors::AppError;
use crate::metrics_repo::{self, CatalogQuery, MetricSource, SeriesQuery};
use crate::models::{BatchItemFailure, BatchReport, MigrationRequest, QueuedRecord, SeriesSample};
use crate::pivot;

pub struct MigrationService {
    source: Arc<dyn MetricSource>,
    writer: ArchiveWriter,
}

#[derive(Debug, Clone, Copy)]
pub struct MigrationSummary {
    pub metrics: usize,
    pub columns: usize,
    pub rows: usize,
}

impl MigrationService {
    pub fn new(source: Arc<dyn MetricSource>, writer: ArchiveWriter) -> Self {
        Self { source, writer }
    }

    /// Processes one batch of queued records sequentially. Every record
    /// yields an outcome; failures accumulate into the report and never
    /// short-circuit the rest of the batch.
    pub async fn process_batch(&self, records: &[QueuedRecord]) -> BatchReport {
        let mut report = BatchReport::default();
        for record in records {
            match self.process_record(record).await {
                Ok(summary) => {
                    tracing::info!(
                        message_id = %record.message_id,
                        metrics = summary.metrics,
                        columns = summary.columns,
                        rows = summary.rows,
                        "record migrated"
                    );
                }
                Err(e) => {
                    tracing::error!(message_id = %record.message_id, error = %e, "record failed");
                    report.batch_item_failures.push(BatchItemFailure {
                        item_identifier: record.message_id.clone(),
                    });
                }
            }
        }
        report
    }

    async fn process_record(&self, record: &QueuedRecord) -> Result<MigrationSummary, AppError> {
        let request = MigrationRequest::from_json(&record.body)?;
        self.migrate(&request).await
    }

    /// Runs the full pipeline for one validated request.
    pub async fn migrate(&self, request: &MigrationRequest) -> Result<MigrationSummary, AppError> {
        let catalog = metrics_repo::list_all_metrics(
            self.source.as_ref(),
            &CatalogQuery {
                namespace: request.namespace.clone(),
                metric_name: request.metric_name.clone(),
                dimensions: request.dimensions.clone(),
            },
        )
        .await?;
        let metrics = metrics_repo::retain_exact_dimensions(catalog, request.dimensions.len());
        tracing::info!(
            operation = "dimension_filter",
            namespace = %request.namespace,
            metric = %request.metric_name,
            kept = metrics.len(),
            "catalog listed and filtered"
        );

        // Query ids are unique within one invocation only.
        let mut query_count: u64 = 0;
        let mut series: Vec<(String, Vec<SeriesSample>)> = Vec::new();
        for metric in &metrics {
            for stat in &request.cloudwatch_stats {
                query_count += 1;
                let query = SeriesQuery {
                    id: format!("r{query_count}"),
                    metric: metric.clone(),
                    stat: *stat,
                    start_time: request.start_time,
                    end_time: request.end_time,
                };
                let samples = metrics_repo::fetch_series(self.source.as_ref(), &query).await?;
                tracing::debug!(
                    operation = "get_metric_data",
                    query_id = %query.id,
                    stat = %stat,
                    samples = samples.len(),
                    "series fetched"
                );
                series.push((
                    format!("{}-{}", request.destination_metric_name, stat),
                    samples,
                ));
            }
        }

        let table = pivot::pivot(&series);
        self.writer.write(&table, &request.destination_key).await?;
        Ok(MigrationSummary {
            metrics: metrics.len(),
            columns: table.columns.len(),
            rows: table.rows.len(),
        })
    }
}
