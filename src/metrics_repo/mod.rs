// Upstream metric source: catalog pager, dimension filter, series fetcher.
// The HTTP implementation lives in http.rs; tests inject mocks via MetricSource.

mod http;

pub use http::HttpMetricSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{Dimension, MetricIdentity, SeriesSample, Statistic};

/// Fixed sampling period for series queries, in seconds.
pub const SERIES_PERIOD_SECS: u32 = 60;

#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
}

/// One (metric, statistic) data query over a time window.
#[derive(Debug, Clone)]
pub struct SeriesQuery {
    /// Locally-unique id ("r1", "r2", ...) disambiguating sub-queries
    /// against the upstream batch query interface.
    pub id: String,
    pub metric: MetricIdentity,
    pub stat: Statistic,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub metrics: Vec<MetricIdentity>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesPage {
    pub samples: Vec<SeriesSample>,
    pub next_token: Option<String>,
}

/// Narrow call contract to the monitoring service. One page per call; a
/// returned token means more pages exist. No retries here; resilience is
/// the caller's concern.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn catalog_page(
        &self,
        query: &CatalogQuery,
        next_token: Option<&str>,
    ) -> Result<CatalogPage, AppError>;

    async fn series_page(
        &self,
        query: &SeriesQuery,
        next_token: Option<&str>,
    ) -> Result<SeriesPage, AppError>;
}

/// Retrieves the full metric catalog for a query, following continuation
/// tokens until exhausted. Pages are concatenated in arrival order; zero
/// results is an empty list, not an error.
pub async fn list_all_metrics(
    source: &dyn MetricSource,
    query: &CatalogQuery,
) -> Result<Vec<MetricIdentity>, AppError> {
    let mut metrics = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = source.catalog_page(query, token.as_deref()).await?;
        metrics.extend(page.metrics);
        match page.next_token {
            Some(next) => {
                tracing::debug!(operation = "list_metrics", "paginating from a next token");
                token = Some(next);
            }
            None => break,
        }
    }
    Ok(metrics)
}

/// Keeps identities whose dimension count equals `requested_count` exactly.
/// The source returns supersets when queried with a dimension subset; series
/// more specifically dimensioned than requested are dropped.
pub fn retain_exact_dimensions(
    metrics: Vec<MetricIdentity>,
    requested_count: usize,
) -> Vec<MetricIdentity> {
    metrics
        .into_iter()
        .filter(|m| m.dimensions.len() == requested_count)
        .collect()
}

/// Retrieves the full sample set for one (metric, statistic) pair, following
/// continuation tokens until exhausted. An empty window yields an empty list.
pub async fn fetch_series(
    source: &dyn MetricSource,
    query: &SeriesQuery,
) -> Result<Vec<SeriesSample>, AppError> {
    let mut samples = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = source.series_page(query, token.as_deref()).await?;
        samples.extend(page.samples);
        match page.next_token {
            Some(next) => {
                tracing::debug!(
                    operation = "get_metric_data",
                    query_id = %query.id,
                    "paginating from a next token"
                );
                token = Some(next);
            }
            None => break,
        }
    }
    Ok(samples)
}
