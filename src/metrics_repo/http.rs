// reqwest client for the metric catalog/data endpoints

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use super::{CatalogPage, CatalogQuery, MetricSource, SERIES_PERIOD_SECS, SeriesPage, SeriesQuery};
use crate::errors::AppError;
use crate::models::{Dimension, MetricIdentity, SeriesSample, Statistic};

pub struct HttpMetricSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetricSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::upstream)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(AppError::upstream)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "{path} returned {status}: {text}"
            )));
        }
        response.json().await.map_err(AppError::upstream)
    }
}

#[async_trait]
impl MetricSource for HttpMetricSource {
    async fn catalog_page(
        &self,
        query: &CatalogQuery,
        next_token: Option<&str>,
    ) -> Result<CatalogPage, AppError> {
        let body = ListMetricsBody {
            namespace: &query.namespace,
            metric_name: &query.metric_name,
            dimensions: &query.dimensions,
            next_token,
        };
        let response: ListMetricsResponse = self.post_json("ListMetrics", &body).await?;
        Ok(CatalogPage {
            metrics: response.metrics,
            next_token: response.next_token,
        })
    }

    async fn series_page(
        &self,
        query: &SeriesQuery,
        next_token: Option<&str>,
    ) -> Result<SeriesPage, AppError> {
        let body = MetricDataBody {
            metric_data_queries: [MetricDataQuery {
                id: &query.id,
                metric_stat: MetricStat {
                    metric: &query.metric,
                    period: SERIES_PERIOD_SECS,
                    stat: query.stat,
                },
            }],
            start_time: query.start_time,
            end_time: query.end_time,
            next_token,
        };
        let response: MetricDataResponse = self.post_json("GetMetricData", &body).await?;
        let samples = response
            .metric_data_results
            .into_iter()
            .next()
            .map(|result| {
                result
                    .timestamps
                    .into_iter()
                    .zip(result.values)
                    .map(|(timestamp, value)| SeriesSample { timestamp, value })
                    .collect()
            })
            .unwrap_or_default();
        Ok(SeriesPage {
            samples,
            next_token: response.next_token,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListMetricsBody<'a> {
    namespace: &'a str,
    metric_name: &'a str,
    dimensions: &'a [Dimension],
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListMetricsResponse {
    #[serde(default)]
    metrics: Vec<MetricIdentity>,
    next_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetricDataBody<'a> {
    metric_data_queries: [MetricDataQuery<'a>; 1],
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetricDataQuery<'a> {
    id: &'a str,
    metric_stat: MetricStat<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetricStat<'a> {
    metric: &'a MetricIdentity,
    period: u32,
    stat: Statistic,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricDataResponse {
    #[serde(default)]
    metric_data_results: Vec<MetricDataResult>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricDataResult {
    #[serde(default)]
    timestamps: Vec<DateTime<Utc>>,
    #[serde(default)]
    values: Vec<f64>,
}
