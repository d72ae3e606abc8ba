// Shared test helpers: time/sample builders and in-memory service mocks
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use metricshift::archive_repo::ObjectStore;
use metricshift::errors::AppError;
use metricshift::metrics_repo::{CatalogPage, CatalogQuery, MetricSource, SeriesPage, SeriesQuery};
use metricshift::models::{Dimension, MetricIdentity, SeriesSample};
use metricshift::timeshift::QueryDelegate;

pub fn ts(epoch_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch_secs, 0).unwrap()
}

pub fn sample(epoch_secs: i64, value: f64) -> SeriesSample {
    SeriesSample {
        timestamp: ts(epoch_secs),
        value,
    }
}

pub fn dim(name: &str, value: &str) -> Dimension {
    Dimension {
        name: name.to_string(),
        value: value.to_string(),
    }
}

pub fn identity(namespace: &str, name: &str, dimensions: Vec<Dimension>) -> MetricIdentity {
    MetricIdentity {
        namespace: namespace.to_string(),
        name: name.to_string(),
        dimensions,
    }
}

/// Serves pre-seeded catalog and series pages; continuation tokens are page
/// indices, and upstream calls are counted.
#[derive(Default)]
pub struct MockSource {
    pub catalog_pages: Vec<Vec<MetricIdentity>>,
    /// Pages served for every series query, keyed by statistic wire name.
    pub series_pages: HashMap<String, Vec<Vec<SeriesSample>>>,
    pub catalog_calls: AtomicUsize,
    pub series_calls: AtomicUsize,
}

fn page_index(token: Option<&str>) -> usize {
    token.map(|t| t.parse().unwrap()).unwrap_or(0)
}

fn next_token(index: usize, page_count: usize) -> Option<String> {
    (index + 1 < page_count).then(|| (index + 1).to_string())
}

#[async_trait]
impl MetricSource for MockSource {
    async fn catalog_page(
        &self,
        _query: &CatalogQuery,
        token: Option<&str>,
    ) -> Result<CatalogPage, AppError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        let index = page_index(token);
        Ok(CatalogPage {
            metrics: self.catalog_pages.get(index).cloned().unwrap_or_default(),
            next_token: next_token(index, self.catalog_pages.len()),
        })
    }

    async fn series_page(
        &self,
        query: &SeriesQuery,
        token: Option<&str>,
    ) -> Result<SeriesPage, AppError> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        let pages = self
            .series_pages
            .get(query.stat.as_str())
            .cloned()
            .unwrap_or_default();
        let index = page_index(token);
        Ok(SeriesPage {
            samples: pages.get(index).cloned().unwrap_or_default(),
            next_token: next_token(index, pages.len()),
        })
    }
}

/// Always-unreachable source.
pub struct DownSource;

#[async_trait]
impl MetricSource for DownSource {
    async fn catalog_page(
        &self,
        _query: &CatalogQuery,
        _token: Option<&str>,
    ) -> Result<CatalogPage, AppError> {
        Err(AppError::UpstreamUnavailable("connection refused".into()))
    }

    async fn series_page(
        &self,
        _query: &SeriesQuery,
        _token: Option<&str>,
    ) -> Result<SeriesPage, AppError> {
        Err(AppError::UpstreamUnavailable("connection refused".into()))
    }
}

/// Captures uploaded objects in memory.
#[derive(Default)]
pub struct CapturingStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for CapturingStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), AppError> {
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }
}

/// Rejects every upload.
pub struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put_object(&self, _key: &str, _body: Vec<u8>) -> Result<(), AppError> {
        Err(AppError::SinkWrite("upload refused".into()))
    }
}

/// Returns a fixed payload and records the event it was called with.
pub struct StaticDelegate {
    pub payload: Value,
    pub calls: AtomicUsize,
    pub last_event: Mutex<Option<Value>>,
}

impl StaticDelegate {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
            last_event: Mutex::new(None),
        }
    }
}

#[async_trait]
impl QueryDelegate for StaticDelegate {
    async fn get_metric_data(&self, event: &Value) -> Result<Value, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_event.lock().unwrap() = Some(event.clone());
        Ok(self.payload.clone())
    }
}

/// Fails every delegated query.
pub struct FailingDelegate;

#[async_trait]
impl QueryDelegate for FailingDelegate {
    async fn get_metric_data(&self, _event: &Value) -> Result<Value, AppError> {
        Err(AppError::UpstreamUnavailable("delegate exploded".into()))
    }
}
