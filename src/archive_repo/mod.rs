// Archive sink: CSV render, staged write, durable upload. The staging file
// is deleted on every exit path (render failure, upload failure, success).

mod http;

pub use http::HttpObjectStore;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::AppError;
use crate::pivot::PivotTable;

/// Opaque durable destination for rendered archives.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), AppError>;
}

pub struct ArchiveWriter {
    store: Arc<dyn ObjectStore>,
    staging_dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ObjectStore>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    /// Renders the table to CSV, stages it, then uploads to `key`.
    /// The staging file is gone by the time this returns, on every path.
    pub async fn write(&self, table: &PivotTable, key: &str) -> Result<(), AppError> {
        // NamedTempFile unlinks on drop
        let mut staged = tempfile::Builder::new()
            .prefix("archive-")
            .suffix(".csv")
            .tempfile_in(&self.staging_dir)
            .map_err(|e| AppError::SinkWrite(format!("staging file: {e}")))?;

        let csv = render_csv(table)?;
        staged
            .write_all(csv.as_bytes())
            .map_err(|e| AppError::SinkWrite(format!("staging write: {e}")))?;
        staged
            .flush()
            .map_err(|e| AppError::SinkWrite(format!("staging flush: {e}")))?;

        let body = std::fs::read(staged.path())
            .map_err(|e| AppError::SinkWrite(format!("staging read: {e}")))?;
        self.store.put_object(key, body).await?;
        tracing::info!(
            operation = "put_object",
            key,
            rows = table.rows.len(),
            columns = table.columns.len(),
            "archive uploaded"
        );
        Ok(())
    }
}

/// Serializes the table: header `timestamp,<col>,...`, then one line per row
/// in ascending timestamp order. A row missing a value for any column is a
/// hard error, never a defaulted cell.
pub fn render_csv(table: &PivotTable) -> Result<String, AppError> {
    let mut out = String::from("timestamp");
    for column in &table.columns {
        out.push(',');
        out.push_str(column);
    }
    out.push('\n');

    for (timestamp, cells) in &table.rows {
        out.push_str(&iso(timestamp));
        for column in &table.columns {
            let value = cells.get(column).ok_or_else(|| AppError::IncompletePivot {
                timestamp: iso(timestamp),
                column: column.clone(),
            })?;
            out.push(',');
            out.push_str(&fmt_cell(*value));
        }
        out.push('\n');
    }
    Ok(out)
}

fn iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Decimal text; integral values keep an explicit fractional digit ("5.0").
fn fmt_cell(value: f64) -> String {
    format!("{value:?}")
}
