// Path-style PUT to an S3-compatible object store endpoint

use async_trait::async_trait;
use std::time::Duration;

use super::ObjectStore;
use crate::errors::AppError;

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, bucket: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::SinkWrite(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), AppError> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let response = self
            .client
            .put(&url)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::SinkWrite(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::SinkWrite(format!(
                "put {url} returned {status}: {text}"
            )));
        }
        Ok(())
    }
}
