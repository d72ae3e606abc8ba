use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub archive: ArchiveConfig,
    pub queue: QueueConfig,
    pub monitoring: MonitoringConfig,
    /// Absent section means the timeshift endpoint cannot be served; startup fails.
    pub timeshift: Option<TimeshiftConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the metric catalog/data query service.
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Object store endpoint (path-style, S3-compatible).
    pub endpoint: String,
    pub bucket: String,
    /// Directory for staging files; they never outlive one migration.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

fn default_staging_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Max queued migration requests before the trigger endpoint rejects.
    pub capacity: usize,
    /// Max records the worker drains into one batch.
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (records processed/failed) at INFO level.
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeshiftConfig {
    /// Query-execution service the stripped GetMetricData request is delegated to.
    pub delegate_url: String,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.upstream.base_url.is_empty(),
            "upstream.base_url must be non-empty"
        );
        anyhow::ensure!(
            self.upstream.request_timeout_secs > 0,
            "upstream.request_timeout_secs must be > 0, got {}",
            self.upstream.request_timeout_secs
        );
        anyhow::ensure!(
            !self.archive.endpoint.is_empty(),
            "archive.endpoint must be non-empty"
        );
        anyhow::ensure!(
            !self.archive.bucket.is_empty(),
            "archive.bucket must be non-empty"
        );
        anyhow::ensure!(
            !self.archive.staging_dir.is_empty(),
            "archive.staging_dir must be non-empty"
        );
        anyhow::ensure!(
            self.queue.capacity > 0,
            "queue.capacity must be > 0, got {}",
            self.queue.capacity
        );
        anyhow::ensure!(
            self.queue.batch_size > 0,
            "queue.batch_size must be > 0, got {}",
            self.queue.batch_size
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        if let Some(ts) = &self.timeshift {
            anyhow::ensure!(
                !ts.delegate_url.is_empty(),
                "timeshift.delegate_url must be non-empty when the section is present"
            );
        }
        Ok(())
    }
}
