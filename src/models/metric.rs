// Metric identity, statistic kinds and raw samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (key, value) qualifier on a metric series. Wire form `{"Name", "Value"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// Uniquely identifies one time series within a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricIdentity {
    pub namespace: String,
    #[serde(rename = "MetricName")]
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

/// How raw samples were aggregated upstream. Closed set; wire strings match
/// the monitoring service's statistic names exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Average,
    Minimum,
    Maximum,
    Sum,
    SampleCount,
    #[serde(rename = "IQM")]
    Iqm,
    #[serde(rename = "p99")]
    P99,
    #[serde(rename = "tm99")]
    Tm99,
    #[serde(rename = "tc99")]
    Tc99,
    #[serde(rename = "ts99")]
    Ts99,
}

impl Statistic {
    pub const ALL: [Statistic; 10] = [
        Statistic::Average,
        Statistic::Minimum,
        Statistic::Maximum,
        Statistic::Sum,
        Statistic::SampleCount,
        Statistic::Iqm,
        Statistic::P99,
        Statistic::Tm99,
        Statistic::Tc99,
        Statistic::Ts99,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::Sum => "Sum",
            Statistic::SampleCount => "SampleCount",
            Statistic::Iqm => "IQM",
            Statistic::P99 => "p99",
            Statistic::Tm99 => "tm99",
            Statistic::Tc99 => "tc99",
            Statistic::Ts99 => "ts99",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped sample of one (metric, statistic) series.
/// No ordering guarantee from the upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}
