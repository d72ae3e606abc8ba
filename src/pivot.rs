// Pivot: per-statistic sample series -> one wide table keyed by timestamp.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::models::SeriesSample;

/// The pivoted table. Column order is first-seen label order and fixes the
/// archive header and row field order; rows iterate in ascending timestamp
/// order (BTreeMap), independent of upstream arrival order.
#[derive(Debug, Clone, Default)]
pub struct PivotTable {
    pub columns: Vec<String>,
    pub rows: BTreeMap<DateTime<Utc>, HashMap<String, f64>>,
}

/// Reshapes (column label, samples) pairs into a PivotTable. The first
/// occurrence of a label fixes its column position; duplicates of the same
/// label fill the existing column. A row is created the first time its
/// timestamp is seen across any series.
pub fn pivot(series: &[(String, Vec<SeriesSample>)]) -> PivotTable {
    let mut table = PivotTable::default();
    for (label, samples) in series {
        if !table.columns.iter().any(|c| c == label) {
            table.columns.push(label.clone());
        }
        for sample in samples {
            table
                .rows
                .entry(sample.timestamp)
                .or_default()
                .insert(label.clone(), sample.value);
        }
    }
    table
}
