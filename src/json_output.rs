//! JSON output format for de-anonymization results

use serde::{Deserialize, Serialize};

use crate::aggregate::ResultRow;
use crate::summary::PatternSummary;

/// Ingestion counters carried alongside the results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonInputStats {
    /// Rows read from the trip table
    pub rows_seen: usize,
    /// Rows normalized into trips
    pub trips_parsed: usize,
    /// Rows skipped (bad timestamp, missing field, ...)
    pub rows_dropped: usize,
}

/// Complete JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub input: JsonInputStats,
    pub summary: PatternSummary,
    pub patterns: Vec<ResultRow>,
}

impl JsonReport {
    pub fn new(input: JsonInputStats, rows: &[ResultRow]) -> Self {
        Self {
            input,
            summary: PatternSummary::from_rows(rows),
            patterns: rows.to_vec(),
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
