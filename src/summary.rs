// Pattern summary statistics
//
// Condenses a ranked result set into the headline numbers of a run: how many
// distinct patterns were found, how many trips they link, and how those
// trips spread across pattern sizes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::aggregate::ResultRow;

/// Headline numbers for one detection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    /// Distinct Pattern_ID values
    pub pattern_count: usize,

    /// Result rows, i.e. trips that can be linked to another trip
    pub linked_trips: usize,

    /// (pattern size, row count) pairs, largest size first
    pub size_breakdown: Vec<(usize, usize)>,
}

impl PatternSummary {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let pattern_count = rows
            .iter()
            .map(|r| r.pattern_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut by_size: BTreeMap<usize, usize> = BTreeMap::new();
        for row in rows {
            *by_size.entry(row.trips_in_pattern).or_insert(0) += 1;
        }

        Self {
            pattern_count,
            linked_trips: rows.len(),
            size_breakdown: by_size.into_iter().rev().collect(),
        }
    }

    /// Format as human-readable report
    pub fn to_report_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Total identifying patterns found: {}\n",
            self.pattern_count
        ));
        out.push_str(&format!(
            "Total trips that can be linked: {}\n",
            self.linked_trips
        ));
        out.push_str(&format!(
            "These trips likely belong to {} different people\n",
            self.pattern_count
        ));
        out.push_str("Breakdown by pattern size:\n");
        for (size, count) in &self.size_breakdown {
            out.push_str(&format!(
                "  {} trips in pattern: {} instances\n",
                size, count
            ));
        }
        out
    }
}
