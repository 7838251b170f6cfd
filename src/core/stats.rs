//! Target-type statistics for the by-target journal.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::report::TargetEntry;

/// Types that get a row in the statistics table.
const TRACKED_TYPES: [&str; 10] = [
    "solar system",
    "cl+neb",
    "opn cl",
    "glob cl",
    "galaxy",
    "pln neb",
    "sn rem",
    "neb",
    "quasar",
    "star",
];

/// Observation counts per target type, sorted by type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetStatistics {
    counts: BTreeMap<&'static str, usize>,
}

impl Default for TargetStatistics {
    fn default() -> Self {
        Self {
            counts: TRACKED_TYPES.iter().map(|t| (*t, 0)).collect(),
        }
    }
}

impl TargetStatistics {
    pub fn record(&mut self, entry: &TargetEntry) {
        let kind = entry.kind.to_lowercase();
        let bucket = if entry.is_solar_body() || entry.is_minor_body() {
            "solar system"
        } else if entry.is_star() {
            "star"
        } else {
            kind.as_str()
        };
        if let Some(count) = self.counts.get_mut(bucket) {
            *count += 1;
        }
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// (type, count) rows in type-name order.
    pub fn rows(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}
