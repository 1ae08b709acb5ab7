// ⚖️ Pending Offsets - net unresolved offset per entity
//
// For every entity group of the sorted table:
//   old_initial         = old of the earliest row
//   new_final           = new of the latest row
//   difference_pending  = |old_initial - new_final|
//
// Si el offset se regresó a su valor original, la diferencia es 0.

use crate::table::{OffsetRow, OffsetTable};
use serde::{Deserialize, Serialize};

/// One row of the Pendientes table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSummary {
    pub entity: String,
    /// Characteristic of the latest row
    pub characteristic_final: String,
    pub date_final: String,
    pub time_final: String,
    pub old_initial: f64,
    pub new_final: f64,
    pub difference_pending: f64,
}

impl PendingSummary {
    /// Reduce one entity group (already sorted oldest → newest).
    /// Returns None only for an empty slice.
    pub fn from_group(group: &[OffsetRow]) -> Option<Self> {
        let first = group.first()?;
        let last = group.last()?;

        let old_initial = first.record.old_value;
        let new_final = last.record.new_value;

        Some(PendingSummary {
            entity: last.record.entity.clone(),
            characteristic_final: last.record.characteristic.clone(),
            date_final: last.record.date.clone(),
            time_final: last.record.time.clone(),
            old_initial,
            new_final,
            difference_pending: (old_initial - new_final).abs(),
        })
    }

    /// Offset fully returned to its starting value
    pub fn is_resolved(&self) -> bool {
        self.difference_pending == 0.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} → {} pending {:.4} as of {} {}",
            self.entity,
            self.characteristic_final,
            self.old_initial,
            self.new_final,
            self.difference_pending,
            self.date_final,
            self.time_final
        )
    }
}

/// One summary per entity, in the table's entity order.
pub fn summarize_pending(table: &OffsetTable) -> Vec<PendingSummary> {
    table.groups().filter_map(PendingSummary::from_group).collect()
}

/// Sum of all pending differences
pub fn total_pending(summaries: &[PendingSummary]) -> f64 {
    summaries.iter().map(|s| s.difference_pending).sum()
}
