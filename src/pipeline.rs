// 🔁 Pipeline - PDF bytes → OffsetReport
//
// extract → filter → parse → table → pending. Every stage takes the previous
// stage's output by reference (or by value once) and returns a new value.

use crate::error::Result;
use crate::export;
use crate::extractor;
use crate::parser;
use crate::pending::{self, PendingSummary};
use crate::table::OffsetTable;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Result of one run: Datos + Pendientes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetReport {
    pub rows: OffsetTable,
    pub pending: Vec<PendingSummary>,
}

impl OffsetReport {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn entity_count(&self) -> usize {
        self.pending.len()
    }

    pub fn total_pending(&self) -> f64 {
        pending::total_pending(&self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Datos + Pendientes as an xlsx byte buffer
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        export::to_xlsx_buffer(self.rows.rows(), &self.pending)
    }
}

/// Full run over PDF bytes.
///
/// # Errors
/// * `OffsetError::DocumentFormat` - not a readable PDF; no partial output
pub fn process_pdf(pdf_bytes: &[u8]) -> Result<OffsetReport> {
    let pages = extractor::extract_pages(pdf_bytes)?;
    let text = extractor::join_pages(&pages);
    info!(pages_with_text = pages.len(), "pdf loaded");
    Ok(process_text(&text))
}

/// Everything after extraction. Infallible: bad lines are dropped.
pub fn process_text(text: &str) -> OffsetReport {
    let candidates = parser::filter_candidate_lines(text);
    let candidate_count = candidates.len();

    let records = parser::parse_lines(candidates);
    let rows = OffsetTable::build(records);
    let pending = pending::summarize_pending(&rows);

    info!(
        candidate_lines = candidate_count,
        matched_rows = rows.len(),
        null_timestamps = rows.null_datetime_count(),
        entities = pending.len(),
        "offsets processed"
    );

    OffsetReport { rows, pending }
}
