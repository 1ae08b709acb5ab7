// Offsets Pendientes - Core Library
// PDF offset logs → Datos + Pendientes tables → xlsx. Used by the CLI, the
// web server and the tests.

pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod parser;
pub mod pending;
pub mod pipeline;
pub mod table;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
#[path = "../tests/common/pdf.rs"]
pub(crate) mod pdf_fixture;

// Re-export commonly used types
pub use error::{OffsetError, Result};
pub use export::{to_xlsx_buffer, EXPORT_FILE_NAME, XLSX_MIME};
pub use extractor::{extract_pages, extract_text, PageText};
pub use parser::{filter_candidate_lines, parse_line, parse_text, RawRecord, OFFSET_MARKER};
pub use pending::{summarize_pending, PendingSummary};
pub use pipeline::{process_pdf, process_text, OffsetReport};
pub use table::{OffsetRow, OffsetTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
