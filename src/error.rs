// 🚨 Error taxonomy for an offsets run
//
// Only document-level failures are errors. A line that does not match the
// offset grammar is `None` in the parser, never an `OffsetError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OffsetError {
    /// Input bytes are not a readable PDF. Fatal for the run.
    #[error("Document format error: {0}")]
    DocumentFormat(String),

    #[error("Spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OffsetError {
    pub fn is_document_format(&self) -> bool {
        matches!(self, OffsetError::DocumentFormat(_))
    }
}

pub type Result<T> = std::result::Result<T, OffsetError>;
