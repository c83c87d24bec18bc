//! Fatal parse errors

use thiserror::Error;

/// Errors that abort a parse with no partial result
#[derive(Debug, Error)]
pub enum ParseError {
    /// No worksheet carries the subject-table keyword anywhere
    #[error("no data sheet found: no worksheet contains a 'Предмет' cell")]
    NoDataSheet,

    /// The package could not be opened, or a sheet or its merges could not be read
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
}

pub type Result<T> = std::result::Result<T, ParseError>;
