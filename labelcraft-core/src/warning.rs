//! Recoverable parse warnings carried as data alongside the parsed model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a recoverable condition found while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnknownMonth,
    InvalidDay,
    UnresolvedYear,
    InvalidDate,
    InvalidGrade,
    UnknownToken,
    AmbiguousCell,
    DateOutOfPeriod,
    MissingSubjectTable,
    /// A recognized header row whose value could not be parsed
    UnparsedHeader,
}

impl WarningKind {
    pub fn as_str(&self) -> &str {
        match self {
            WarningKind::UnknownMonth => "unknown_month",
            WarningKind::InvalidDay => "invalid_day",
            WarningKind::UnresolvedYear => "unresolved_year",
            WarningKind::InvalidDate => "invalid_date",
            WarningKind::InvalidGrade => "invalid_grade",
            WarningKind::UnknownToken => "unknown_token",
            WarningKind::AmbiguousCell => "ambiguous_cell",
            WarningKind::DateOutOfPeriod => "date_out_of_period",
            WarningKind::MissingSubjectTable => "missing_subject_table",
            WarningKind::UnparsedHeader => "unparsed_header",
        }
    }
}

/// Scope a warning is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningScope {
    /// Workbook-level warning (no student context active)
    Workbook,
    /// Section-level warning, keyed by the normalized student name
    Section(String),
}

impl WarningScope {
    /// Get the student name if this is a section scope
    pub fn student(&self) -> Option<&str> {
        match self {
            WarningScope::Workbook => None,
            WarningScope::Section(name) => Some(name),
        }
    }
}

/// Grid cell coordinate, 1-indexed (row 1, column 1 is `A1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellReference {
    pub row: usize,
    pub col: usize,
}

impl CellReference {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row)
    }

    /// Convert column number to letter (1 -> A, 27 -> AA)
    fn col_to_letter(col: usize) -> String {
        let mut result = String::new();
        let mut n = col;
        while n > 0 {
            let rem = (n - 1) % 26;
            result.insert(0, (b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        result
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}

/// A recoverable parse warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub scope: WarningScope,
    /// Human-readable message, already carrying student/subject/row/col context
    pub message: String,
    pub cell: Option<CellReference>,
}

impl Warning {
    pub fn new(kind: WarningKind, scope: WarningScope, message: impl Into<String>) -> Self {
        Self {
            kind,
            scope,
            message: message.into(),
            cell: None,
        }
    }

    pub fn at(mut self, row: usize, col: usize) -> Self {
        self.cell = Some(CellReference::new(row, col));
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
