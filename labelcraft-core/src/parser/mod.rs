//! Turns a report grid into a [`ParsedWorkbook`]

pub mod dates;
pub mod rows;
pub mod scanner;
pub mod tokenizer;

use crate::error::Result;
use crate::model::ParsedWorkbook;
use crate::reader::{self, Grid};
use anyhow::Context;
use chrono::Datelike;
use std::collections::BTreeSet;
use std::path::Path;

pub use rows::{RowKind, classify_row};
pub use scanner::{ScanPhase, SectionScanner};
pub use tokenizer::{CellTokens, TokenIssue, tokenize_cell};

/// Attendance codes recognized before any legend row is seen
pub const DEFAULT_ATTENDANCE_CODES: [&str; 4] = ["Н", "У", "Б", "О"];

pub fn default_attendance_codes() -> BTreeSet<String> {
    DEFAULT_ATTENDANCE_CODES.iter().map(|c| c.to_string()).collect()
}

/// Quarterly grade report parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterParser {
    fallback_year: i32,
}

impl QuarterParser {
    /// Create a parser that falls back to the current local year
    pub fn new() -> Self {
        Self::with_fallback_year(chrono::Local::now().year())
    }

    /// Create a parser with a fixed fallback year for date resolution
    pub fn with_fallback_year(fallback_year: i32) -> Self {
        Self { fallback_year }
    }

    pub fn fallback_year(&self) -> i32 {
        self.fallback_year
    }

    /// Parse raw `.xlsx` bytes
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedWorkbook> {
        let sheet = reader::read_report_grid(bytes)?;
        Ok(self.parse_grid(&sheet.grid, &sheet.name))
    }

    /// Parse a report file from disk
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<ParsedWorkbook> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))?;
        self.parse_bytes(&bytes)
            .with_context(|| format!("Failed to parse report file: {}", path.display()))
    }

    /// Scan an already built grid
    pub fn parse_grid(&self, grid: &Grid, sheet_name: &str) -> ParsedWorkbook {
        let workbook = SectionScanner::new(grid, self.fallback_year).scan(sheet_name);
        log::info!(
            "Parsed sheet '{}': {} students, {} entries, {} warnings",
            sheet_name,
            workbook.students.len(),
            workbook.entry_count(),
            workbook.all_warnings().count()
        );
        workbook
    }
}

impl Default for QuarterParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes() {
        let codes = default_attendance_codes();
        assert_eq!(codes.len(), 4);
        assert!(codes.contains("Н"));
        assert!(!codes.contains("П"));
    }

    #[test]
    fn test_parse_grid_uses_fallback_year() {
        let grid = Grid::from_rows(&[
            vec![Some("Ученик: Петров Пётр"), None],
            vec![Some("Предмет"), Some("Март")],
            vec![None, Some("3")],
            vec![Some("Физика"), Some("5")],
        ]);

        let workbook = QuarterParser::with_fallback_year(2031).parse_grid(&grid, "Лист1");
        assert_eq!(workbook.sheet_name, "Лист1");
        let entry = &workbook.students[0].entries[0];
        assert_eq!(entry.date.to_string(), "2031-03-03");
    }

    #[test]
    fn test_parse_bytes_rejects_non_zip() {
        let result = QuarterParser::with_fallback_year(2024).parse_bytes(b"not a workbook");
        assert!(result.is_err());
    }
}
