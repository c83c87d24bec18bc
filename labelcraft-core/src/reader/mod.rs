//! Grade report reader: locates the data worksheet and expands it into a [`Grid`]

use crate::error::{ParseError, Result};
use anyhow::Context;
use calamine::{Data, Dimensions, Range, Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;

pub mod grid;

pub use grid::{Grid, MergedRange, normalize_header, normalize_text};

/// Normalized text of the cell that marks the subject table
pub const SUBJECT_KEYWORD: &str = "предмет";

/// The selected worksheet, fully expanded
#[derive(Debug, Clone)]
pub struct ReportSheet {
    pub name: String,
    pub grid: Grid,
}

/// Read XLSX bytes and build the grid of the first worksheet that contains
/// the subject keyword.
///
/// A sheet that cannot be read is skipped. If no sheet qualifies, the first
/// such read error is returned instead of [`ParseError::NoDataSheet`].
pub fn read_report_grid(bytes: &[u8]) -> Result<ReportSheet> {
    let mut excel: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let mut selected = None;
    let mut first_error = None;
    for sheet_name in excel.sheet_names() {
        let range = match excel.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => {
                log::warn!("Skipping sheet '{}': {}", sheet_name, e);
                first_error.get_or_insert(e);
                continue;
            }
        };
        let grid = build_grid(&range);
        if grid.any_cell(|value| normalize_header(value) == SUBJECT_KEYWORD) {
            selected = Some((sheet_name, grid));
            break;
        }
    }

    let Some((name, mut grid)) = selected else {
        return Err(first_error.map_or(ParseError::NoDataSheet, ParseError::Workbook));
    };

    excel.load_merged_regions()?;
    for (_, _, dims) in excel.merged_regions_by_sheet(&name) {
        grid.apply_merge(merged_range(dims));
    }

    log::info!(
        "Selected sheet '{}' ({} rows x {} columns)",
        name,
        grid.max_row(),
        grid.max_col()
    );

    Ok(ReportSheet { name, grid })
}

/// Read a report file from disk
pub fn read_report_grid_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<ReportSheet> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let sheet = read_report_grid(&bytes)
        .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
    Ok(sheet)
}

/// Build a 1-indexed grid sized to the last populated row/column of the range
fn build_grid(range: &Range<Data>) -> Grid {
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return Grid::new(0, 0);
    };

    let mut grid = Grid::new(end.0 as usize + 1, end.1 as usize + 1);
    for (rel_row, rel_col, data) in range.cells() {
        let row = start.0 as usize + rel_row + 1;
        let col = start.1 as usize + rel_col + 1;
        grid.set(row, col, normalize_cell_value(data));
    }
    grid
}

/// Convert calamine's 0-indexed region into a 1-indexed inclusive range
fn merged_range(dims: &Dimensions) -> MergedRange {
    (
        dims.start.0 as usize + 1,
        dims.start.1 as usize + 1,
        dims.end.0 as usize + 1,
        dims.end.1 as usize + 1,
    )
}

/// Normalize a calamine cell: non-strings are stringified and trimmed,
/// strings go through [`normalize_text`].
fn normalize_cell_value(data: &Data) -> Option<String> {
    let raw = match data {
        Data::Empty => return None,
        Data::String(s) => return normalize_text(s),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Integral floats print without a fractional part ("1", not "1.0")
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cell_value() {
        assert_eq!(normalize_cell_value(&Data::Empty), None);
        assert_eq!(normalize_cell_value(&Data::Float(1.0)), Some("1".to_string()));
        assert_eq!(normalize_cell_value(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(normalize_cell_value(&Data::Int(12)), Some("12".to_string()));
        assert_eq!(
            normalize_cell_value(&Data::String(" 5\u{a0}".to_string())),
            Some("5".to_string())
        );
        assert_eq!(normalize_cell_value(&Data::String("   ".to_string())), None);
        assert_eq!(normalize_cell_value(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn test_merged_range_is_one_indexed() {
        let dims = Dimensions {
            start: (0, 1),
            end: (2, 3),
        };
        assert_eq!(merged_range(&dims), (1, 2, 3, 4));
    }

    #[test]
    fn test_rejects_non_zip_payload() {
        let result = read_report_grid(b"not a workbook");
        assert!(result.is_err());
        assert!(!matches!(result, Err(ParseError::NoDataSheet)));
    }
}
