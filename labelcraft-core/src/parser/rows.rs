//! Row classification: one tagged [`RowKind`] per grid row, decided from the
//! first column (and, for legend rows, the shape of the whole row).

use crate::reader::{Grid, normalize_header};

pub use crate::reader::SUBJECT_KEYWORD;

pub const SCHOOL_KEYWORD: &str = "школа";
pub const ACADEMIC_YEAR_KEYWORD: &str = "учебный год";
pub const CLASS_KEYWORD: &str = "класс";
pub const PERIOD_KEYWORD: &str = "период";
pub const STUDENT_KEYWORD: &str = "ученик";

/// What a grid row is, independent of the scanner state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind<'a> {
    /// First column has no value
    Blank,
    School(&'a str),
    AcademicYear(&'a str),
    Class(&'a str),
    Period(&'a str),
    Student(&'a str),
    /// Month-label row of the subject table
    SubjectHeader,
    /// Attendance-code legend entry
    Legend { code: &'a str, description: &'a str },
    /// Any other labelled row; inside a subject table this is a subject
    Data(&'a str),
}

impl RowKind<'_> {
    /// Workbook-scope header keywords that close an open subject table
    pub fn is_meta(&self) -> bool {
        matches!(
            self,
            RowKind::School(_) | RowKind::AcademicYear(_) | RowKind::Class(_) | RowKind::Period(_)
        )
    }
}

/// Classify a row of the grid
pub fn classify_row(grid: &Grid, row: usize) -> RowKind<'_> {
    let Some(first) = grid.get(row, 1) else {
        return RowKind::Blank;
    };

    let header = normalize_header(first);
    if starts_with_keyword(&header, SCHOOL_KEYWORD) {
        RowKind::School(first)
    } else if starts_with_keyword(&header, ACADEMIC_YEAR_KEYWORD) {
        RowKind::AcademicYear(first)
    } else if starts_with_keyword(&header, CLASS_KEYWORD) {
        RowKind::Class(first)
    } else if starts_with_keyword(&header, PERIOD_KEYWORD) {
        RowKind::Period(first)
    } else if starts_with_word(&header, STUDENT_KEYWORD) {
        RowKind::Student(first)
    } else if starts_with_word(&header, SUBJECT_KEYWORD) {
        RowKind::SubjectHeader
    } else if let Some((code, description)) = legend_entry(grid, row) {
        RowKind::Legend { code, description }
    } else {
        RowKind::Data(first)
    }
}

/// Whether raw cell text is a student header row
pub fn is_student_header(text: &str) -> bool {
    starts_with_word(&normalize_header(text), STUDENT_KEYWORD)
}

/// `keyword` must stand as a whole label: followed by the end of the text, a
/// colon, or whitespace and then a colon or a non-letter (`класс 9б`).
/// `классный час` is not a class header.
fn starts_with_keyword(header: &str, keyword: &str) -> bool {
    let Some(rest) = header.strip_prefix(keyword) else {
        return false;
    };
    let trimmed = rest.trim_start();
    match trimmed.chars().next() {
        None | Some(':') => true,
        Some(c) => trimmed.len() < rest.len() && !c.is_alphabetic(),
    }
}

/// `keyword` followed by anything but another letter: `ученик иванов` is a
/// student header, `ученический совет` is not.
fn starts_with_word(header: &str, keyword: &str) -> bool {
    header
        .strip_prefix(keyword)
        .is_some_and(|rest| !rest.starts_with(char::is_alphabetic))
}

/// A legend row has a one-character first column, a non-empty second column
/// and nothing further to the right.
fn legend_entry(grid: &Grid, row: usize) -> Option<(&str, &str)> {
    let code = grid.get(row, 1)?.trim();
    let description = grid.get(row, 2)?.trim();
    if code.chars().count() != 1 || description.is_empty() {
        return None;
    }
    if grid.row_has_values_from(row, 3) {
        return None;
    }
    Some((code, description))
}

/// Text after the first colon, trimmed; the whole text if there is no colon
pub fn extract_value(text: &str) -> String {
    let raw = text.replace('\u{a0}', " ");
    match raw.split_once(':') {
        Some((_, value)) => value.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Collapse internal whitespace runs to single spaces
pub fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
