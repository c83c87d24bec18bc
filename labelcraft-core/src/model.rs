//! Parsed workbook data structures

use crate::warning::Warning;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One (student, subject, date) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub student_name_raw: String,
    pub student_name: String,
    pub class_label: String,
    pub subject: String,
    pub date: NaiveDate,
    /// Grades, each in 2..=5, in cell order
    pub grades: Vec<u8>,
    pub attendance: Vec<String>,
    pub raw_text: String,
    /// Source row (1-based)
    pub row: usize,
    /// Source column (1-based)
    pub col: usize,
}

/// One student's block of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSection {
    pub name_raw: String,
    /// Name with whitespace runs collapsed
    pub name: String,
    pub class_label: String,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub entries: Vec<ParsedEntry>,
    /// Attendance code -> description, from legend rows
    pub attendance_legend: BTreeMap<String, String>,
    pub warnings: Vec<Warning>,
}

/// Result of parsing one report workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkbook {
    /// Worksheet the data was read from
    pub sheet_name: String,
    pub school_name: Option<String>,
    pub academic_year_start: Option<i32>,
    pub academic_year_end: Option<i32>,
    /// Sorted by normalized name, case-insensitively
    pub students: Vec<StudentSection>,
    pub warnings: Vec<Warning>,
}

impl ParsedWorkbook {
    /// All warnings, workbook-level first, then per section in order
    pub fn all_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .chain(self.students.iter().flat_map(|s| s.warnings.iter()))
    }

    /// Total number of parsed entries across all sections
    pub fn entry_count(&self) -> usize {
        self.students.iter().map(|s| s.entries.len()).sum()
    }

    /// Find a section by normalized student name
    pub fn student(&self, name: &str) -> Option<&StudentSection> {
        self.students.iter().find(|s| s.name == name)
    }
}
