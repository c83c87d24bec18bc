//! Report models built from a parsed workbook

pub mod aggregator;
pub mod options;

use crate::model::ParsedWorkbook;
use crate::warning::Warning;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use aggregator::{build_current_report, build_session_payload};
pub use options::{CurrentReportOptions, DEFAULT_WEAK_THRESHOLD, SubjectSort};

/// One subject of one student within the report window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub name: String,
    /// Highest first
    pub grades: Vec<u8>,
    pub attendance: Vec<String>,
    /// Mean of `grades` rounded to one decimal; `None` when there are no grades
    pub average: Option<f64>,
    pub is_weak: bool,
}

/// Everything a renderer needs for one student's label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLabel {
    pub name: String,
    pub class_label: String,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub subjects: Vec<SubjectSummary>,
    pub weak_subjects: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Condensed label for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentPreview {
    pub name: String,
    pub class_label: String,
    pub subject_count: usize,
    pub average_score: Option<f64>,
    pub has_weak_subjects: bool,
    pub weak_subjects: Vec<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReportPreview {
    pub session_id: String,
    pub students: Vec<StudentPreview>,
    /// Workbook-level warnings
    pub warnings: Vec<Warning>,
}

/// Full result of one report build, handed to a session store as one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSessionPayload {
    pub workbook: ParsedWorkbook,
    pub options: CurrentReportOptions,
    pub preview: CurrentReportPreview,
    pub labels: Vec<StudentLabel>,
}
