//! Report window and rendering toggles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_WEAK_THRESHOLD: f64 = 2.5;

/// Subject ordering inside a label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectSort {
    /// By name, case-insensitive
    #[default]
    Alpha,
    /// By average, highest first; subjects without grades last
    AvgDesc,
}

impl SubjectSort {
    pub fn as_str(&self) -> &str {
        match self {
            SubjectSort::Alpha => "alpha",
            SubjectSort::AvgDesc => "avg_desc",
        }
    }
}

impl fmt::Display for SubjectSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one current-report build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReportOptions {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: f64,
    #[serde(default = "default_true")]
    pub show_weak_subjects: bool,
    #[serde(default)]
    pub subject_sort: SubjectSort,
    #[serde(default)]
    pub show_guides: bool,
}

impl CurrentReportOptions {
    /// Options for the window `[date_from, date_to]` with default toggles
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            weak_threshold: DEFAULT_WEAK_THRESHOLD,
            show_weak_subjects: true,
            subject_sort: SubjectSort::Alpha,
            show_guides: false,
        }
    }

    /// Whether `date` falls inside the report window (inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }
}

fn default_weak_threshold() -> f64 {
    DEFAULT_WEAK_THRESHOLD
}

fn default_true() -> bool {
    true
}
