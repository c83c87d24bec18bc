//! Section scanner: a row-driven state machine that splits the grid into
//! student sections and fills each section with entries.

use super::dates::{self, DateIssue, YearContext};
use super::rows::{self, RowKind, classify_row};
use super::tokenizer::{TokenIssue, tokenize_cell};
use super::default_attendance_codes;
use crate::model::{ParsedEntry, ParsedWorkbook, StudentSection};
use crate::reader::Grid;
use crate::warning::{Warning, WarningKind, WarningScope};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Before any student header: collecting school, year, class, period
    SeekingMeta,
    /// After a student header, looking for the subject table
    SectionHeader,
    /// Reading subject rows under a resolved month/day band
    SubjectTable,
    /// Past a blank row inside the table: legend entries or trailing subjects
    LegendOrTail,
}

/// What the driver loop does after one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Move to the next row
    Next,
    /// Move past the subject header and its day row
    SkipBand,
    /// Handle the same row again in the new phase
    Reprocess,
}

/// Header values set before a student header, inherited by each new section
#[derive(Debug, Clone, Default)]
struct HeaderDefaults {
    class_label: String,
    period: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug)]
struct SectionBuilder {
    name_raw: String,
    name: String,
    class_label: String,
    period_from: Option<NaiveDate>,
    period_to: Option<NaiveDate>,
    academic_year: (Option<i32>, Option<i32>),
    attendance_codes: BTreeSet<String>,
    legend: BTreeMap<String, String>,
    entries: Vec<ParsedEntry>,
    warnings: Vec<Warning>,
    dates: BTreeMap<usize, NaiveDate>,
    table_found: bool,
}

impl SectionBuilder {
    fn scope(&self) -> WarningScope {
        WarningScope::Section(self.name.clone())
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        let warning = Warning::new(kind, self.scope(), message);
        self.warnings.push(warning);
    }

    fn warn_at(&mut self, kind: WarningKind, message: String, row: usize, col: usize) {
        let warning = Warning::new(kind, self.scope(), message).at(row, col);
        self.warnings.push(warning);
    }

    fn finish(mut self) -> StudentSection {
        if !self.table_found {
            let message = format!("[{}] subject table not found for student", self.name);
            self.warn(WarningKind::MissingSubjectTable, message);
        }
        log::debug!(
            "Section '{}' finished: {} entries, {} warnings",
            self.name,
            self.entries.len(),
            self.warnings.len()
        );
        StudentSection {
            name_raw: self.name_raw,
            name: self.name,
            class_label: self.class_label,
            period_from: self.period_from,
            period_to: self.period_to,
            entries: self.entries,
            attendance_legend: self.legend,
            warnings: self.warnings,
        }
    }
}

/// Walks a grid top to bottom and produces the parsed workbook
pub struct SectionScanner<'g> {
    grid: &'g Grid,
    fallback_year: i32,
    phase: ScanPhase,
    school_name: Option<String>,
    academic_year: (Option<i32>, Option<i32>),
    defaults: HeaderDefaults,
    current: Option<SectionBuilder>,
    sections: Vec<StudentSection>,
    warnings: Vec<Warning>,
}

impl<'g> SectionScanner<'g> {
    pub fn new(grid: &'g Grid, fallback_year: i32) -> Self {
        Self {
            grid,
            fallback_year,
            phase: ScanPhase::SeekingMeta,
            school_name: None,
            academic_year: (None, None),
            defaults: HeaderDefaults::default(),
            current: None,
            sections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Current state of the machine
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Scan every row and return the parsed workbook
    pub fn scan(mut self, sheet_name: &str) -> ParsedWorkbook {
        let mut row = 1;
        while row <= self.grid.max_row() {
            let kind = classify_row(self.grid, row);
            match self.step(row, kind) {
                Step::Next => row += 1,
                Step::SkipBand => row += 2,
                Step::Reprocess => {}
            }
        }
        self.close_section();

        let mut students = self.sections;
        students.sort_by_key(|s| s.name.to_lowercase());

        ParsedWorkbook {
            sheet_name: sheet_name.to_string(),
            school_name: self.school_name,
            academic_year_start: self.academic_year.0,
            academic_year_end: self.academic_year.1,
            students,
            warnings: self.warnings,
        }
    }

    fn step(&mut self, row: usize, kind: RowKind<'_>) -> Step {
        match self.phase {
            ScanPhase::SeekingMeta => self.step_meta(kind),
            ScanPhase::SectionHeader => self.step_header(row, kind),
            ScanPhase::SubjectTable | ScanPhase::LegendOrTail => self.step_table(row, kind),
        }
    }

    fn step_meta(&mut self, kind: RowKind<'_>) -> Step {
        match kind {
            RowKind::School(text) => self.set_school(text),
            RowKind::AcademicYear(text) => match dates::parse_academic_year(text) {
                Some((start, end)) => self.academic_year = (Some(start), Some(end)),
                None => self.warnings.push(Warning::new(
                    WarningKind::UnparsedHeader,
                    WarningScope::Workbook,
                    format!("unrecognized academic year: {}", text),
                )),
            },
            RowKind::Class(text) => self.defaults.class_label = rows::extract_value(text),
            RowKind::Period(text) => match dates::parse_period(text) {
                Some(period) => self.defaults.period = Some(period),
                None => self.warnings.push(Warning::new(
                    WarningKind::UnparsedHeader,
                    WarningScope::Workbook,
                    format!("unrecognized period: {}", text),
                )),
            },
            RowKind::Student(text) => self.open_section(text),
            RowKind::Blank
            | RowKind::SubjectHeader
            | RowKind::Legend { .. }
            | RowKind::Data(_) => {}
        }
        Step::Next
    }

    fn step_header(&mut self, row: usize, kind: RowKind<'_>) -> Step {
        let Some(section) = self.current.as_mut() else {
            self.phase = ScanPhase::SeekingMeta;
            return Step::Reprocess;
        };

        match kind {
            RowKind::Student(text) => {
                self.close_section();
                self.open_section(text);
            }
            RowKind::AcademicYear(text) => match dates::parse_academic_year(text) {
                Some((start, end)) => {
                    section.academic_year = (Some(start), Some(end));
                    self.academic_year = (Some(start), Some(end));
                }
                None => section.warn(
                    WarningKind::UnparsedHeader,
                    format!("[{}] unrecognized academic year: {}", section.name, text),
                ),
            },
            RowKind::Class(text) => section.class_label = rows::extract_value(text),
            RowKind::Period(text) => match dates::parse_period(text) {
                Some((from, to)) => {
                    section.period_from = Some(from);
                    section.period_to = Some(to);
                }
                None => section.warn(
                    WarningKind::UnparsedHeader,
                    format!("[{}] unrecognized period: {}", section.name, text),
                ),
            },
            RowKind::School(text) => self.set_school(text),
            RowKind::SubjectHeader => return self.open_table(row),
            RowKind::Blank | RowKind::Legend { .. } | RowKind::Data(_) => {}
        }
        Step::Next
    }

    fn step_table(&mut self, row: usize, kind: RowKind<'_>) -> Step {
        if kind.is_meta() || matches!(kind, RowKind::Student(_)) {
            self.close_section();
            return Step::Reprocess;
        }

        match kind {
            RowKind::Legend { code, description } => {
                if let Some(section) = self.current.as_mut() {
                    section.legend.insert(code.to_string(), description.to_string());
                    section.attendance_codes.insert(code.to_string());
                }
                Step::Next
            }
            RowKind::Blank => {
                let next_is_student = self
                    .next_first_column(row + 1)
                    .is_some_and(rows::is_student_header);
                if next_is_student {
                    self.close_section();
                } else {
                    self.phase = ScanPhase::LegendOrTail;
                }
                Step::Next
            }
            RowKind::SubjectHeader => self.open_table(row),
            RowKind::Data(subject) => {
                self.phase = ScanPhase::SubjectTable;
                self.read_subject_row(row, subject);
                Step::Next
            }
            _ => Step::Next,
        }
    }

    fn set_school(&mut self, text: &str) {
        let value = rows::extract_value(text);
        if !value.is_empty() {
            self.school_name = Some(value);
        }
    }

    fn open_section(&mut self, header: &str) {
        let name_raw = rows::extract_value(header);
        let name = rows::normalize_name(&name_raw);
        log::debug!("Opening section for '{}'", name);
        self.current = Some(SectionBuilder {
            name_raw,
            name,
            class_label: self.defaults.class_label.clone(),
            period_from: self.defaults.period.map(|(from, _)| from),
            period_to: self.defaults.period.map(|(_, to)| to),
            academic_year: self.academic_year,
            attendance_codes: default_attendance_codes(),
            legend: BTreeMap::new(),
            entries: Vec::new(),
            warnings: Vec::new(),
            dates: BTreeMap::new(),
            table_found: false,
        });
        self.phase = ScanPhase::SectionHeader;
    }

    fn close_section(&mut self) {
        if let Some(section) = self.current.take() {
            self.sections.push(section.finish());
        }
        self.phase = ScanPhase::SeekingMeta;
    }

    /// Resolve the month/day band starting at `month_row` and enter the table
    fn open_table(&mut self, month_row: usize) -> Step {
        let day_row = month_row + 1;
        if day_row > self.grid.max_row() {
            self.close_section();
            return Step::Next;
        }

        let grid = self.grid;
        let fallback_year = self.fallback_year;
        let Some(section) = self.current.as_mut() else {
            return Step::Next;
        };

        let ctx = YearContext {
            academic_year_start: section.academic_year.0,
            academic_year_end: section.academic_year.1,
            period_from: section.period_from,
            period_to: section.period_to,
            fallback_year,
        };
        let mapping = dates::build_date_mapping(grid, month_row, day_row, &ctx);
        for issue in mapping.issues {
            let (kind, row, detail) = match &issue {
                DateIssue::UnknownMonth { label, .. } => (
                    WarningKind::UnknownMonth,
                    month_row,
                    format!("unknown month '{}'", label),
                ),
                DateIssue::InvalidDay { value, .. } => (
                    WarningKind::InvalidDay,
                    day_row,
                    format!("invalid day '{}'", value),
                ),
                DateIssue::UnresolvedYear { month, day, .. } => (
                    WarningKind::UnresolvedYear,
                    day_row,
                    format!("cannot resolve year for {:02}.{:02}", day, month),
                ),
                DateIssue::InvalidDate {
                    year, month, day, ..
                } => (
                    WarningKind::InvalidDate,
                    day_row,
                    format!("invalid date {:02}.{:02}.{}", day, month, year),
                ),
            };
            let col = issue.col();
            let message = format!("[{}] {} (row={}, col={})", section.name, detail, row, col);
            section.warn_at(kind, message, row, col);
        }

        section.dates = mapping.columns;
        section.table_found = true;
        self.phase = ScanPhase::SubjectTable;
        Step::SkipBand
    }

    /// Produce one entry per mapped column with a non-empty cell on `row`
    fn read_subject_row(&mut self, row: usize, label: &str) {
        let grid = self.grid;
        let Some(section) = self.current.as_mut() else {
            return;
        };
        let subject = label.trim();
        if subject.is_empty() {
            return;
        }

        for (&col, &date) in &section.dates {
            let Some(raw) = grid.get(row, col) else {
                continue;
            };
            let tokens = tokenize_cell(raw, &section.attendance_codes);
            let scope = WarningScope::Section(section.name.clone());

            for issue in &tokens.issues {
                let kind = match issue {
                    TokenIssue::InvalidGrade(_) => WarningKind::InvalidGrade,
                    TokenIssue::UnknownToken(_) => WarningKind::UnknownToken,
                };
                let message = format!(
                    "[{}] {}: {} (row={}, col={})",
                    section.name, subject, issue, row, col
                );
                section
                    .warnings
                    .push(Warning::new(kind, scope.clone(), message).at(row, col));
            }
            if tokens.multiple {
                let message = format!(
                    "[{}] {}: multiple_tokens_in_cell (row={}, col={})",
                    section.name, subject, row, col
                );
                section
                    .warnings
                    .push(Warning::new(WarningKind::AmbiguousCell, scope.clone(), message).at(row, col));
            }
            if let (Some(from), Some(to)) = (section.period_from, section.period_to) {
                if date < from || date > to {
                    let message = format!(
                        "[{}] {}: date_out_of_period {} (row={}, col={})",
                        section.name, subject, date, row, col
                    );
                    section
                        .warnings
                        .push(Warning::new(WarningKind::DateOutOfPeriod, scope.clone(), message).at(row, col));
                }
            }

            section.entries.push(ParsedEntry {
                student_name_raw: section.name_raw.clone(),
                student_name: section.name.clone(),
                class_label: section.class_label.clone(),
                subject: subject.to_string(),
                date,
                grades: tokens.grades,
                attendance: tokens.attendance,
                raw_text: raw.to_string(),
                row,
                col,
            });
        }
    }

    /// First non-empty first-column value at or after `from_row`
    fn next_first_column(&self, from_row: usize) -> Option<&'g str> {
        let grid = self.grid;
        (from_row..=grid.max_row()).find_map(|row| grid.get(row, 1))
    }
}
