//! Column-to-date mapping for the month/day header band, plus the
//! academic-year and period phrase parsers used by header rows.

use crate::reader::Grid;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// First month of the academic year (September)
const ACADEMIC_YEAR_FIRST_MONTH: u32 = 9;

const MONTH_ALIASES: &[(&str, u32)] = &[
    ("январь", 1),
    ("янв", 1),
    ("февраль", 2),
    ("фев", 2),
    ("март", 3),
    ("мар", 3),
    ("апрель", 4),
    ("апр", 4),
    ("май", 5),
    ("июнь", 6),
    ("июн", 6),
    ("июль", 7),
    ("июл", 7),
    ("август", 8),
    ("авг", 8),
    ("сентябрь", 9),
    ("сен", 9),
    ("сент", 9),
    ("октябрь", 10),
    ("окт", 10),
    ("ноябрь", 11),
    ("ноя", 11),
    ("декабрь", 12),
    ("дек", 12),
];

static ACADEMIC_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})\s*[/\\-]\s*(\d{4})").expect("static academic year regex"));

static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)с\s*(\d{1,2}[./]\d{1,2}[./]\d{2,4}).*по\s*(\d{1,2}[./]\d{1,2}[./]\d{2,4})")
        .expect("static period regex")
});

/// Context used to pick a calendar year for a (month, day) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearContext {
    pub academic_year_start: Option<i32>,
    pub academic_year_end: Option<i32>,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    /// Used only when no academic year or period year is known
    pub fallback_year: i32,
}

/// Problem found while mapping one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateIssue {
    UnknownMonth { col: usize, label: String },
    InvalidDay { col: usize, value: String },
    UnresolvedYear { col: usize, month: u32, day: u32 },
    InvalidDate { col: usize, year: i32, month: u32, day: u32 },
}

impl DateIssue {
    pub fn col(&self) -> usize {
        match self {
            DateIssue::UnknownMonth { col, .. }
            | DateIssue::InvalidDay { col, .. }
            | DateIssue::UnresolvedYear { col, .. }
            | DateIssue::InvalidDate { col, .. } => *col,
        }
    }
}

/// Mapping from data column to resolved date, with the issues hit on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateMapping {
    pub columns: BTreeMap<usize, NaiveDate>,
    pub issues: Vec<DateIssue>,
}

/// Parse a month label through the alias table
pub fn parse_month(label: &str) -> Option<u32> {
    let key = label
        .replace('\u{a0}', " ")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let key = key.trim_end_matches('.');
    MONTH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, month)| *month)
}

/// Resolve every data column of the band whose month labels sit on
/// `month_row` and day numbers on `day_row`.
pub fn build_date_mapping(grid: &Grid, month_row: usize, day_row: usize, ctx: &YearContext) -> DateMapping {
    let mut mapping = DateMapping::default();
    let mut current_month: Option<u32> = None;

    for col in 2..=grid.max_col() {
        if let Some(label) = grid.get(month_row, col) {
            current_month = parse_month(label);
            if current_month.is_none() {
                mapping.issues.push(DateIssue::UnknownMonth {
                    col,
                    label: label.to_string(),
                });
            }
        }
        let Some(month) = current_month else {
            continue;
        };

        let Some(day_raw) = grid.get(day_row, col) else {
            continue;
        };
        let day = match day_raw.trim().parse::<u32>() {
            Ok(day) => day,
            Err(_) => {
                mapping.issues.push(DateIssue::InvalidDay {
                    col,
                    value: day_raw.to_string(),
                });
                continue;
            }
        };

        let Some(year) = resolve_year(month, day, ctx) else {
            mapping.issues.push(DateIssue::UnresolvedYear { col, month, day });
            continue;
        };

        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => {
                mapping.columns.insert(col, date);
            }
            None => mapping.issues.push(DateIssue::InvalidDate {
                col,
                year,
                month,
                day,
            }),
        }
    }

    mapping
}

/// Pick the calendar year for a (month, day) pair.
///
/// A known academic year wins outright. Otherwise the period years are tried
/// in order, then a cross-year guess from the period bounds.
pub fn resolve_year(month: u32, day: u32, ctx: &YearContext) -> Option<i32> {
    if let (Some(start), Some(end)) = (ctx.academic_year_start, ctx.academic_year_end) {
        return Some(if month >= ACADEMIC_YEAR_FIRST_MONTH { start } else { end });
    }

    let mut candidates = Vec::with_capacity(2);
    if let Some(from) = ctx.period_from {
        candidates.push(from.year());
    }
    if let Some(to) = ctx.period_to {
        let year = to.year();
        if !candidates.contains(&year) {
            candidates.push(year);
        }
    }
    if candidates.is_empty() {
        candidates.push(ctx.fallback_year);
    }

    let bounds = ctx.period_from.zip(ctx.period_to);
    for year in candidates {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        match bounds {
            Some((from, to)) if !(from <= date && date <= to) => continue,
            _ => return Some(year),
        }
    }

    // TODO: confirm this guess for periods that cross a calendar-year boundary
    bounds.map(|(from, to)| {
        if month >= ACADEMIC_YEAR_FIRST_MONTH {
            from.year()
        } else {
            to.year()
        }
    })
}

/// Parse `YYYY/YYYY`, `YYYY-YYYY` or `YYYY\YYYY`; an end year before the
/// start year is coerced to start + 1.
pub fn parse_academic_year(text: &str) -> Option<(i32, i32)> {
    let caps = ACADEMIC_YEAR_RE.captures(text)?;
    let start: i32 = caps[1].parse().ok()?;
    let mut end: i32 = caps[2].parse().ok()?;
    if end < start {
        end = start + 1;
    }
    Some((start, end))
}

/// Parse `с DD.MM.YYYY ... по DD.MM.YYYY`
pub fn parse_period(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let caps = PERIOD_RE.captures(text)?;
    let from = parse_date(&caps[1])?;
    let to = parse_date(&caps[2])?;
    Some((from, to))
}

/// Parse `DD.MM.YYYY` (or `/` separated); two-digit years become `20YY`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.replace('/', ".").replace(' ', "");
    let parts: Vec<&str> = normalized.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let year = if year.len() == 2 {
        format!("20{}", year)
    } else {
        year.to_string()
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
