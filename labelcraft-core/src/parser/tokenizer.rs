//! Splits one grade cell into grades and attendance codes

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// Lowest and highest accepted grade
pub const GRADE_RANGE: std::ops::RangeInclusive<u32> = 2..=5;

static TOKEN_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;]+").expect("static token regex"));

/// Problem with a single token of a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenIssue {
    /// All-digit token outside the grade range
    InvalidGrade(String),
    /// Neither a grade nor a known attendance code
    UnknownToken(String),
}

impl fmt::Display for TokenIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenIssue::InvalidGrade(token) => write!(f, "invalid_grade {}", token),
            TokenIssue::UnknownToken(token) => write!(f, "unknown_token {}", token),
        }
    }
}

/// Result of tokenizing one cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellTokens {
    pub grades: Vec<u8>,
    pub attendance: Vec<String>,
    pub issues: Vec<TokenIssue>,
    /// More than one token was found in the cell
    pub multiple: bool,
}

/// Tokenize raw cell text against the recognized attendance codes.
///
/// `/` counts as a separator, so `3/3` yields two grades. Output order
/// follows token order in the cell.
pub fn tokenize_cell(raw_text: &str, attendance_codes: &BTreeSet<String>) -> CellTokens {
    let cleaned = raw_text.replace('/', " ");
    let tokens: Vec<&str> = TOKEN_SPLIT_RE
        .split(&cleaned)
        .filter(|t| !t.is_empty())
        .collect();

    let mut result = CellTokens {
        multiple: tokens.len() > 1,
        ..CellTokens::default()
    };

    for token in tokens {
        if attendance_codes.contains(token) {
            result.attendance.push(token.to_string());
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            match token.parse::<u32>() {
                Ok(value) if GRADE_RANGE.contains(&value) => result.grades.push(value as u8),
                _ => result.issues.push(TokenIssue::InvalidGrade(token.to_string())),
            }
            continue;
        }
        result.issues.push(TokenIssue::UnknownToken(token.to_string()));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::default_attendance_codes;

    #[test]
    fn test_slash_separated_grades() {
        let tokens = tokenize_cell("3/3", &default_attendance_codes());
        assert_eq!(tokens.grades, vec![3, 3]);
        assert!(tokens.attendance.is_empty());
        assert!(tokens.multiple);
        assert!(tokens.issues.is_empty());
    }

    #[test]
    fn test_invalid_grade_is_reported_and_dropped() {
        let tokens = tokenize_cell("0 3", &default_attendance_codes());
        assert_eq!(tokens.grades, vec![3]);
        assert_eq!(tokens.issues[0].to_string(), "invalid_grade 0");
    }

    #[test]
    fn test_grade_with_attendance() {
        let tokens = tokenize_cell("3 Н", &default_attendance_codes());
        assert_eq!(tokens.grades, vec![3]);
        assert_eq!(tokens.attendance, vec!["Н".to_string()]);
        assert!(tokens.issues.is_empty());
    }

    #[test]
    fn test_mixed_separators_keep_order() {
        let tokens = tokenize_cell("Б;5, 4  У", &default_attendance_codes());
        assert_eq!(tokens.grades, vec![5, 4]);
        assert_eq!(tokens.attendance, vec!["Б".to_string(), "У".to_string()]);
        assert!(tokens.multiple);
    }

    #[test]
    fn test_unknown_token() {
        let tokens = tokenize_cell("зач", &default_attendance_codes());
        assert!(tokens.grades.is_empty());
        assert!(!tokens.multiple);
        assert_eq!(
            tokens.issues,
            vec![TokenIssue::UnknownToken("зач".to_string())]
        );
    }

    #[test]
    fn test_out_of_range_grades() {
        let tokens = tokenize_cell("6 1 12", &default_attendance_codes());
        assert!(tokens.grades.is_empty());
        assert_eq!(tokens.issues.len(), 3);
        assert_eq!(tokens.issues[2].to_string(), "invalid_grade 12");
    }

    #[test]
    fn test_custom_legend_code() {
        let mut codes = default_attendance_codes();
        codes.insert("П".to_string());
        let tokens = tokenize_cell("П", &codes);
        assert_eq!(tokens.attendance, vec!["П".to_string()]);
    }
}
