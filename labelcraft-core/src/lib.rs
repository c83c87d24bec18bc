//! labelcraft-core: Core library for quarterly grade report parsing
//!
//! This library reads a semi-structured grade export (free-text headers,
//! merged cells, one block of rows per student) into a normalized model and
//! aggregates it into per-student label summaries. Recoverable problems are
//! returned as [`Warning`] values next to the parsed data.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod reader;
pub mod report;
pub mod warning;

pub use config::ReportConfig;
pub use error::ParseError;
pub use model::{ParsedEntry, ParsedWorkbook, StudentSection};
pub use parser::QuarterParser;
pub use report::{
    CurrentReportOptions, CurrentReportPreview, ReportSessionPayload, StudentLabel,
    StudentPreview, SubjectSort, SubjectSummary, build_current_report, build_session_payload,
};
pub use warning::{CellReference, Warning, WarningKind, WarningScope};
