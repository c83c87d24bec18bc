//! Output formatters for built reports

use anyhow::Result;
use colored::*;
use labelcraft_core::{ReportSessionPayload, StudentLabel, SubjectSummary, Warning};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

const GUIDE_WIDTH: usize = 60;

/// One successfully processed input file
pub struct FileReport {
    pub path: PathBuf,
    pub payload: ReportSessionPayload,
}

/// Print labels in human-readable format with colors
pub fn print_human(report: &FileReport) {
    let payload = &report.payload;
    let workbook = &payload.workbook;

    println!("{}", format!("Report: {}", report.path.display()).bold());
    if let Some(school) = &workbook.school_name {
        println!("  {} {}", "School:".bold(), school);
    }
    if let (Some(start), Some(end)) = (workbook.academic_year_start, workbook.academic_year_end) {
        println!("  {} {}/{}", "Academic year:".bold(), start, end);
    }
    println!(
        "  {} {} - {}",
        "Window:".bold(),
        payload.options.date_from.format("%d.%m.%Y"),
        payload.options.date_to.format("%d.%m.%Y")
    );
    println!();

    if payload.labels.is_empty() {
        println!("{}", "No students found".yellow().bold());
    }

    for label in &payload.labels {
        if payload.options.show_guides {
            println!("{}", "-".repeat(GUIDE_WIDTH).bright_black());
        }
        print_label(label, payload.options.show_weak_subjects);
        println!();
    }
    if payload.options.show_guides && !payload.labels.is_empty() {
        println!("{}", "-".repeat(GUIDE_WIDTH).bright_black());
        println!();
    }

    if !payload.preview.warnings.is_empty() {
        println!("{}", "Workbook warnings:".bold().underline());
        for warning in &payload.preview.warnings {
            print_warning(warning, 1);
        }
        println!();
    }

    let section_warnings: usize = payload.labels.iter().map(|l| l.warnings.len()).sum();
    let weak_students = payload
        .labels
        .iter()
        .filter(|l| !l.weak_subjects.is_empty())
        .count();

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Students:".bold(), payload.labels.len());
    if payload.options.show_weak_subjects && weak_students > 0 {
        println!("  {} {}", "With weak subjects:".red().bold(), weak_students);
    }
    let total_warnings = section_warnings + payload.preview.warnings.len();
    if total_warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), total_warnings);
    }
}

fn print_label(label: &StudentLabel, show_weak: bool) {
    println!("{}", label.name.cyan().bold());
    if !label.class_label.is_empty() {
        println!("  Класс: {}", label.class_label);
    }
    match (label.period_from, label.period_to) {
        (Some(from), Some(to)) => println!(
            "  Период: {} - {}",
            from.format("%d.%m.%Y"),
            to.format("%d.%m.%Y")
        ),
        (Some(single), None) | (None, Some(single)) => {
            println!("  Период: {}", single.format("%d.%m.%Y"))
        }
        (None, None) => {}
    }

    for subject in &label.subjects {
        let line = subject_line(subject);
        if show_weak && subject.is_weak {
            println!("  {}", line.red());
        } else {
            println!("  {}", line);
        }
    }

    if show_weak && !label.weak_subjects.is_empty() {
        println!(
            "  {} {}",
            "Weak:".red().bold(),
            label.weak_subjects.join(", ")
        );
    }
    for warning in &label.warnings {
        print_warning(warning, 1);
    }
}

fn subject_line(subject: &SubjectSummary) -> String {
    let grades = if subject.grades.is_empty() {
        "-".to_string()
    } else {
        join(&subject.grades, ", ")
    };
    let average = subject
        .average
        .map(|avg| format!("{:.1}", avg))
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!("{}: {} (ср. {})", subject.name, grades, average);
    if !subject.attendance.is_empty() {
        line.push_str(&format!(" [{}]", subject.attendance.join(" ")));
    }
    line
}

fn print_warning(warning: &Warning, indent: usize) {
    println!(
        "{}{} [{}] {}",
        "  ".repeat(indent),
        "WARN".yellow().bold(),
        warning.kind.as_str().bright_black(),
        warning.message
    );
}

/// Print all reports as one JSON document
pub fn print_json(reports: &[FileReport]) -> Result<()> {
    let files: Vec<_> = reports
        .iter()
        .map(|report| {
            serde_json::json!({
                "file": report.path.display().to_string(),
                "session_id": report.payload.preview.session_id,
                "preview": report.payload.preview,
                "labels": report.payload.labels,
                "workbook": report.payload.workbook,
            })
        })
        .collect();
    let output = serde_json::json!({
        "files": files,
        "summary": {
            "files": reports.len(),
            "students": reports.iter().map(|r| r.payload.labels.len()).sum::<usize>(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One CSV line per (file, student, subject)
#[derive(Debug, Serialize)]
struct SubjectRecord<'a> {
    file: String,
    student: &'a str,
    class: &'a str,
    subject: &'a str,
    grades: String,
    attendance: String,
    average: Option<f64>,
    is_weak: bool,
}

/// Write subject summaries of all reports as CSV
pub fn write_csv<W: Write>(reports: &[FileReport], out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);

    for report in reports {
        for label in &report.payload.labels {
            for subject in &label.subjects {
                writer.serialize(SubjectRecord {
                    file: file_name(&report.path),
                    student: &label.name,
                    class: &label.class_label,
                    subject: &subject.name,
                    grades: join(&subject.grades, " "),
                    attendance: subject.attendance.join(" "),
                    average: subject.average,
                    is_weak: subject.is_weak,
                })?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn join(grades: &[u8], separator: &str) -> String {
    grades
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}
