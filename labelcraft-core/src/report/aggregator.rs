//! Groups parsed entries into per-subject summaries

use super::{
    CurrentReportOptions, CurrentReportPreview, ReportSessionPayload, StudentLabel, StudentPreview,
    SubjectSort, SubjectSummary,
};
use crate::model::{ParsedWorkbook, StudentSection};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct SubjectGroup {
    grades: Vec<u8>,
    attendance: Vec<String>,
}

/// Build one label and one preview per student, in name order
pub fn build_current_report(
    workbook: &ParsedWorkbook,
    options: &CurrentReportOptions,
) -> (Vec<StudentLabel>, CurrentReportPreview) {
    let mut sections: Vec<&StudentSection> = workbook.students.iter().collect();
    sections.sort_by_key(|s| s.name.to_lowercase());

    let mut labels = Vec::with_capacity(sections.len());
    let mut previews = Vec::with_capacity(sections.len());

    for section in sections {
        let label = build_label(section, options);
        let all_grades: Vec<u8> = label
            .subjects
            .iter()
            .flat_map(|s| s.grades.iter().copied())
            .collect();

        previews.push(StudentPreview {
            name: label.name.clone(),
            class_label: label.class_label.clone(),
            subject_count: label.subjects.len(),
            average_score: rounded_mean(&all_grades),
            has_weak_subjects: options.show_weak_subjects && !label.weak_subjects.is_empty(),
            weak_subjects: if options.show_weak_subjects {
                label.weak_subjects.clone()
            } else {
                Vec::new()
            },
            warnings: section.warnings.clone(),
        });
        labels.push(label);
    }

    log::debug!(
        "Built {} labels for window {}..{}",
        labels.len(),
        options.date_from,
        options.date_to
    );

    let preview = CurrentReportPreview {
        session_id: String::new(),
        students: previews,
        warnings: workbook.warnings.clone(),
    };
    (labels, preview)
}

/// Build the report and bundle it with its inputs under `session_id`
pub fn build_session_payload(
    workbook: &ParsedWorkbook,
    options: &CurrentReportOptions,
    session_id: &str,
) -> ReportSessionPayload {
    let (labels, mut preview) = build_current_report(workbook, options);
    preview.session_id = session_id.to_string();
    ReportSessionPayload {
        workbook: workbook.clone(),
        options: options.clone(),
        preview,
        labels,
    }
}

fn build_label(section: &StudentSection, options: &CurrentReportOptions) -> StudentLabel {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, SubjectGroup> = HashMap::new();

    for entry in &section.entries {
        if !options.contains(entry.date) {
            continue;
        }
        let subject = entry.subject.trim();
        if subject.is_empty() {
            continue;
        }
        let group = groups.entry(subject.to_string()).or_insert_with(|| {
            order.push(subject.to_string());
            SubjectGroup::default()
        });
        group.grades.extend_from_slice(&entry.grades);
        group.attendance.extend(entry.attendance.iter().cloned());
    }

    let mut subjects = Vec::with_capacity(order.len());
    let mut weak_subjects = Vec::new();
    for name in order {
        let Some(group) = groups.remove(&name) else {
            continue;
        };
        let average = rounded_mean(&group.grades);
        let is_weak = average.is_some_and(|avg| avg < options.weak_threshold);
        if is_weak {
            weak_subjects.push(name.clone());
        }
        let mut grades = group.grades;
        grades.sort_unstable_by(|a, b| b.cmp(a));
        subjects.push(SubjectSummary {
            name,
            grades,
            attendance: group.attendance,
            average,
            is_weak,
        });
    }
    sort_subjects(&mut subjects, options.subject_sort);

    let name = if section.name.is_empty() {
        section.name_raw.clone()
    } else {
        section.name.clone()
    };

    StudentLabel {
        name,
        class_label: section.class_label.clone(),
        period_from: section.period_from,
        period_to: section.period_to,
        subjects,
        weak_subjects,
        warnings: section.warnings.clone(),
    }
}

fn sort_subjects(subjects: &mut [SubjectSummary], sort: SubjectSort) {
    match sort {
        SubjectSort::Alpha => subjects.sort_by_key(|s| s.name.to_lowercase()),
        SubjectSort::AvgDesc => subjects.sort_by(|a, b| {
            let a = a.average.unwrap_or(-1.0);
            let b = b.average.unwrap_or(-1.0);
            b.total_cmp(&a)
        }),
    }
}

/// Arithmetic mean rounded half to even at one decimal
fn rounded_mean(grades: &[u8]) -> Option<f64> {
    if grades.is_empty() {
        return None;
    }
    let sum: u32 = grades.iter().map(|&g| u32::from(g)).sum();
    let mean = f64::from(sum) / grades.len() as f64;
    Some((mean * 10.0).round_ties_even() / 10.0)
}
