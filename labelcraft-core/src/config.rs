//! Report configuration loaded from TOML

use crate::report::{CurrentReportOptions, DEFAULT_WEAK_THRESHOLD, SubjectSort};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "labelcraft.toml";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub report: ReportDefaults,
}

/// `[report]` table; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDefaults {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub weak_threshold: Option<f64>,
    pub show_weak_subjects: Option<bool>,
    pub subject_sort: Option<SubjectSort>,
    pub show_guides: Option<bool>,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `path` if given, else `labelcraft.toml` from `dir` if present,
    /// else an empty configuration
    pub fn load(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Check the values that are present
    pub fn validate(&self) -> Result<()> {
        let report = &self.report;
        if let Some(threshold) = report.weak_threshold {
            if !threshold.is_finite() {
                anyhow::bail!(
                    "Configuration error: weak_threshold must be a finite number, got {}",
                    threshold
                );
            }
        }
        if let (Some(from), Some(to)) = (report.date_from, report.date_to) {
            if from > to {
                anyhow::bail!(
                    "Configuration error: date_from ({}) is after date_to ({})",
                    from,
                    to
                );
            }
        }
        Ok(())
    }

    /// Resolve into report options; both window dates must be set
    pub fn to_options(&self) -> Result<CurrentReportOptions> {
        self.validate()?;
        let report = &self.report;
        let Some(date_from) = report.date_from else {
            anyhow::bail!("Configuration error: date_from is required");
        };
        let Some(date_to) = report.date_to else {
            anyhow::bail!("Configuration error: date_to is required");
        };

        Ok(CurrentReportOptions {
            date_from,
            date_to,
            weak_threshold: report.weak_threshold.unwrap_or(DEFAULT_WEAK_THRESHOLD),
            show_weak_subjects: report.show_weak_subjects.unwrap_or(true),
            subject_sort: report.subject_sort.unwrap_or_default(),
            show_guides: report.show_guides.unwrap_or(false),
        })
    }
}
