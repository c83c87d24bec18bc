use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use colored::*;
use labelcraft_core::{QuarterParser, ReportConfig, SubjectSort, build_session_payload};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

mod formatter;

use formatter::FileReport;

#[derive(Parser)]
#[command(name = "labelcraft")]
#[command(about = "Build student label reports from quarterly grade exports", long_about = None)]
#[command(version)]
struct Cli {
    /// Grade export files (.xlsx)
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First day of the report window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last day of the report window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// Subjects with an average strictly below this are weak
    #[arg(long, value_name = "F")]
    weak_threshold: Option<f64>,

    /// Subject order inside each label
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Do not flag weak subjects
    #[arg(long)]
    hide_weak: bool,

    /// Draw cut guides between labels
    #[arg(long)]
    guides: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Session id stored in the report preview (defaults to the file stem)
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,

    /// Calendar year used when a date has no academic year or period
    #[arg(long, value_name = "YEAR")]
    fallback_year: Option<i32>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output with previews, labels and parsed workbooks
    Json,
    /// One CSV row per student subject
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Alpha,
    AvgDesc,
}

impl From<SortArg> for SubjectSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alpha => SubjectSort::Alpha,
            SortArg::AvgDesc => SubjectSort::AvgDesc,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Load configuration, command line flags win
    let mut config = ReportConfig::load(cli.config.as_deref(), Path::new("."))
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    let options = config.to_options().context("Invalid configuration")?;

    let parser = match cli.fallback_year {
        Some(year) => QuarterParser::with_fallback_year(year),
        None => QuarterParser::new(),
    };

    // Each file is parsed independently
    let results: Vec<(PathBuf, Result<_>)> = cli
        .files
        .par_iter()
        .map(|path| (path.clone(), parser.parse_file(path)))
        .collect();

    let mut reports = Vec::new();
    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(workbook) => {
                let session_id = cli
                    .session_id
                    .clone()
                    .unwrap_or_else(|| default_session_id(&path));
                let payload = build_session_payload(&workbook, &options, &session_id);
                reports.push(FileReport { path, payload });
            }
            Err(err) => {
                failed += 1;
                log::error!("{}: {:#}", path.display(), err);
                eprintln!("{} {:#}", "error:".red().bold(), err);
            }
        }
    }

    match cli.format {
        OutputFormat::Human => {
            for report in &reports {
                formatter::print_human(report);
                println!();
            }
        }
        OutputFormat::Json => {
            formatter::print_json(&reports)?;
        }
        OutputFormat::Csv => {
            formatter::write_csv(&reports, std::io::stdout().lock())?;
        }
    }

    // Warnings never fail the run
    let exit_code = if failed > 0 { 1 } else { 0 };
    std::process::exit(exit_code);
}

fn apply_overrides(config: &mut ReportConfig, cli: &Cli) {
    let report = &mut config.report;
    if let Some(from) = cli.from {
        report.date_from = Some(from);
    }
    if let Some(to) = cli.to {
        report.date_to = Some(to);
    }
    if let Some(threshold) = cli.weak_threshold {
        report.weak_threshold = Some(threshold);
    }
    if let Some(sort) = cli.sort {
        report.subject_sort = Some(sort.into());
    }
    if cli.hide_weak {
        report.show_weak_subjects = Some(false);
    }
    if cli.guides {
        report.show_guides = Some(true);
    }
}

fn default_session_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string())
}
