//! Command-line front end: report workbook metrics as JSON or YAML.
//!
//! ```bash
//! workbook-metrics --config config.yml --pretty downloads/
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use workbook_metrics::policy::{Config, Violation};
use workbook_metrics::{FileMetrics, MetricsRecord, collect_workbook_paths, workbook_metrics_many};

#[derive(Parser)]
#[command(name = "workbook-metrics")]
#[command(about = "Structural and complexity metrics for Tableau workbooks", long_about = None)]
struct Cli {
    /// Workbook files (.twb, .twbx) or directories containing them.
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
    /// YAML file with `logging_level` and `performance_thresholds`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
    /// Exit with status 1 if any workbook fails or violates a threshold.
    #[arg(long)]
    fail_on_violation: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct Report {
    path: String,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Ok {
        metrics: MetricsRecord,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        violations: Vec<Violation>,
    },
    Err {
        error: String,
    },
}

impl Outcome {
    fn is_clean(&self) -> bool {
        matches!(self, Outcome::Ok { violations, .. } if violations.is_empty())
    }
}

fn expand_paths(inputs: &[PathBuf]) -> workbook_metrics::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(collect_workbook_paths(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    let default_level = config.logging_level.as_deref().unwrap_or("error");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let paths = expand_paths(&cli.paths)?;
    log::info!("processing {} workbook(s)", paths.len());

    let reports: Vec<Report> = workbook_metrics_many(&paths)
        .into_iter()
        .map(|FileMetrics { path, result }| {
            let outcome = match result {
                Ok(metrics) => Outcome::Ok {
                    violations: config.performance_thresholds.check(&metrics),
                    metrics,
                },
                Err(err) => Outcome::Err { error: err.to_string() },
            };
            Report {
                path: path.display().to_string(),
                outcome,
            }
        })
        .collect();

    let out_str = match cli.format {
        Format::Json if cli.pretty => serde_json::to_string_pretty(&reports)?,
        Format::Json => serde_json::to_string(&reports)?,
        Format::Yaml => serde_saphyr::to_string(&reports)?,
    };
    println!("{}", out_str);

    if cli.fail_on_violation && !reports.iter().all(|report| report.outcome.is_clean()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
