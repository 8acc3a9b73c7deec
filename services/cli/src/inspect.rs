use crate::infra::{parse_date, print_json, wizard_config};
use chrono::NaiveDate;
use clap::{ArgGroup, Args};
use intake_wizard::config::AppConfig;
use intake_wizard::error::AppError;
use intake_wizard::requirements::{decode, Requirements};
use intake_wizard::timeline::import::entries_from_path;
use intake_wizard::timeline::{validate_coverage, CoverageReport, TimelineEntry};
use intake_wizard::wizard::{compute_available_steps, StepKind};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct DecodeArgs {
    /// Requirements key, for example en-EPA-DTB-R3-EN2-E-P-W
    pub(crate) key: String,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["json", "csv"])))]
pub(crate) struct TimelineArgs {
    /// Years of continuous history required (0 only checks dates)
    #[arg(long)]
    pub(crate) required_years: u32,
    /// Evaluation date (YYYY-MM-DD). Defaults to INTAKE_REFERENCE_DATE or today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// JSON file holding an array of timeline entries
    #[arg(long)]
    pub(crate) json: Option<PathBuf>,
    /// CSV export with start_date, end_date, and is_current columns
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    canonical_key: String,
    requirements: &'a Requirements,
    available_steps: Vec<StepKind>,
}

#[derive(Debug, Serialize)]
struct TimelineOutput {
    today: NaiveDate,
    required_years: u32,
    entries: usize,
    covered: bool,
    #[serde(flatten)]
    report: CoverageReport,
}

pub(crate) fn run_decode(args: DecodeArgs) -> Result<(), AppError> {
    let requirements = decode(&args.key)?;
    let output = DecodeOutput {
        canonical_key: requirements.encode(),
        requirements: &requirements,
        available_steps: compute_available_steps(&requirements),
    };
    print_json(&output)
}

pub(crate) fn run_timeline(args: TimelineArgs, config: &AppConfig) -> Result<(), AppError> {
    let TimelineArgs {
        required_years,
        today,
        json,
        csv,
    } = args;
    let today = wizard_config(config, today).today();

    let entries = match (json, csv) {
        (Some(path), _) => read_json_entries(path)?,
        (None, Some(path)) => entries_from_path(path)?,
        (None, None) => Vec::new(),
    };

    let report = validate_coverage(&entries, required_years, today);
    info!(
        entries = entries.len(),
        required_years,
        covered = report.is_covered(),
        "timeline checked"
    );

    print_json(&TimelineOutput {
        today,
        required_years,
        entries: entries.len(),
        covered: report.is_covered(),
        report,
    })
}

fn read_json_entries(path: PathBuf) -> Result<Vec<TimelineEntry>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
