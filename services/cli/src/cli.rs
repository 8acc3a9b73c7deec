use crate::demo::{run_demo, DemoArgs};
use crate::inspect::{run_decode, run_timeline, DecodeArgs, TimelineArgs};
use clap::{Parser, Subcommand};
use intake_wizard::config::AppConfig;
use intake_wizard::error::AppError;
use intake_wizard::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Intake Wizard",
    about = "Decode requirements keys, check history timelines, and walk the intake wizard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a requirements key and list the steps it enables
    Decode(DecodeArgs),
    /// Check a residence or employment timeline for continuous coverage
    Timeline(TimelineArgs),
    /// Walk a sample submission through every enabled step
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, "configuration loaded");

    match cli.command {
        Command::Decode(args) => run_decode(args),
        Command::Timeline(args) => run_timeline(args, &config),
        Command::Demo(args) => run_demo(args, &config),
    }
}
