use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use testfold_core::ReportFormat;

#[derive(Parser)]
#[command(
    name = "testfold",
    version,
    about = "Fold Gallio and NUnit 2 test reports into per-source-file test results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse one or more reports and print their per-source results
    Parse(ParseArgs),
    /// Print the format a report is recognised as
    Detect(DetectArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Report files to parse
    #[arg(required = true, value_name = "REPORT")]
    pub reports: Vec<PathBuf>,

    /// Parse with one format instead of detecting it
    #[arg(long, value_enum, default_value_t = FormatChoice::Auto)]
    pub format: FormatChoice,

    /// Parser configuration (YAML)
    #[arg(long, env = "TESTFOLD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of summary lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    #[arg(long, env = "TESTFOLD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatChoice {
    Auto,
    Gallio,
    Nunit2,
}

impl FormatChoice {
    pub fn forced(self) -> Option<ReportFormat> {
        match self {
            FormatChoice::Auto => None,
            FormatChoice::Gallio => Some(ReportFormat::Gallio),
            FormatChoice::Nunit2 => Some(ReportFormat::Nunit2),
        }
    }
}
