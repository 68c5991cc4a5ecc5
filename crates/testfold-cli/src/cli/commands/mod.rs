use anyhow::Context;

use testfold_core::{ParserConfig, ReportParser};

use super::args::{Cli, Command};

pub mod detect;
pub mod parse;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Parse(args) => parse::run(args),
        Command::Detect(args) => detect::run(args),
    }
}

/// Parser for an optional config file; defaults apply when none is given.
fn build_parser(config: Option<&std::path::Path>) -> anyhow::Result<ReportParser> {
    let config = match config {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading parser config");
            ParserConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => ParserConfig::default(),
    };
    Ok(ReportParser::new(config))
}
