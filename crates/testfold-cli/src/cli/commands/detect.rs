use anyhow::Context;

use testfold_core::ReportSource;

use crate::cli::args::DetectArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: DetectArgs) -> anyhow::Result<i32> {
    let parser = super::build_parser(args.config.as_deref())?;
    let source = ReportSource::Path(&args.report);
    // An unreadable file is an error, not an unrecognised format.
    drop(
        source
            .open()
            .with_context(|| format!("opening {}", args.report.display()))?,
    );

    match parser.detect(&source) {
        Some(format) => println!("{format}"),
        None => println!("none"),
    }
    Ok(SUCCESS)
}
