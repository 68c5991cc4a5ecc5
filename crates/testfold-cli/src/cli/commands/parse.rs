use std::io::Write;

use testfold_core::ReportSource;

use crate::cli::args::ParseArgs;
use crate::cli::render::{self, FileOutcome};
use crate::exit_codes::{PARSE_FAILED, SUCCESS};

pub fn run(args: ParseArgs) -> anyhow::Result<i32> {
    let mut parser = super::build_parser(args.config.as_deref())?;
    if let Some(format) = args.format.forced() {
        parser = parser.with_format(format);
    }

    let mut outcomes = Vec::with_capacity(args.reports.len());
    for path in &args.reports {
        let result = parser.parse(&ReportSource::Path(path));
        match &result {
            Ok(reports) => tracing::info!(
                report = %path.display(),
                sources = reports.len(),
                "parsed"
            ),
            Err(err) => tracing::error!(report = %path.display(), error = %err, "parse failed"),
        }
        outcomes.push(FileOutcome {
            path: path.clone(),
            result,
        });
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        render::json(&mut out, &outcomes)?;
    } else {
        render::console(&mut out, &outcomes)?;
    }
    out.flush()?;

    if outcomes.iter().any(|o| o.result.is_err()) {
        Ok(PARSE_FAILED)
    } else {
        Ok(SUCCESS)
    }
}
