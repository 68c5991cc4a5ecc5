//! Console and JSON rendering of parsed reports.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use testfold_core::{ParseResult, ReportTotals, TestStatus, UnitTestReport};

pub struct FileOutcome {
    pub path: PathBuf,
    pub result: ParseResult<Vec<UnitTestReport>>,
}

#[derive(Serialize)]
struct FileView<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    reports: Vec<ReportView<'a>>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    #[serde(flatten)]
    report: &'a UnitTestReport,
    totals: ReportTotals,
}

/// One header line per file, then one summary line per source key. Failed
/// cases are listed under their report with the first line of the message.
pub fn console(out: &mut impl Write, outcomes: &[FileOutcome]) -> std::io::Result<()> {
    for outcome in outcomes {
        let reports = match &outcome.result {
            Ok(reports) => reports,
            Err(err) => {
                writeln!(out, "{}: error: {err}", outcome.path.display())?;
                continue;
            }
        };
        writeln!(
            out,
            "{}: {} source(s)",
            outcome.path.display(),
            reports.len()
        )?;
        for report in reports {
            let t = report.summary();
            writeln!(
                out,
                "  {} tests={} pass={} fail={} error={} skip={} inconclusive={} asserts={} time={}ms",
                report.source_key(),
                t.tests,
                t.successes,
                t.failures,
                t.errors,
                t.skipped,
                t.inconclusive,
                t.asserts,
                t.time_ms
            )?;
            for detail in report
                .details()
                .iter()
                .filter(|d| matches!(d.status, TestStatus::Failed | TestStatus::Error))
            {
                let message = detail
                    .error_message
                    .as_deref()
                    .and_then(|m| m.lines().next())
                    .unwrap_or_default();
                writeln!(out, "    {} {}: {}", detail.status, detail.name, message)?;
            }
        }
    }
    Ok(())
}

pub fn json(out: &mut impl Write, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let views: Vec<FileView<'_>> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(reports) => FileView {
                file: outcome.path.display().to_string(),
                error: None,
                reports: reports
                    .iter()
                    .map(|report| ReportView {
                        report,
                        totals: report.summary(),
                    })
                    .collect(),
            },
            Err(err) => FileView {
                file: outcome.path.display().to_string(),
                error: Some(err.to_string()),
                reports: Vec::new(),
            },
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use testfold_core::{ParseError, TestCaseDetail};

    fn sample() -> Vec<FileOutcome> {
        let mut report =
            UnitTestReport::new("Foo.Bar").with_assembly_name(Some("tests.dll".into()));
        report.add_detail(TestCaseDetail {
            time_ms: 10,
            asserts: 2,
            ..TestCaseDetail::new("Foo.Bar.Test1", TestStatus::Success)
        });
        report.add_detail(TestCaseDetail {
            error_message: Some("Expected: 1\nBut was: 2".into()),
            ..TestCaseDetail::new("Foo.Bar.Test2", TestStatus::Failed)
        });
        vec![
            FileOutcome {
                path: PathBuf::from("TestResult.xml"),
                result: Ok(vec![report]),
            },
            FileOutcome {
                path: PathBuf::from("broken.xml"),
                result: Err(ParseError::MalformedField {
                    element: "test-case".into(),
                    attribute: "time".into(),
                    value: "x".into(),
                }),
            },
        ]
    }

    #[test]
    fn console_prints_totals_and_failures() {
        let mut buf = Vec::new();
        console(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("TestResult.xml: 1 source(s)"));
        assert!(text.contains(
            "  Foo.Bar tests=2 pass=1 fail=1 error=0 skip=0 inconclusive=0 asserts=2 time=10ms"
        ));
        assert!(text.contains("    failed Foo.Bar.Test2: Expected: 1\n"));
        assert!(text.contains("broken.xml: error: invalid value 'x'"));
    }

    #[test]
    fn json_includes_totals_and_errors() {
        let mut buf = Vec::new();
        json(&mut buf, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let files = value.as_array().unwrap();
        assert_eq!(files.len(), 2);

        let report = &files[0]["reports"][0];
        assert_eq!(report["source_key"], "Foo.Bar");
        assert_eq!(report["assembly_name"], "tests.dll");
        assert_eq!(report["totals"]["tests"], 2);
        assert_eq!(report["details"][1]["status"], "failed");

        assert!(files[1]["error"].as_str().unwrap().contains("time"));
        assert!(files[1]["reports"].as_array().unwrap().is_empty());
    }
}
