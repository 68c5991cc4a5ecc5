//! Execution pass over `testPackageRun`.

use std::io::BufRead;

use crate::aggregate::DetailsById;
use crate::errors::ParseResult;
use crate::model::TestCaseDetail;
use crate::status::TestStatus;
use crate::xml::{seconds_to_millis, Element, XmlCursor};

const TAG_TEST_STEP_RUN: &str = "testStepRun";
const TAG_TEST_STEP: &str = "testStep";
const TAG_CHILDREN: &str = "children";
const TAG_RESULT: &str = "result";
const TAG_OUTCOME: &str = "outcome";
const TAG_TEST_LOG: &str = "testLog";
const TAG_TEXT: &str = "text";
const TAG_MARKER: &str = "marker";
const STACK_TRACE_CLASS: &str = "StackTrace";

pub(super) fn read_package_run<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    run: &Element,
    details: &mut DetailsById,
) -> ParseResult<()> {
    read_step_runs(cursor, run, None, details)?;
    tracing::debug!(count = details.len(), "test package run read");
    Ok(())
}

/// Visit every `testStepRun` directly under `container` (`testPackageRun` or `children`).
fn read_step_runs<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    container: &Element,
    inherited_id: Option<&str>,
    details: &mut DetailsById,
) -> ParseResult<()> {
    if container.is_empty() {
        return Ok(());
    }
    while let Some(child) = cursor.next_child()? {
        if child.is(TAG_TEST_STEP_RUN) {
            read_step_run(cursor, &child, inherited_id, details)?;
        } else {
            cursor.skip(&child)?;
        }
    }
    Ok(())
}

fn read_step_run<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    step_run: &Element,
    inherited_id: Option<&str>,
    details: &mut DetailsById,
) -> ParseResult<()> {
    if step_run.is_empty() {
        return Ok(());
    }
    let mut test_id = inherited_id.map(str::to_string);
    let mut is_test_case = false;
    let mut detail: Option<TestCaseDetail> = None;

    while let Some(child) = cursor.next_child()? {
        match child.name() {
            TAG_TEST_STEP => {
                is_test_case = child.flag("isTestCase");
                if let Some(id) = child.attr_non_empty("testId") {
                    test_id = Some(id.to_string());
                }
                cursor.skip(&child)?;
            }
            TAG_CHILDREN => read_step_runs(cursor, &child, test_id.as_deref(), details)?,
            TAG_RESULT => {
                // Results are validated even where they are not recorded.
                let parsed = read_result(cursor, &child)?;
                if is_test_case && test_id.is_some() {
                    detail = Some(parsed);
                }
            }
            TAG_TEST_LOG => match detail.as_mut() {
                Some(detail) if detail.status.is_failure() => {
                    read_messages(cursor, &child, detail)?
                }
                _ => cursor.skip(&child)?,
            },
            _ => cursor.skip(&child)?,
        }
    }

    if let (Some(test_id), Some(detail)) = (test_id, detail) {
        tracing::debug!(test_id = %test_id, status = %detail.status, "test step result");
        details.insert(test_id, detail);
    }
    Ok(())
}

fn read_result<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    result: &Element,
) -> ParseResult<TestCaseDetail> {
    let asserts = result.count("assertCount")?;
    let time_ms = result
        .real("duration")?
        .map(seconds_to_millis)
        .unwrap_or_default();

    let mut status = TestStatus::Inconclusive;
    if !result.is_empty() {
        while let Some(child) = cursor.next_child()? {
            if child.is(TAG_OUTCOME) {
                status = TestStatus::from_outcome(
                    child.attr("status").unwrap_or_default(),
                    child.attr("category"),
                );
            }
            cursor.skip(&child)?;
        }
    }

    Ok(TestCaseDetail {
        time_ms,
        asserts,
        ..TestCaseDetail::new(String::new(), status)
    })
}

/// Scan a test log for the failure message and stack trace. Plain `text`
/// nodes set the message and `StackTrace` markers set the stack trace; when
/// either repeats, the last one wins. Other markers are not descended.
fn read_messages<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    node: &Element,
    detail: &mut TestCaseDetail,
) -> ParseResult<()> {
    if node.is_empty() {
        return Ok(());
    }
    while let Some(child) = cursor.next_child()? {
        match child.name() {
            TAG_TEXT => detail.error_message = Some(cursor.text(&child)?),
            TAG_MARKER if child.attr("class") == Some(STACK_TRACE_CLASS) => {
                detail.stack_trace = Some(cursor.text(&child)?);
            }
            TAG_MARKER => cursor.skip(&child)?,
            _ => read_messages(cursor, &child, detail)?,
        }
    }
    Ok(())
}
