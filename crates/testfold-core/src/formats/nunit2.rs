//! NUnit 2 `TestResult.xml` parser.
//!
//! Suites nest arbitrarily; cases carry their outcome inline. Cases are grouped
//! into reports by fixture, the dotted prefix of the case name.

use std::io::BufRead;

use crate::aggregate;
use crate::config::ParserConfig;
use crate::errors::ParseResult;
use crate::model::{TestCaseDetail, UnitTestReport};
use crate::status::TestStatus;
use crate::xml::{seconds_to_millis, Element, XmlCursor};

const TAG_ENVIRONMENT: &str = "environment";
const TAG_TEST_SUITE: &str = "test-suite";
const TAG_RESULTS: &str = "results";
const TAG_TEST_CASE: &str = "test-case";
const TAG_FAILURE: &str = "failure";
const TAG_REASON: &str = "reason";
const TAG_MESSAGE: &str = "message";
const TAG_STACK_TRACE: &str = "stack-trace";
const ATTR_NUNIT_VERSION: &str = "nunit-version";

/// Defaults inherited from enclosing suites.
#[derive(Debug, Clone, Copy, Default)]
struct Scope<'a> {
    assembly_name: Option<&'a str>,
    suite_name: Option<&'a str>,
}

/// An NUnit 2 document has an `environment` element directly under the root
/// carrying the `nunit-version` attribute.
pub(crate) fn looks_like<R: BufRead>(cursor: &mut XmlCursor<R>) -> ParseResult<bool> {
    let root = cursor.root()?;
    if root.is_empty() {
        return Ok(false);
    }
    while let Some(child) = cursor.next_child()? {
        if child.is(TAG_ENVIRONMENT) && child.attr(ATTR_NUNIT_VERSION).is_some() {
            return Ok(true);
        }
        cursor.skip(&child)?;
    }
    Ok(false)
}

pub(crate) fn parse<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    config: &ParserConfig,
) -> ParseResult<Vec<UnitTestReport>> {
    let root = cursor.root()?;
    tracing::debug!(root = root.name(), "parsing nunit2 report");

    let mut cases = Vec::new();
    let scope = Scope {
        assembly_name: root
            .attr("name")
            .filter(|name| config.is_assembly_name(name)),
        suite_name: None,
    };
    read_children(cursor, &root, scope, config, &mut cases)?;

    tracing::debug!(cases = cases.len(), "nunit2 report read");
    // Every case carries its fixture as the class name.
    Ok(aggregate::fold_by_key(cases, |case| case.class_name.clone().unwrap_or_default()))
}

fn read_children<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    parent: &Element,
    scope: Scope<'_>,
    config: &ParserConfig,
    cases: &mut Vec<TestCaseDetail>,
) -> ParseResult<()> {
    if parent.is_empty() {
        return Ok(());
    }
    while let Some(child) = cursor.next_child()? {
        match child.name() {
            TAG_TEST_SUITE | TAG_RESULTS => {
                let name = child.attr_non_empty("name");
                let mut nested = scope;
                if child.is(TAG_TEST_SUITE) {
                    nested.suite_name = name.or(scope.suite_name);
                }
                if let Some(name) = name.filter(|name| config.is_assembly_name(name)) {
                    nested.assembly_name = Some(name);
                }
                read_children(cursor, &child, nested, config, cases)?;
            }
            TAG_TEST_CASE => {
                if let Some(case) = read_case(cursor, &child, scope)? {
                    cases.push(case);
                }
            }
            _ => cursor.skip(&child)?,
        }
    }
    Ok(())
}

fn read_case<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    case: &Element,
    scope: Scope<'_>,
) -> ParseResult<Option<TestCaseDetail>> {
    let Some(name) = case.attr_non_empty("name") else {
        tracing::debug!("test case without a name, ignoring");
        cursor.skip(case)?;
        return Ok(None);
    };

    let status = TestStatus::from_execution(case.flag("executed"), case.flag("success"));
    let mut detail = TestCaseDetail {
        time_ms: case.real("time")?.map(seconds_to_millis).unwrap_or_default(),
        asserts: case.count("asserts")?,
        assembly_name: scope.assembly_name.map(str::to_string),
        ..TestCaseDetail::new(name, status)
    };
    read_case_messages(cursor, case, &mut detail)?;

    let fixture = fixture_name(name)
        .or(scope.suite_name)
        .unwrap_or(name)
        .to_string();
    detail.class_name = Some(fixture.clone());
    tracing::debug!(fixture = %fixture, case = name, status = %detail.status, "test case");
    Ok(Some(detail))
}

/// `failure/message`, `failure/stack-trace` and `reason/message` children.
fn read_case_messages<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    case: &Element,
    detail: &mut TestCaseDetail,
) -> ParseResult<()> {
    if case.is_empty() {
        return Ok(());
    }
    while let Some(child) = cursor.next_child()? {
        if !(child.is(TAG_FAILURE) || child.is(TAG_REASON)) || child.is_empty() {
            cursor.skip(&child)?;
            continue;
        }
        while let Some(part) = cursor.next_child()? {
            let slot = match part.name() {
                TAG_MESSAGE => &mut detail.error_message,
                TAG_STACK_TRACE => &mut detail.stack_trace,
                _ => {
                    cursor.skip(&part)?;
                    continue;
                }
            };
            let text = cursor.text(&part)?;
            if !text.is_empty() {
                *slot = Some(text);
            }
        }
    }
    Ok(())
}

/// Everything before the last `.` outside a parameter list, or `None` when
/// the case name has no separator.
fn fixture_name(case_name: &str) -> Option<&str> {
    let head_end = case_name.find('(').unwrap_or(case_name.len());
    let (prefix, _) = case_name[..head_end].rsplit_once('.')?;
    (!prefix.is_empty()).then_some(prefix)
}
