//! Gallio report parser.
//!
//! A Gallio report keeps static test identity (`testModel`) apart from
//! execution results (`testPackageRun`). Both sections are collected into
//! id-keyed maps during a single forward read of the stream and joined once
//! the document has been fully consumed; the sections are not guaranteed to
//! line up positionally, so nothing is merged mid-walk.

mod execution;
mod identity;

use std::collections::HashMap;
use std::io::BufRead;

use crate::aggregate::{self, DetailsById};
use crate::errors::ParseResult;
use crate::model::{TestDescription, UnitTestReport};
use crate::xml::XmlCursor;

pub const GALLIO_NAMESPACE: &str = "http://www.gallio.org/";

const TAG_REPORT: &str = "report";
const TAG_TEST_MODEL: &str = "testModel";
const TAG_TEST_PACKAGE_RUN: &str = "testPackageRun";

/// A Gallio document is a `report` root in the Gallio namespace, or one whose
/// direct children include the test model or the package run.
pub(crate) fn looks_like<R: BufRead>(cursor: &mut XmlCursor<R>) -> ParseResult<bool> {
    let root = cursor.root()?;
    if !root.is(TAG_REPORT) {
        return Ok(false);
    }
    if root.attr("xmlns") == Some(GALLIO_NAMESPACE) {
        return Ok(true);
    }
    if root.is_empty() {
        return Ok(false);
    }
    while let Some(child) = cursor.next_child()? {
        if child.is(TAG_TEST_MODEL) || child.is(TAG_TEST_PACKAGE_RUN) {
            return Ok(true);
        }
        cursor.skip(&child)?;
    }
    Ok(false)
}

pub(crate) fn parse<R: BufRead>(cursor: &mut XmlCursor<R>) -> ParseResult<Vec<UnitTestReport>> {
    let root = cursor.root()?;
    tracing::debug!(root = root.name(), "parsing gallio report");

    let mut descriptions: HashMap<String, TestDescription> = HashMap::new();
    let mut details = DetailsById::default();

    if !root.is_empty() {
        while let Some(section) = cursor.next_child()? {
            match section.name() {
                TAG_TEST_MODEL => identity::read_test_model(cursor, &section, &mut descriptions)?,
                TAG_TEST_PACKAGE_RUN => {
                    execution::read_package_run(cursor, &section, &mut details)?
                }
                _ => cursor.skip(&section)?,
            }
        }
    }
    // Trailing content after the root must still be well-formed.
    while let Some(trailing) = cursor.next_child()? {
        cursor.skip(&trailing)?;
    }

    tracing::debug!(
        descriptions = descriptions.len(),
        results = details.len(),
        "gallio sections read"
    );
    let resolved = aggregate::correlate(&descriptions, details);
    Ok(aggregate::fold_by_key(resolved, |detail| detail.source_key()))
}
