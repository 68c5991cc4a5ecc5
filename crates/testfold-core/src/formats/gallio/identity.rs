//! Identity pass over `testModel`.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;

use crate::errors::ParseResult;
use crate::model::TestDescription;
use crate::xml::{Element, XmlCursor};

const TAG_TEST: &str = "test";
const TAG_CHILDREN: &str = "children";
const TAG_PARAMETERS: &str = "parameters";
const TAG_CODE_REFERENCE: &str = "codeReference";
const TAG_CODE_LOCATION: &str = "codeLocation";

/// Defaults inherited from the enclosing tests. Each subtree receives its own
/// copy, so a sibling never sees what another sibling declared.
#[derive(Debug, Clone, Default)]
struct Scope {
    assembly_name: Option<String>,
    source_file: Option<PathBuf>,
}

pub(super) fn read_test_model<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    model: &Element,
    descriptions: &mut HashMap<String, TestDescription>,
) -> ParseResult<()> {
    read_tests(cursor, model, &Scope::default(), descriptions)?;
    tracing::debug!(count = descriptions.len(), "test model read");
    Ok(())
}

/// Visit every `test` directly under `container` (`testModel` or `children`).
fn read_tests<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    container: &Element,
    scope: &Scope,
    descriptions: &mut HashMap<String, TestDescription>,
) -> ParseResult<()> {
    if container.is_empty() {
        return Ok(());
    }
    while let Some(child) = cursor.next_child()? {
        if child.is(TAG_TEST) {
            read_test(cursor, &child, scope, descriptions)?;
        } else {
            cursor.skip(&child)?;
        }
    }
    Ok(())
}

fn read_test<R: BufRead>(
    cursor: &mut XmlCursor<R>,
    test: &Element,
    inherited: &Scope,
    descriptions: &mut HashMap<String, TestDescription>,
) -> ParseResult<()> {
    let id = test.attr_non_empty("id").map(str::to_string);
    let is_test_case = test.flag("isTestCase");
    let mut scope = inherited.clone();
    let mut description = TestDescription {
        id: id.clone().unwrap_or_default(),
        method_name: test.attr_non_empty("name").map(str::to_string),
        ..TestDescription::default()
    };

    if !test.is_empty() {
        let mut past_parameters = false;
        while let Some(child) = cursor.next_child()? {
            if past_parameters {
                cursor.skip(&child)?;
                continue;
            }
            match child.name() {
                TAG_CODE_REFERENCE => {
                    if let Some(assembly) = child.attr_non_empty("assembly") {
                        scope.assembly_name = Some(assembly_label(assembly));
                    }
                    if is_test_case {
                        read_code_reference(&child, &mut description);
                    }
                    cursor.skip(&child)?;
                }
                TAG_CODE_LOCATION => {
                    if let Some(path) = child.attr_non_empty("path") {
                        scope.source_file = Some(PathBuf::from(path));
                    }
                    let line = child.number::<u32>("line")?;
                    if is_test_case {
                        description.line = line;
                    }
                    cursor.skip(&child)?;
                }
                TAG_CHILDREN => read_tests(cursor, &child, &scope, descriptions)?,
                TAG_PARAMETERS => {
                    past_parameters = true;
                    cursor.skip(&child)?;
                }
                _ => cursor.skip(&child)?,
            }
        }
    }

    if !is_test_case {
        return Ok(());
    }
    let Some(id) = id else {
        tracing::debug!(name = ?description.method_name, "test case without id, ignoring");
        return Ok(());
    };
    description.assembly_name = scope.assembly_name;
    description.source_file = scope.source_file;
    tracing::debug!(test_id = %id, source_file = ?description.source_file, "test case identified");
    if descriptions.insert(id.clone(), description).is_some() {
        tracing::debug!(test_id = %id, "duplicate test id in test model, keeping the last one");
    }
    Ok(())
}

fn read_code_reference(reference: &Element, description: &mut TestDescription) {
    if let Some(namespace) = reference.attr_non_empty("namespace") {
        description.namespace = Some(namespace.to_string());
    }
    if let Some(class_name) = reference.attr_non_empty("type") {
        description.class_name = Some(class_name.to_string());
    }
    if let Some(member) = reference.attr_non_empty("member") {
        description.method_name = Some(member.to_string());
    }
}

/// `Calc.Tests, Version=1.0.0.0, Culture=neutral` names the assembly `Calc.Tests`.
fn assembly_label(qualified: &str) -> String {
    qualified
        .split(',')
        .next()
        .unwrap_or(qualified)
        .trim()
        .to_string()
}
