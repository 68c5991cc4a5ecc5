//! Unified report model shared by every report format.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::status::TestStatus;

/// Static identity of a test, built from the identity section of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestDescription {
    pub id: String,
    pub namespace: Option<String>,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub assembly_name: Option<String>,
    pub source_file: Option<PathBuf>,
    pub line: Option<u32>,
}

/// One execution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseDetail {
    pub name: String,
    pub status: TestStatus,
    pub time_ms: u64,
    pub asserts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl TestCaseDetail {
    pub fn new(name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            status,
            time_ms: 0,
            asserts: 0,
            error_message: None,
            stack_trace: None,
            namespace: None,
            class_name: None,
            method_name: None,
            assembly_name: None,
            source_file: None,
            line: None,
        }
    }

    /// Fill identity fields this detail does not know yet from its description.
    /// Values already present on the detail are kept.
    pub fn merge(&mut self, description: &TestDescription) {
        fill(&mut self.namespace, &description.namespace);
        fill(&mut self.class_name, &description.class_name);
        fill(&mut self.method_name, &description.method_name);
        fill(&mut self.assembly_name, &description.assembly_name);
        fill(&mut self.source_file, &description.source_file);
        fill(&mut self.line, &description.line);
        if self.name.is_empty() {
            if let Some(method) = &self.method_name {
                self.name = method.clone();
            }
        }
    }

    /// Fixture name from the namespace and class, when either is known.
    pub fn fixture_name(&self) -> Option<String> {
        match (self.namespace.as_deref(), self.class_name.as_deref()) {
            (Some(ns), Some(class)) if class.starts_with(&format!("{ns}.")) => {
                Some(class.to_string())
            }
            (Some(ns), Some(class)) if !ns.is_empty() => Some(format!("{ns}.{class}")),
            (_, Some(class)) => Some(class.to_string()),
            (Some(ns), None) => Some(ns.to_string()),
            (None, None) => None,
        }
    }

    /// Source key for identity-resolved details: file path, then fixture, then assembly.
    pub fn source_key(&self) -> String {
        if let Some(path) = &self.source_file {
            return path.display().to_string();
        }
        self.fixture_name()
            .or_else(|| self.assembly_name.clone())
            .unwrap_or_default()
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, fallback: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(fallback);
    }
}

/// Totals folded from a report's details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub tests: usize,
    pub successes: usize,
    pub failures: usize,
    pub errors: usize,
    pub skipped: usize,
    pub inconclusive: usize,
    pub asserts: u64,
    pub time_ms: u64,
}

/// Test results for one source key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTestReport {
    source_key: String,
    assembly_name: Option<String>,
    source_file: Option<PathBuf>,
    details: Vec<TestCaseDetail>,
}

impl UnitTestReport {
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            assembly_name: None,
            source_file: None,
            details: Vec::new(),
        }
    }

    pub fn with_assembly_name(mut self, assembly_name: Option<String>) -> Self {
        self.assembly_name = assembly_name;
        self
    }

    pub fn with_source_file(mut self, source_file: Option<PathBuf>) -> Self {
        self.source_file = source_file;
        self
    }

    pub fn add_detail(&mut self, detail: TestCaseDetail) {
        self.details.push(detail);
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn assembly_name(&self) -> Option<&str> {
        self.assembly_name.as_deref()
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    pub fn details(&self) -> &[TestCaseDetail] {
        &self.details
    }

    pub fn tests(&self) -> usize {
        self.details.len()
    }

    pub fn successes(&self) -> usize {
        self.count(TestStatus::Success)
    }

    pub fn failures(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    pub fn errors(&self) -> usize {
        self.count(TestStatus::Error)
    }

    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    pub fn inconclusive(&self) -> usize {
        self.count(TestStatus::Inconclusive)
    }

    pub fn asserts(&self) -> u64 {
        self.details
            .iter()
            .fold(0u64, |total, d| total.saturating_add(d.asserts))
    }

    pub fn time_ms(&self) -> u64 {
        self.details
            .iter()
            .fold(0u64, |total, d| total.saturating_add(d.time_ms))
    }

    /// All totals in a single pass over the details. Sums saturate at
    /// `u64::MAX`.
    pub fn summary(&self) -> ReportTotals {
        self.details
            .iter()
            .fold(ReportTotals::default(), |mut totals, detail| {
                totals.tests += 1;
                totals.asserts = totals.asserts.saturating_add(detail.asserts);
                totals.time_ms = totals.time_ms.saturating_add(detail.time_ms);
                match detail.status {
                    TestStatus::Success => totals.successes += 1,
                    TestStatus::Failed => totals.failures += 1,
                    TestStatus::Error => totals.errors += 1,
                    TestStatus::Skipped => totals.skipped += 1,
                    TestStatus::Inconclusive => totals.inconclusive += 1,
                }
                totals
            })
    }

    fn count(&self, status: TestStatus) -> usize {
        self.details.iter().filter(|d| d.status == status).count()
    }
}
