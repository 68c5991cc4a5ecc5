//! Supported report formats.
//!
//! Each variant answers two questions: does a document look like this format
//! (a cheap look at the elements near the root), and what reports does it
//! contain (the full parse). Adding a format means adding a variant here.

pub mod gallio;
pub mod nunit2;

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::errors::ParseResult;
use crate::model::UnitTestReport;
use crate::source::ReportSource;
use crate::xml::XmlCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Gallio test report: a test model and a test package run joined by test id.
    Gallio,
    /// NUnit 2.x `TestResult.xml`: nested suites with flat test cases.
    Nunit2,
}

impl ReportFormat {
    /// Default priority order.
    pub const ALL: [ReportFormat; 2] = [ReportFormat::Gallio, ReportFormat::Nunit2];

    pub fn name(self) -> &'static str {
        match self {
            ReportFormat::Gallio => "gallio",
            ReportFormat::Nunit2 => "nunit2",
        }
    }

    /// Look for this format's structural signature. A document that cannot be
    /// read or is not well-formed near its root is not compatible.
    pub fn is_compatible(self, source: &ReportSource<'_>) -> bool {
        let signature = source.open().and_then(|input| {
            let mut cursor = XmlCursor::new(input);
            match self {
                ReportFormat::Gallio => gallio::looks_like(&mut cursor),
                ReportFormat::Nunit2 => nunit2::looks_like(&mut cursor),
            }
        });
        match signature {
            Ok(compatible) => compatible,
            Err(err) => {
                tracing::debug!(format = self.name(), error = %err, "format check failed");
                false
            }
        }
    }

    pub fn parse(
        self,
        source: &ReportSource<'_>,
        config: &ParserConfig,
    ) -> ParseResult<Vec<UnitTestReport>> {
        let input = source.open()?;
        let mut cursor = XmlCursor::new(input);
        let parsed = match self {
            ReportFormat::Gallio => gallio::parse(&mut cursor),
            ReportFormat::Nunit2 => nunit2::parse(&mut cursor, config),
        };
        parsed.map_err(|err| err.at(&source.location()))
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportFormat::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown report format '{s}' (expected gallio or nunit2)"))
    }
}
