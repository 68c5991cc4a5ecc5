//! Strategy selection: check each format in priority order and let the first
//! compatible one parse the report.

use crate::config::ParserConfig;
use crate::errors::{ParseError, ParseResult};
use crate::formats::ReportFormat;
use crate::model::UnitTestReport;
use crate::source::ReportSource;

#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    config: ParserConfig,
    forced: Option<ReportFormat>,
}

impl ReportParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            forced: None,
        }
    }

    /// Parse with `format` only; a report without its signature is a
    /// [`ParseError::FormatMismatch`] instead of an empty result.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.forced = Some(format);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// First format whose signature the report carries.
    pub fn detect(&self, source: &ReportSource<'_>) -> Option<ReportFormat> {
        self.config
            .formats
            .iter()
            .copied()
            .find(|format| format.is_compatible(source))
    }

    /// Parse a report into one [`UnitTestReport`] per source key, sorted by key.
    ///
    /// Reports no format recognises yield an empty set. A document that turns
    /// out to be malformed during a parse lets the next compatible format try;
    /// any other error (an unreadable source, a malformed numeric field) is
    /// returned and no partial set is produced.
    pub fn parse(&self, source: &ReportSource<'_>) -> ParseResult<Vec<UnitTestReport>> {
        if let Some(format) = self.forced {
            if !format.is_compatible(source) {
                return Err(ParseError::FormatMismatch {
                    format: format.name(),
                });
            }
            return format.parse(source, &self.config);
        }

        // Surface unreadable sources before probing swallows the error.
        drop(source.open()?);

        for format in &self.config.formats {
            if !format.is_compatible(source) {
                tracing::trace!(format = format.name(), "report not compatible");
                continue;
            }
            match format.parse(source, &self.config) {
                Ok(reports) => {
                    tracing::debug!(
                        format = format.name(),
                        reports = reports.len(),
                        location = %source.location().display(),
                        "report parsed"
                    );
                    return Ok(reports);
                }
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(
                        format = format.name(),
                        error = %err,
                        "report cannot be parsed by this format, trying the next one"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(
            location = %source.location().display(),
            "no report format matched, returning no reports"
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_documents_yield_no_reports() {
        let parser = ReportParser::default();
        let reports = parser
            .parse(&ReportSource::from("<coverage><packages/></coverage>"))
            .unwrap();
        assert!(reports.is_empty());

        let reports = parser.parse(&ReportSource::from("<<not xml")).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn forced_format_reports_mismatch() {
        let parser = ReportParser::default().with_format(ReportFormat::Gallio);
        let err = parser
            .parse(&ReportSource::from(
                r#"<test-results><environment nunit-version="2.6"/></test-results>"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ParseError::FormatMismatch { format: "gallio" }));
    }

    #[test]
    fn detect_follows_configured_priority() {
        let both = r#"<report xmlns="http://www.gallio.org/"><environment nunit-version="2.6"/></report>"#;
        let source = ReportSource::from(both);
        assert_eq!(
            ReportParser::default().detect(&source),
            Some(ReportFormat::Gallio)
        );

        let config = ParserConfig {
            formats: vec![ReportFormat::Nunit2, ReportFormat::Gallio],
            ..ParserConfig::default()
        };
        assert_eq!(
            ReportParser::new(config).detect(&source),
            Some(ReportFormat::Nunit2)
        );
    }

    #[test]
    fn malformed_match_falls_through_to_next_format() {
        // Looks like gallio, then breaks after the first section.
        let xml = r#"<report><testModel/><environment nunit-version="2.6"/><broken></report>"#;
        let reports = ReportParser::default()
            .parse(&ReportSource::from(xml))
            .unwrap();
        assert!(reports.is_empty());
    }
}
