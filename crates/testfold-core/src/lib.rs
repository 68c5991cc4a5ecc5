pub mod aggregate;
pub mod config;
pub mod errors;
pub mod formats;
pub mod model;
pub mod parser;
pub mod source;
pub mod status;

mod xml;

// Convenience re-exports
pub use config::ParserConfig;
pub use errors::{ConfigError, ParseError, ParseResult};
pub use formats::ReportFormat;
pub use model::{ReportTotals, TestCaseDetail, TestDescription, UnitTestReport};
pub use parser::ReportParser;
pub use source::ReportSource;
pub use status::TestStatus;

/// Parse a report file with the default configuration.
pub fn parse_report(path: &std::path::Path) -> ParseResult<Vec<UnitTestReport>> {
    ReportParser::default().parse(&ReportSource::Path(path))
}
