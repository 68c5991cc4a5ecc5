use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::formats::ReportFormat;

/// Parser settings. Every field has a default, so an empty YAML document is a
/// valid configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Strategies in priority order. The first compatible one parses the report.
    pub formats: Vec<ReportFormat>,

    /// Suite-name suffixes (case-insensitive) that declare an assembly in
    /// nested-suite reports.
    pub assembly_extensions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            formats: ReportFormat::ALL.to_vec(),
            assembly_extensions: vec![".dll".to_string()],
        }
    }
}

impl ParserConfig {
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: ParserConfig =
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Invalid {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        Ok(())
    }

    /// Whether a suite name declares an assembly file.
    pub fn is_assembly_name(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.assembly_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
    }
}
