//! Driver configuration files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How diagnostics are rendered in a [`Report`](crate::Report)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    /// `line:column ***ERROR*** message`, one per line
    #[default]
    Plain,
    /// Source snippets with labels; needs the source text
    Rich,
}

/// Driver settings, usually read from a `wumbo.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Print bound symbols next to identifiers when unparsing
    #[serde(default = "default_annotate")]
    pub annotate: bool,

    /// Diagnostic rendering
    #[serde(default)]
    pub format: DiagnosticFormat,

    /// File name shown in rich diagnostics
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_annotate() -> bool {
    true
}

fn default_file_name() -> String {
    "<input>".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            annotate: default_annotate(),
            format: DiagnosticFormat::default(),
            file_name: default_file_name(),
        }
    }
}

impl DriverConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse driver configuration")
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DriverConfig::from_toml_str("").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert!(config.annotate);
        assert_eq!(config.format, DiagnosticFormat::Plain);
        assert_eq!(config.file_name, "<input>");
    }

    #[test]
    fn test_full_config() {
        let config = DriverConfig::from_toml_str(
            r#"
annotate = false
format = "rich"
file_name = "test.wb"
"#,
        )
        .unwrap();

        assert!(!config.annotate);
        assert_eq!(config.format, DiagnosticFormat::Rich);
        assert_eq!(config.file_name, "test.wb");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let error = DriverConfig::from_toml_str("colour = true").unwrap_err();
        assert!(format!("{error:#}").contains("colour"), "{error:#}");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "format = \"plain\"\nannotate = false").unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert!(!config.annotate);
        assert_eq!(config.format, DiagnosticFormat::Plain);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let error = DriverConfig::load(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to read config file"));
    }
}
