//! Configuration file handling

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlreview_core::rule::{builtin_rules, Rule, SeverityOverride};
use sqlreview_core::{RuleRegistry, Severity, SqlDialect};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlreview.toml";

/// Configuration for sqlreview
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// SQL dialect (postgresql or mysql)
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json, sarif)
    #[serde(default)]
    pub format: Option<String>,

    /// Query file patterns to check
    #[serde(default)]
    pub files: Vec<String>,

    /// Rules to run; empty runs every enabled rule
    #[serde(default)]
    pub rules: Vec<String>,

    /// Per-rule settings keyed by rule id
    #[serde(default)]
    pub rule: HashMap<String, RuleConfig>,
}

/// Settings of a single rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Severity override (error, warning, info)
    #[serde(default)]
    pub level: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlreview.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::info!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Load the given file, or the nearest sqlreview.toml, or defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::find_and_load()?.unwrap_or_default()),
        }
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        dialect: Option<&str>,
        format: Option<OutputFormat>,
        rules: &[String],
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if let Some(dialect) = dialect {
            self.dialect = Some(dialect.to_string());
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        if !rules.is_empty() {
            self.rules = rules.to_vec();
        }

        self
    }

    pub fn dialect(&self) -> Result<SqlDialect> {
        match &self.dialect {
            Some(name) => Ok(name.parse::<SqlDialect>()?),
            None => Ok(SqlDialect::default()),
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("sarif") => OutputFormat::Sarif,
            _ => OutputFormat::Human,
        }
    }

    /// Build the rule registry: built-in rules minus disabled ones, with
    /// severity overrides applied
    pub fn build_registry(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::new();

        for rule in builtin_rules() {
            let settings = self.rule.get(rule.id());
            if settings.is_some_and(|s| !s.enabled) {
                tracing::info!(rule = rule.id(), "rule disabled by configuration");
                continue;
            }

            let rule: Arc<dyn Rule> = match settings.and_then(|s| s.level.as_deref()) {
                Some(level) => {
                    let severity: Severity = level.parse().map_err(|e: String| miette::miette!(e))?;
                    Arc::new(SeverityOverride::new(rule, severity))
                }
                None => rule,
            };

            for dialect in SqlDialect::ALL {
                registry.register_shared(dialect, Arc::clone(&rule))?;
            }
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlreview_core::rule::TABLE_REQUIRE_PK;

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
            dialect = "mysql"
            format = "json"
            rules = ["table.require-pk"]

            [rule."table.require-pk"]
            level = "warning"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect().unwrap(), SqlDialect::MySQL);
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.rules, vec![TABLE_REQUIRE_PK]);
        assert!(config.rule[TABLE_REQUIRE_PK].enabled);
    }

    #[test]
    fn test_cli_args_take_precedence() {
        let config = Config {
            dialect: Some("mysql".to_string()),
            format: Some("json".to_string()),
            ..Default::default()
        };
        let config = config.merge_with_args(
            &[PathBuf::from("a.sql")],
            Some("pg"),
            Some(OutputFormat::Sarif),
            &[],
        );
        assert_eq!(config.dialect().unwrap(), SqlDialect::PostgreSQL);
        assert_eq!(config.output_format(), OutputFormat::Sarif);
        assert_eq!(config.files, vec!["a.sql"]);
    }

    #[test]
    fn test_unknown_dialect_is_an_error() {
        let config = Config {
            dialect: Some("oracle".to_string()),
            ..Default::default()
        };
        assert!(config.dialect().is_err());
    }

    #[test]
    fn test_registry_applies_overrides() {
        let config = Config::from_toml(
            r#"
            [rule."table.require-pk"]
            level = "info"
            "#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();
        let rule = registry.get(SqlDialect::MySQL, TABLE_REQUIRE_PK).unwrap();
        assert_eq!(rule.severity(), Severity::Info);
    }

    #[test]
    fn test_registry_skips_disabled_rules() {
        let config = Config::from_toml(
            r#"
            [rule."table.require-pk"]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(config.build_registry().unwrap().is_empty());
    }

    #[test]
    fn test_bad_level_is_an_error() {
        let config = Config::from_toml(
            r#"
            [rule."table.require-pk"]
            level = "fatal"
            "#,
        )
        .unwrap();
        assert!(config.build_registry().is_err());
    }
}
