//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::ConfigurationError;
use crate::handler::resolver::HandlerResolver;
use crate::routing::table::{RuleTable, RuleTableBuilder};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Rules(ConfigurationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Rules(e) => write!(f, "Rule table error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Rules(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Build a rule table from a validated configuration.
///
/// With a `verifier`, every required handler must resolve through it.
pub fn build_rule_table(config: &AppConfig, verifier: Option<Arc<dyn HandlerResolver>>) -> Result<RuleTable, ConfigError> {
    let mut builder = RuleTableBuilder::from_config(config).map_err(ConfigError::Rules)?;
    if let Some(verifier) = verifier {
        builder.verify_with(verifier);
    }
    builder.build().map_err(ConfigError::Rules)
}

/// Load a configuration file and build its rule table.
pub fn load_rule_table(path: &Path, verifier: Option<Arc<dyn HandlerResolver>>) -> Result<RuleTable, ConfigError> {
    let config = load_config(path)?;
    build_rule_table(&config, verifier)
}
