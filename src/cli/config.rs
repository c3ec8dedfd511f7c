//! Configuration file
//!
//! ```json
//! {
//!   "server": {"host": "0.0.0.0", "port": 8666, "mount_path": "/"},
//!   "key_type": "integer",
//!   "indexes": [{"name": "byA", "field": "a"}],
//!   "log_level": "info"
//! }
//! ```
//!
//! Every field is optional.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::rest_api::{IndexRegistry, IndexRequest};
use crate::store::{DocumentKey, JsonDocument};

use super::errors::{CliError, CliResult};

/// How `:uid` path segments become keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Integer,
    String,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Integer => "integer",
            KeyType::String => "string",
        }
    }
}

/// A field-equality index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name used in `/findAll/:index`
    pub name: String,
    /// Document field compared against the query value
    pub field: String,
    /// Query parameter carrying the value (defaults to `field`)
    #[serde(default)]
    pub param: Option<String>,
}

impl IndexConfig {
    pub fn param(&self) -> &str {
        self.param.as_deref().unwrap_or(&self.field)
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default = "default_key_type")]
    pub key_type: KeyType,

    #[serde(default)]
    pub indexes: Vec<IndexConfig>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_type() -> KeyType {
    KeyType::Integer
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            key_type: default_key_type(),
            indexes: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be trace, info, warn, error or fatal.",
                self.log_level
            )));
        }

        if !self.server.mount_path.starts_with('/') {
            return Err(CliError::config_error(format!(
                "Invalid mount_path: '{}'. Must start with '/'.",
                self.server.mount_path
            )));
        }

        let mut seen = HashSet::new();
        for index in &self.indexes {
            if index.name.is_empty() || index.field.is_empty() || index.param().is_empty() {
                return Err(CliError::config_error(
                    "Index name, field and param must not be empty",
                ));
            }
            if !seen.insert(index.name.as_str()) {
                return Err(CliError::config_error(format!(
                    "Duplicate index name: '{}'",
                    index.name
                )));
            }
        }

        Ok(())
    }

    /// Minimum log severity; validated at load
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    /// Index registry for JSON documents described by this config
    pub fn registry(&self) -> IndexRegistry<DocumentKey, JsonDocument> {
        let parser = match self.key_type {
            KeyType::Integer => DocumentKey::parse_integer,
            KeyType::String => DocumentKey::parse_string,
        };

        self.indexes
            .iter()
            .fold(IndexRegistry::new().key_parser(parser), |registry, index| {
                let field = index.field.clone();
                let param = index.param().to_string();
                registry.register(
                    index.name.clone(),
                    move |value: &Value, item: &JsonDocument| item.field_equals(&field, value),
                    move |req: &IndexRequest| req.param_value(&param),
                )
            })
    }
}
