//! Configuration management for the built-in context engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (context.toml)
//! - Environment variables (CONTEXT__*)
//!
//! ## Example config file (context.toml):
//! ```toml
//! [schema]
//! path = "./schemas/builtInSchema.json"
//!
//! [mutation]
//! mode = "strict"
//! leaf_value_field = "leafValue"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextConfig {
    /// Schema settings
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Mutation settings
    #[serde(default)]
    pub mutation: MutationConfig,
}

/// Where the built-in context schema lives
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaConfig {
    /// Path to the JSON Schema file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// How set and delete treat the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MutationMode {
    /// Every mutation is checked against the schema and rolled back on failure
    #[default]
    Strict,
    /// Mutations are applied directly; the schema is never consulted
    Permissive,
}

/// Mutation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    #[serde(default)]
    pub mode: MutationMode,

    /// Wrapper field whose value is stored instead of the wrapping object
    #[serde(default = "default_leaf_value_field")]
    pub leaf_value_field: String,
}

fn default_leaf_value_field() -> String {
    "leafValue".to_string()
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            mode: MutationMode::Strict,
            leaf_value_field: default_leaf_value_field(),
        }
    }
}

impl ContextConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["context.toml", ".context.toml", "config/context.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "builtin", "context") {
            let xdg_config = config_dir.config_dir().join("context.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CONTEXT__SCHEMA__PATH, CONTEXT__MUTATION__MODE, ...
        builder = builder.add_source(
            Environment::with_prefix("CONTEXT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the schema path, resolving relative paths against the working directory
    pub fn schema_path(&self) -> Option<PathBuf> {
        self.schema.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}
