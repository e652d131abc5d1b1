//! Configuration types and validation for the explorer

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    explorer::AnalysisMode,
    utils::UtilityConfig,
};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Explorer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Resolve references when a node is activated
    pub auto_resolve: bool,
    pub default_mode: AnalysisMode,
    /// Upper bound on preview length, in characters
    pub preview_char_cap: usize,
    /// Nesting depth past which values render as one compact leaf
    pub max_tree_depth: usize,
    /// Directory for exports without an explicit destination
    pub export_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            auto_resolve: true,
            default_mode: AnalysisMode::Pages,
            preview_char_cap: 1 << 16,
            max_tree_depth: 256,
            export_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Loads a config file, trying JSON first and YAML second.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(json_err) => serde_yaml::from_str(&text).map_err(|yaml_err| {
                Error::ConfigError(format!(
                    "{}: not JSON ({}) nor YAML ({})",
                    path.display(),
                    json_err,
                    yaml_err
                ))
            })?,
        };
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::ConfigError(format!("Invalid value for {}: {}", key, value))
}

impl UtilityConfig for ExplorerConfig {
    fn validate(&self) -> Result<()> {
        if self.preview_char_cap == 0 {
            return Err(Error::ConfigError("preview_char_cap must be at least 1".into()));
        }
        if self.max_tree_depth < 2 {
            return Err(Error::ConfigError("max_tree_depth must be at least 2".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::ConfigError(format!("Unknown log level: {}", self.log_level)));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        match key {
            "auto_resolve" => Some(self.auto_resolve.to_string()),
            "default_mode" => Some(self.default_mode.to_string()),
            "preview_char_cap" => Some(self.preview_char_cap.to_string()),
            "max_tree_depth" => Some(self.max_tree_depth.to_string()),
            "export_dir" => self.export_dir.as_ref().map(|p| p.display().to_string()),
            "log_level" => Some(self.log_level.clone()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "auto_resolve" => self.auto_resolve = value.parse().map_err(|_| invalid(key, &value))?,
            "default_mode" => self.default_mode = value.parse()?,
            "preview_char_cap" => {
                self.preview_char_cap = value.parse().map_err(|_| invalid(key, &value))?
            }
            "max_tree_depth" => {
                self.max_tree_depth = value.parse().map_err(|_| invalid(key, &value))?
            }
            "export_dir" => {
                self.export_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "log_level" => self.log_level = value.to_lowercase(),
            _ => return Err(Error::ConfigError(format!("Unknown key: {}", key))),
        }
        self.validate()
    }
}
