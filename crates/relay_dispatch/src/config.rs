//! Runtime configuration
//!
//! Sources, later ones winning: built-in defaults, a TOML file, then
//! environment variables.
//!
//! ```toml
//! log_filter = "relay_dispatch=debug,info"
//! privileged_types = ["ScriptableService", "ScriptableSystem"]
//!
//! [controllers]
//! disabled = ["RawInput"]
//! ```

use std::path::{Path, PathBuf};

use relay_core::Name;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::SCRIPTABLE_SERVICE;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "relay.toml";
/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "RELAY_CONFIG";
/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "RELAY_LOG";
/// Environment variable overriding the privileged types (comma separated)
pub const PRIVILEGED_ENV: &str = "RELAY_PRIVILEGED_TYPES";

/// Controller switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Controllers whose events are declared but never hooked
    pub disabled: Vec<String>,
}

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// `env_logger` filter directives
    pub log_filter: String,
    /// Base types whose instances register `Forever` handlers
    pub privileged_types: Vec<String>,
    pub controllers: ControllerConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            privileged_types: vec![SCRIPTABLE_SERVICE.to_string()],
            controllers: ControllerConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load from every source.
    ///
    /// A missing file yields the defaults; a malformed one is logged and
    /// ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env();
        config
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup(LOG_ENV).filter(|value| !value.trim().is_empty()) {
            self.log_filter = filter;
        }

        if let Some(types) = lookup(PRIVILEGED_ENV) {
            self.privileged_types = types
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    pub fn privileged_names(&self) -> Vec<Name> {
        self.privileged_types.iter().map(|name| Name::new(name)).collect()
    }
}
