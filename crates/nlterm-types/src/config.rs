//! Runtime configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration with the remote resolver allowed and the system
//! passthrough disabled.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TermError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    /// Initial working directory. `None` uses the process working directory.
    pub start_dir: Option<PathBuf>,
    /// Remote text-generation resolver settings.
    pub remote: RemoteConfig,
    /// System command passthrough settings.
    pub passthrough: PassthroughConfig,
}

/// Settings for the remote natural-language resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Network capability switch. When false the deterministic resolver is
    /// used for the whole session.
    pub enabled: bool,
    /// Environment variable holding the API credential.
    pub api_key_env: String,
    /// Base URL of the model API (model name and method are appended).
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RemoteConfig {
    /// Read the credential from the configured environment variable.
    ///
    /// Empty values count as absent.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

/// Settings for forwarding unknown direct commands to the OS shell.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PassthroughConfig {
    pub enabled: bool,
    /// Wall-clock limit in seconds.
    pub timeout_secs: u64,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 30,
        }
    }
}

impl TermConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: TermConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TermError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.start_dir
            && !dir.is_absolute()
        {
            return Err(TermError::Config(format!(
                "start_dir must be absolute: {}",
                dir.display()
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(TermError::Config(
                "remote.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.passthrough.timeout_secs == 0 {
            return Err(TermError::Config(
                "passthrough.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
