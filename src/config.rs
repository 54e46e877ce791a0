//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{AppError, Result};

/// Coders granted admin capability by the permission oracle.
///
/// Permission-level computation proper is an external collaborator; this
/// config-driven map is the stand-in the service ships with. Coders in
/// `admins` receive level 2 for every project, everyone else level 1.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PermissionsConfig {
    /// Coder identifiers with admin capability.
    #[serde(default)]
    pub admins: Vec<String>,
}

fn default_http_port() -> u16 {
    8600
}

fn default_db_path() -> PathBuf {
    PathBuf::from("labelflow.db")
}

fn default_batch_size() -> u32 {
    30
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// HTTP port for the annotation API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Fallback batch size when a project does not specify one.
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,
    /// Admin capability map consulted by the permission oracle.
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Permission level for a (project, coder) pair.
    ///
    /// Levels above 1 denote admin capability. The project argument is
    /// unused by this oracle but kept so a real per-project oracle can
    /// slot in behind the same call shape.
    #[must_use]
    pub fn permission_level(&self, _project_id: &str, coder: &str) -> i64 {
        if self.permissions.admins.iter().any(|c| c == coder) {
            2
        } else {
            1
        }
    }

    fn validate(&self) -> Result<()> {
        if self.default_batch_size == 0 {
            return Err(AppError::Config(
                "default_batch_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Whether a permission level denotes admin capability.
#[must_use]
pub fn denotes_admin(level: i64) -> bool {
    level > 1
}
