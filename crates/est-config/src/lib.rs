//! # est-config
//!
//! Layered configuration loading for Estima using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ESTIMA_*` prefix, `__` as separator)
//! 2. Project-level `.estima/config.toml`
//! 3. User-level `~/.config/estima/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `ESTIMA_DATABASE__PATH` -> `database.path`,
//! `ESTIMA_COSTING__TARGET_MARGIN_PERCENT` -> `costing.target_margin_percent`.
//! The `__` (double underscore) separates nested config sections.

mod costing;
mod database;
mod error;

pub use costing::CostingConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EstimaConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub costing: CostingConfig,
}

impl EstimaConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` — use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if figment extraction fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if figment extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".estima/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ESTIMA_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("estima").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or the current dir
    /// looking for a `.env` file. Silently does nothing if none is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn default_config_loads() {
        let config = EstimaConfig::default();
        assert_eq!(config.database.path, "estima.db");
        assert_eq!(config.costing.target_margin_percent, dec!(30));
    }

    #[test]
    fn env_overrides_win() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ESTIMA_DATABASE__PATH", "/tmp/other.db");
            jail.set_env("ESTIMA_COSTING__TARGET_MARGIN_PERCENT", "45");
            let config: EstimaConfig = EstimaConfig::figment().extract()?;
            assert_eq!(config.database.path, "/tmp/other.db");
            assert_eq!(config.costing.target_margin_percent, dec!(45));
            Ok(())
        });
    }
}
