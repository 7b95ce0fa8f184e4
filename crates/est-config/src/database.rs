//! Database location configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "estima.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. `":memory:"` for an in-memory store.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
