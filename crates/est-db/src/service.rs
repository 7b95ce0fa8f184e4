//! Service layer hosting all repository methods.
//!
//! `EstimateService` wraps `EstimateDb` (raw database access) plus the
//! costing fallbacks from configuration. Repo modules under [`crate::repos`]
//! extend it via `impl EstimateService` blocks. The service is the only place
//! storage errors surface; the costing engine in `est-core` stays pure.

use est_config::{CostingConfig, EstimaConfig};

use crate::EstimateDb;
use crate::error::DatabaseError;

/// Orchestrates all Estima database operations.
pub struct EstimateService {
    db: EstimateDb,
    costing: CostingConfig,
}

impl EstimateService {
    /// Open a service on a local database file (`":memory:"` for tests),
    /// with default costing fallbacks.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = EstimateDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Open a service at the configured database path, carrying the
    /// configured costing fallbacks.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_from_config(config: &EstimaConfig) -> Result<Self, DatabaseError> {
        let db = EstimateDb::open_local(&config.database.path).await?;
        Ok(Self::with_costing(db, config.costing.clone()))
    }

    /// Create from an existing `EstimateDb` (for testing).
    #[must_use]
    pub fn from_db(db: EstimateDb) -> Self {
        Self::with_costing(db, CostingConfig::default())
    }

    /// Create from an existing handle with explicit costing fallbacks.
    #[must_use]
    pub const fn with_costing(db: EstimateDb, costing: CostingConfig) -> Self {
        Self { db, costing }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &EstimateDb {
        &self.db
    }

    /// Costing fallbacks used when the settings store has no value.
    #[must_use]
    pub const fn costing(&self) -> &CostingConfig {
        &self.costing
    }
}
