//! Repository modules implementing operations for all Estima entities.
//!
//! Each module adds methods to `EstimateService` via `impl EstimateService`
//! blocks.

pub mod estimate;
pub mod role;
pub mod settings;
