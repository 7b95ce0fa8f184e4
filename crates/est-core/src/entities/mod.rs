//! Entity structs for all Estima domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `est-db/migrations/001_initial.sql`). The `view` module holds the
//! read-side tree reconstructed by the estimate fetch join; bindings and
//! tasks only ever surface through it, so they have no standalone structs
//! here.

mod estimate;
mod role;
mod settings;
mod view;

pub use estimate::Estimate;
pub use role::Role;
pub use settings::Settings;
pub use view::{BindingView, EstimateView, RateLine, TaskView};
