//! Training-plan generation and progress tracking.
//!
//! [`plan`] holds the pure engine, [`service`] wires it to its collaborators
//! and [`storage`] provides the SQLite implementation of those collaborators.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod plan;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{FitError, Result};
pub use service::{ExerciseCatalog, PlanService, PlanStore, ProfileSource, SessionLogStore};
pub use storage::SqliteStore;
pub use types::{OutputFmt, emit};
