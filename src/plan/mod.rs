//! The training-plan engine: heuristic tables, exercise selection, plan
//! generation/regeneration and derived metrics.

pub mod generator;
pub mod metrics;
pub mod selector;
pub mod tables;

pub use generator::{generate_plan, regenerate_week};
pub use metrics::{
    GoalProgress, LogStats, ProgressReport, TypeShare, estimate_calories, progress,
    session_type_distribution,
};
pub use selector::{candidate_pool, select};
