//! Heuristic lookup tables keyed by activity level.
//!
//! Every per-session parameter (volume, duration, rest, rep format) is a
//! row lookup; an unrecognised activity level uses [`DEFAULT_ROW`].

use crate::models::CatalogExercise;
use crate::types::{ActivityLevel, SessionType};

/// Parameters for one activity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRow {
    pub sessions_per_week: u32,
    pub base_duration_minutes: u32,
    pub base_sets: u32,
    pub rest_seconds: u32,
    pub duration_reps: &'static str,
    pub count_reps: &'static str,
}

const SEDENTARY_ROW: ActivityRow = ActivityRow {
    sessions_per_week: 2,
    base_duration_minutes: 20,
    base_sets: 2,
    rest_seconds: 90,
    duration_reps: "10-15min",
    count_reps: "8-12",
};

const LIGHT_ROW: ActivityRow = ActivityRow {
    sessions_per_week: 3,
    base_duration_minutes: 30,
    base_sets: 3,
    rest_seconds: 75,
    duration_reps: "15-20min",
    count_reps: "10-15",
};

const MODERATE_ROW: ActivityRow = ActivityRow {
    sessions_per_week: 4,
    base_duration_minutes: 40,
    base_sets: 3,
    rest_seconds: 60,
    duration_reps: "20-25min",
    count_reps: "12-15",
};

const HIGH_ROW: ActivityRow = ActivityRow {
    sessions_per_week: 5,
    base_duration_minutes: 50,
    base_sets: 4,
    rest_seconds: 45,
    duration_reps: "25-30min",
    count_reps: "15-20",
};

pub const DEFAULT_ROW: ActivityRow = ActivityRow {
    sessions_per_week: 3,
    base_duration_minutes: 30,
    base_sets: 3,
    rest_seconds: 60,
    duration_reps: "15-20min",
    count_reps: "10-15",
};

pub const MAX_SETS: u32 = 5;
pub const DURATION_STEP_MINUTES: u32 = 5;

/// Session types cycled through by week number for a general focus.
pub const GENERAL_ROTATION: [SessionType; 4] = [
    SessionType::Mixed,
    SessionType::Cardio,
    SessionType::Strength,
    SessionType::Hiit,
];

pub fn row(level: Option<ActivityLevel>) -> &'static ActivityRow {
    match level {
        Some(ActivityLevel::Sedentary) => &SEDENTARY_ROW,
        Some(ActivityLevel::Light) => &LIGHT_ROW,
        Some(ActivityLevel::Moderate) => &MODERATE_ROW,
        Some(ActivityLevel::High) => &HIGH_ROW,
        None => &DEFAULT_ROW,
    }
}

pub fn sessions_per_week(level: Option<ActivityLevel>) -> u32 {
    row(level).sessions_per_week
}

/// Base duration plus five minutes per elapsed week, uncapped.
pub fn session_duration(level: Option<ActivityLevel>, week_number: u32) -> u32 {
    row(level).base_duration_minutes + DURATION_STEP_MINUTES * week_number.saturating_sub(1)
}

pub fn sets(level: Option<ActivityLevel>, week_number: u32) -> u32 {
    (row(level).base_sets + week_number / 2).min(MAX_SETS)
}

/// Duration range for cardio work, rep-count range otherwise.
pub fn reps(level: Option<ActivityLevel>, exercise: &CatalogExercise, session_type: SessionType) -> String {
    let row = row(level);
    if session_type == SessionType::Cardio || exercise.is_cardio() {
        row.duration_reps.to_string()
    } else {
        row.count_reps.to_string()
    }
}

pub fn rest_seconds(level: Option<ActivityLevel>) -> u32 {
    row(level).rest_seconds
}
