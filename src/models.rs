use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ActivityLevel, CARDIO_BODY_PART, Focus, Gender, Goal, PlanStatus, SessionStatus, SessionType,
};

/// Physical attributes and preferences that drive plan personalization.
/// `activity_level` is `None` when the stored value is not recognised,
/// in which case the default row of every heuristic table applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub owner_id: String,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Goal,
    pub equipment: Vec<String>,
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            owner_id: owner_id.into(),
            activity_level: Some(ActivityLevel::Sedentary),
            goal: Goal::Maintain,
            equipment: Vec::new(),
            weight_kg: 0.0,
            target_weight_kg: 0.0,
            height_cm: None,
            gender: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reusable exercise definition, public or owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    pub body_part: Option<String>,
    pub equipment: Vec<String>,
    pub target: Option<String>,
    pub difficulty: Option<String>,
    pub owner_id: Option<String>,
    pub is_public: bool,
}

impl CatalogExercise {
    pub fn is_cardio(&self) -> bool {
        self.body_part
            .as_deref()
            .is_some_and(|b| b.eq_ignore_ascii_case(CARDIO_BODY_PART))
    }
}

/// Input for adding an exercise to the local catalog.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub body_part: String,
    pub equipment: Vec<String>,
    pub target: Option<String>,
    pub difficulty: Option<String>,
    pub owner_id: Option<String>,
    pub is_public: bool,
}

/// Catalog query. Results are visible to `visible_to` (public exercises
/// plus that user's own), narrowed by the optional filters.
#[derive(Debug, Clone, Default)]
pub struct ExerciseSearch {
    pub visible_to: Option<String>,
    pub name: Option<String>,
    pub body_part: Option<String>,
    pub equipment: Option<String>,
}

impl ExerciseSearch {
    pub fn visible_to(owner_id: impl Into<String>) -> Self {
        Self {
            visible_to: Some(owner_id.into()),
            ..Self::default()
        }
    }
}

/// What the caller asks for when generating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub name: String,
    pub description: String,
    pub goal: Goal,
    pub focus: Focus,
    pub duration_weeks: u32,
    pub start_date: Option<NaiveDate>,
}

impl PlanRequest {
    pub const DEFAULT_DURATION_WEEKS: u32 = 4;
    pub const MAX_DURATION_WEEKS: u32 = 52;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            goal: Goal::default(),
            focus: Focus::default(),
            duration_weeks: Self::DEFAULT_DURATION_WEEKS,
            start_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub goal: Goal,
    pub focus: Focus,
    pub duration_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: Vec<Week>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.weeks.iter().flat_map(|w| w.sessions.iter())
    }

    pub fn total_sessions(&self) -> usize {
        self.weeks.iter().map(|w| w.sessions.len()).sum()
    }

    pub fn completed_sessions(&self) -> usize {
        self.sessions()
            .filter(|s| s.status == SessionStatus::Completed)
            .count()
    }

    pub fn week(&self, week_number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    pub fn week_mut(&mut self, week_number: u32) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|w| w.week_number == week_number)
    }

    pub fn session_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.weeks
            .iter_mut()
            .flat_map(|w| w.sessions.iter_mut())
            .find(|s| s.id == session_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub week_number: u32,
    pub sessions: Vec<Session>,
}

/// A single scheduled workout inside a plan week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub day_of_week: String,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub exercises: Vec<SessionExercise>,
}

/// Prescribed work for one catalog exercise.
/// Holds the exercise id plus a name snapshot, never the exercise itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: String,
    pub weight_kg: Option<f64>,
    pub rest_seconds: u32,
}

/// A workout the user actually performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub id: String,
    pub owner_id: String,
    pub plan_id: Option<String>,
    pub session_id: Option<String>,
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub calories_burned: u32,
    pub notes: Option<String>,
    pub exercises: Vec<ExerciseLog>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<SetLog>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight_kg: Option<f64>,
    pub duration_seconds: Option<u32>,
    pub completed: bool,
}

/// Input for recording a session log. A missing or non-positive calorie
/// value is replaced by an estimate.
#[derive(Debug, Clone, Default)]
pub struct NewSessionLog {
    pub plan_id: Option<String>,
    pub session_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub calories_burned: Option<i64>,
    pub notes: Option<String>,
    pub exercises: Vec<NewExerciseLog>,
}

#[derive(Debug, Clone)]
pub struct NewExerciseLog {
    pub exercise_id: String,
    pub sets: Vec<SetLog>,
    pub completed: bool,
}
