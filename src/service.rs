//! Collaborator contracts and the plan service built on top of them.
//!
//! The engine in [`crate::plan`] is pure; this module wires it to a profile
//! source, an exercise catalog and plan/log storage. All I/O errors from
//! collaborators propagate unchanged and nothing is retried.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{FitError, Result};
use crate::models::{
    CatalogExercise, ExerciseLog, ExerciseSearch, NewSessionLog, Plan, PlanRequest, Profile,
    Session, SessionLog,
};
use crate::plan::{self, LogStats, ProgressReport};
use crate::types::{PlanStatus, SessionStatus, SessionType};

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn get_profile(&self, owner_id: &str) -> Result<Option<Profile>>;
}

/// Read access to the exercise catalog.
///
/// Implementations must return search results ordered by name and then
/// by id. Selection takes prefixes of that list, so plan generation is only
/// reproducible under this ordering.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    async fn search_exercises(&self, filter: &ExerciseSearch) -> Result<Vec<CatalogExercise>>;
    async fn get_exercise(&self, id: &str) -> Result<Option<CatalogExercise>>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create_plan(&self, plan: Plan) -> Result<Plan>;
    async fn update_plan(&self, plan: &Plan) -> Result<()>;
    async fn get_plan(&self, plan_id: &str) -> Result<Option<Plan>>;
    async fn get_active_plan(&self, owner_id: &str) -> Result<Option<Plan>>;
    async fn list_plans(&self, owner_id: &str) -> Result<Vec<Plan>>;
    async fn delete_plan(&self, plan_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait SessionLogStore: Send + Sync {
    async fn create_log(&self, log: SessionLog) -> Result<SessionLog>;
    async fn get_log(&self, log_id: &str) -> Result<Option<SessionLog>>;
    async fn list_logs(
        &self,
        owner_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<SessionLog>>;
    async fn list_logs_for_plan(&self, plan_id: &str) -> Result<Vec<SessionLog>>;
    async fn delete_log(&self, log_id: &str) -> Result<bool>;
}

pub const UNKNOWN_EXERCISE: &str = "unknown exercise";

/// Entry point used by the surrounding application.
pub struct PlanService<B> {
    backend: B,
}

impl<B> PlanService<B>
where
    B: ProfileSource + ExerciseCatalog + PlanStore,
{
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn profile(&self, owner_id: &str) -> Result<Profile> {
        self.backend
            .get_profile(owner_id)
            .await?
            .ok_or_else(|| FitError::not_found("profile", owner_id))
    }

    /// Exercises visible to the owner that their equipment allows.
    pub async fn eligible_pool(&self, profile: &Profile) -> Result<Vec<CatalogExercise>> {
        let catalog = self
            .backend
            .search_exercises(&ExerciseSearch::visible_to(profile.owner_id.clone()))
            .await?;
        Ok(plan::candidate_pool(catalog, profile))
    }

    /// Build a full plan for `owner_id`. Nothing is stored.
    pub async fn generate_plan(&self, owner_id: &str, request: &PlanRequest) -> Result<Plan> {
        let profile = self.profile(owner_id).await?;
        let pool = self.eligible_pool(&profile).await?;
        plan::generate_plan(&profile, &pool, request, Local::now().date_naive(), Utc::now())
    }

    /// Retire the owner's active plans, then generate and store a new one.
    ///
    /// Not atomic: two concurrent calls for one owner can both succeed.
    pub async fn activate_new_plan(&self, owner_id: &str, request: &PlanRequest) -> Result<Plan> {
        let plan = self.generate_plan(owner_id, request).await?;

        for mut prior in self.backend.list_plans(owner_id).await? {
            if prior.is_active() {
                prior.status = PlanStatus::Completed;
                prior.updated_at = Utc::now();
                self.backend.update_plan(&prior).await?;
                tracing::info!(plan = %prior.id, "retired previously active plan");
            }
        }

        let stored = self.backend.create_plan(plan).await?;
        tracing::info!(
            plan = %stored.id,
            owner = %owner_id,
            weeks = stored.duration_weeks,
            sessions = stored.total_sessions(),
            "created training plan"
        );
        Ok(stored)
    }

    /// Rebuild the exercise lists of one week. Nothing is stored.
    pub async fn regenerate_week(&self, mut plan: Plan, week_number: u32) -> Result<Plan> {
        let profile = self.profile(&plan.owner_id).await?;
        let pool = self.eligible_pool(&profile).await?;
        plan::regenerate_week(&mut plan, &profile, &pool, week_number, Utc::now())?;
        Ok(plan)
    }

    pub async fn regenerate_and_save(&self, owner_id: &str, plan_id: &str, week_number: u32) -> Result<Plan> {
        let plan = self.owned_plan(owner_id, plan_id).await?;
        if week_number == 0 || week_number > plan.duration_weeks {
            return Err(FitError::validation(format!(
                "week {} is outside 1..={}",
                week_number, plan.duration_weeks
            )));
        }
        let plan = self.regenerate_week(plan, week_number).await?;
        self.backend.update_plan(&plan).await?;
        tracing::info!(plan = %plan.id, week = week_number, "regenerated plan week");
        Ok(plan)
    }

    pub fn calculate_progress(plan: &Plan) -> f64 {
        plan::progress(plan)
    }

    pub fn estimate_calories(profile: &Profile, session_type: SessionType, duration_minutes: u32) -> u32 {
        plan::estimate_calories(profile.weight_kg, duration_minutes, session_type)
    }

    /// Expected burn for a planned session.
    pub fn estimate_session_calories(profile: &Profile, session: &Session) -> u32 {
        Self::estimate_calories(profile, session.session_type, session.duration_minutes)
    }

    /// Fetch a plan, hiding plans that belong to someone else.
    pub async fn owned_plan(&self, owner_id: &str, plan_id: &str) -> Result<Plan> {
        match self.backend.get_plan(plan_id).await? {
            Some(plan) if plan.owner_id == owner_id => Ok(plan),
            _ => Err(FitError::not_found("plan", plan_id)),
        }
    }

    pub async fn active_plan(&self, owner_id: &str) -> Result<Plan> {
        self.backend
            .get_active_plan(owner_id)
            .await?
            .ok_or_else(|| FitError::not_found("active plan", owner_id))
    }

    pub async fn set_session_status(
        &self,
        owner_id: &str,
        plan_id: &str,
        session_id: &str,
        status: SessionStatus,
    ) -> Result<Plan> {
        let mut plan = self.owned_plan(owner_id, plan_id).await?;
        let session = plan
            .session_mut(session_id)
            .ok_or_else(|| FitError::not_found("session", session_id))?;
        session.status = status;
        plan.updated_at = Utc::now();
        self.backend.update_plan(&plan).await?;
        Ok(plan)
    }

    pub async fn cancel_plan(&self, owner_id: &str, plan_id: &str) -> Result<Plan> {
        let mut plan = self.owned_plan(owner_id, plan_id).await?;
        plan.status = PlanStatus::Cancelled;
        plan.updated_at = Utc::now();
        self.backend.update_plan(&plan).await?;
        Ok(plan)
    }

    pub async fn delete_plan(&self, owner_id: &str, plan_id: &str) -> Result<()> {
        let plan = self.owned_plan(owner_id, plan_id).await?;
        self.backend.delete_plan(&plan.id).await?;
        Ok(())
    }

    pub async fn progress_report(&self, owner_id: &str, plan_id: &str, today: NaiveDate) -> Result<ProgressReport> {
        let plan = self.owned_plan(owner_id, plan_id).await?;
        Ok(ProgressReport::build(&plan, today))
    }
}

impl<B> PlanService<B>
where
    B: ProfileSource + ExerciseCatalog + PlanStore + SessionLogStore,
{
    /// Record a performed workout, estimating calories when none are given.
    pub async fn log_session(&self, owner_id: &str, new: NewSessionLog) -> Result<SessionLog> {
        if new.duration_minutes == 0 {
            return Err(FitError::validation("duration must be positive"));
        }
        let profile = self.profile(owner_id).await?;

        let calories_burned = match new.calories_burned {
            Some(kcal) if kcal > 0 => u32::try_from(kcal).unwrap_or(u32::MAX),
            _ => Self::estimate_calories(&profile, new.session_type, new.duration_minutes),
        };

        let mut exercises = Vec::with_capacity(new.exercises.len());
        for ex in new.exercises {
            let exercise_name = match self.backend.get_exercise(&ex.exercise_id).await? {
                Some(found) => found.name,
                None => UNKNOWN_EXERCISE.to_string(),
            };
            exercises.push(ExerciseLog {
                exercise_id: ex.exercise_id,
                exercise_name,
                sets: ex.sets,
                completed: ex.completed,
            });
        }

        let log = SessionLog {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            plan_id: new.plan_id,
            session_id: new.session_id,
            date: new.date.unwrap_or_else(|| Local::now().date_naive()),
            session_type: new.session_type,
            duration_minutes: new.duration_minutes,
            calories_burned,
            notes: new.notes,
            exercises,
            created_at: Utc::now(),
        };

        let stored = self.backend.create_log(log).await?;
        tracing::info!(log = %stored.id, kcal = stored.calories_burned, "recorded session log");
        Ok(stored)
    }

    /// Record a workout that fulfils a planned session and mark that session
    /// completed.
    ///
    /// The plan, the session and the log input are all checked before
    /// anything is written. If the plan update fails the new log is removed
    /// again, so callers never see a log for a session still `planned`.
    pub async fn log_plan_session(
        &self,
        owner_id: &str,
        plan_id: &str,
        session_id: &str,
        mut new: NewSessionLog,
    ) -> Result<(SessionLog, Plan)> {
        let mut plan = self.owned_plan(owner_id, plan_id).await?;
        let session = plan
            .session_mut(session_id)
            .ok_or_else(|| FitError::not_found("session", session_id))?;
        session.status = SessionStatus::Completed;
        plan.updated_at = Utc::now();

        new.plan_id = Some(plan.id.clone());
        new.session_id = Some(session_id.to_string());
        let log = self.log_session(owner_id, new).await?;

        if let Err(e) = self.backend.update_plan(&plan).await {
            tracing::warn!(log = %log.id, error = %e, "plan update failed; removing session log");
            self.backend.delete_log(&log.id).await?;
            return Err(e);
        }
        Ok((log, plan))
    }

    pub async fn delete_log(&self, owner_id: &str, log_id: &str) -> Result<()> {
        match self.backend.get_log(log_id).await? {
            Some(log) if log.owner_id == owner_id => {
                self.backend.delete_log(log_id).await?;
                Ok(())
            }
            _ => Err(FitError::not_found("session log", log_id)),
        }
    }

    pub async fn log_stats(&self, owner_id: &str, from: NaiveDate, to: NaiveDate) -> Result<LogStats> {
        let logs = self.backend.list_logs(owner_id, Some(from), Some(to)).await?;
        Ok(LogStats::compute(&logs, from, to))
    }
}
