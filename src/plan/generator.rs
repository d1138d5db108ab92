//! Plan construction and single-week regeneration.
//!
//! Both operate purely on data already in memory; fetching the profile and
//! catalog and persisting the result belong to [`crate::service`].

use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

use super::{selector, tables};
use crate::error::{FitError, Result};
use crate::models::{CatalogExercise, Plan, PlanRequest, Profile, Session, SessionExercise, Week};
use crate::types::{Focus, PlanStatus, SessionStatus, SessionType};

/// Session type for a week under the given focus.
pub fn session_type_for(focus: Focus, week_number: u32) -> SessionType {
    match focus {
        Focus::Cardio => SessionType::Cardio,
        Focus::Strength => SessionType::Strength,
        Focus::Hiit => SessionType::Hiit,
        Focus::General => {
            let rotation = &tables::GENERAL_ROTATION;
            rotation[week_number as usize % rotation.len()]
        }
    }
}

fn add_days(start: NaiveDate, days: u64) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(days))
        .ok_or_else(|| FitError::validation(format!("{start} + {days} days is past the calendar end")))
}

/// Calendar date of a session slot: start + (week - 1) * 7 + slot days.
pub fn session_date(start: NaiveDate, week_number: u32, slot: u32) -> Result<NaiveDate> {
    let offset = u64::from(week_number.saturating_sub(1)) * 7 + u64::from(slot);
    add_days(start, offset)
}

pub fn end_date(start: NaiveDate, duration_weeks: u32) -> Result<NaiveDate> {
    add_days(start, u64::from(duration_weeks) * 7)
}

/// Choose and parameterize the exercises of one session.
pub fn build_exercises(
    profile: &Profile,
    pool: &[CatalogExercise],
    session_type: SessionType,
    week_number: u32,
) -> Vec<SessionExercise> {
    let level = profile.activity_level;

    selector::select(pool, session_type)
        .into_iter()
        .map(|exercise| SessionExercise {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
            sets: tables::sets(level, week_number),
            reps: tables::reps(level, exercise, session_type),
            weight_kg: None,
            rest_seconds: tables::rest_seconds(level),
        })
        .collect()
}

fn build_session(
    profile: &Profile,
    pool: &[CatalogExercise],
    focus: Focus,
    start: NaiveDate,
    week_number: u32,
    slot: u32,
) -> Result<Session> {
    let date = session_date(start, week_number, slot)?;
    let session_type = session_type_for(focus, week_number);

    Ok(Session {
        id: Uuid::new_v4().to_string(),
        date,
        day_of_week: date.format("%A").to_string(),
        session_type,
        duration_minutes: tables::session_duration(profile.activity_level, week_number),
        status: SessionStatus::Planned,
        exercises: build_exercises(profile, pool, session_type, week_number),
    })
}

fn build_week(
    profile: &Profile,
    pool: &[CatalogExercise],
    focus: Focus,
    start: NaiveDate,
    week_number: u32,
) -> Result<Week> {
    let count = tables::sessions_per_week(profile.activity_level);
    let sessions = (0..count)
        .map(|slot| build_session(profile, pool, focus, start, week_number, slot))
        .collect::<Result<Vec<_>>>()?;

    Ok(Week {
        week_number,
        sessions,
    })
}

/// Build a complete active plan for `profile` from an eligible exercise pool.
///
/// `today` is used when the request carries no start date.
pub fn generate_plan(
    profile: &Profile,
    pool: &[CatalogExercise],
    request: &PlanRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Plan> {
    if request.name.trim().is_empty() {
        return Err(FitError::validation("plan name must not be empty"));
    }
    if request.duration_weeks == 0 {
        return Err(FitError::validation("plan must last at least one week"));
    }
    if request.duration_weeks > PlanRequest::MAX_DURATION_WEEKS {
        return Err(FitError::validation(format!(
            "plan may last at most {} weeks",
            PlanRequest::MAX_DURATION_WEEKS
        )));
    }

    if pool.is_empty() {
        tracing::warn!(
            owner = %profile.owner_id,
            "no eligible exercises; sessions will be generated without exercises"
        );
    }

    let start = request.start_date.unwrap_or(today);
    let end = end_date(start, request.duration_weeks)?;
    let weeks = (1..=request.duration_weeks)
        .map(|week_number| {
            tracing::debug!(week = week_number, "building plan week");
            build_week(profile, pool, request.focus, start, week_number)
        })
        .collect::<Result<Vec<Week>>>()?;

    Ok(Plan {
        id: Uuid::new_v4().to_string(),
        owner_id: profile.owner_id.clone(),
        name: request.name.clone(),
        description: request.description.clone(),
        goal: request.goal,
        focus: request.focus,
        duration_weeks: request.duration_weeks,
        start_date: start,
        end_date: end,
        weeks,
        status: PlanStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

/// Replace the exercise lists of every session in `week_number`.
///
/// Dates, types, durations and statuses are left as they are.
pub fn regenerate_week(
    plan: &mut Plan,
    profile: &Profile,
    pool: &[CatalogExercise],
    week_number: u32,
    now: DateTime<Utc>,
) -> Result<()> {
    if week_number == 0 || week_number > plan.duration_weeks {
        return Err(FitError::validation(format!(
            "week {} is outside 1..={}",
            week_number, plan.duration_weeks
        )));
    }

    let week = plan
        .week_mut(week_number)
        .ok_or_else(|| FitError::not_found("week", week_number.to_string()))?;

    for session in &mut week.sessions {
        session.exercises = build_exercises(profile, pool, session.session_type, week_number);
    }

    plan.updated_at = now;
    Ok(())
}
