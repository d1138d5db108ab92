//! Progress, energy expenditure and body metrics derived from plan and
//! log data. Nothing here depends on the generator.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::models::{Plan, Profile, Session, SessionLog};
use crate::types::{ActivityLevel, Gender, Goal, SessionStatus, SessionType};

/// Percentage of plan sessions marked completed, 0 for an empty plan.
pub fn progress(plan: &Plan) -> f64 {
    let total = plan.total_sessions();
    if total == 0 {
        return 0.0;
    }
    plan.completed_sessions() as f64 / total as f64 * 100.0
}

pub fn intensity_factor(session_type: SessionType) -> f64 {
    match session_type {
        SessionType::Cardio => 1.2,
        SessionType::Strength => 1.0,
        SessionType::Hiit => 1.5,
        SessionType::Mixed => 1.1,
    }
}

/// floor(0.5 × kg × hours × intensity), never negative.
pub fn estimate_calories(weight_kg: f64, duration_minutes: u32, session_type: SessionType) -> u32 {
    let base = weight_kg * 0.5;
    let hours = f64::from(duration_minutes) / 60.0;
    let kcal = (base * hours * intensity_factor(session_type)).floor();
    if kcal.is_finite() && kcal > 0.0 {
        kcal as u32
    } else {
        0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub progress_percentage: f64,
    pub completed_sessions: usize,
    pub total_sessions: usize,
    pub remaining_sessions: usize,
    pub current_week: u32,
    pub estimated_remaining_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub next_session: Option<Session>,
}

impl ProgressReport {
    pub fn build(plan: &Plan, today: NaiveDate) -> Self {
        let total = plan.total_sessions();
        let completed = plan.completed_sessions();

        let elapsed_days = (today - plan.start_date).num_days();
        let current_week = if elapsed_days < 0 {
            1
        } else {
            ((elapsed_days / 7 + 1) as u32).min(plan.duration_weeks).max(1)
        };

        let days_left = (plan.end_date - today).num_days();
        let estimated_remaining_weeks = if days_left <= 0 {
            0
        } else {
            ((days_left + 6) / 7) as u32
        };

        let next_session = plan
            .sessions()
            .filter(|s| s.status == SessionStatus::Planned && s.date >= today)
            .min_by_key(|s| s.date)
            .cloned();

        Self {
            progress_percentage: round_to(progress(plan), 1),
            completed_sessions: completed,
            total_sessions: total,
            remaining_sessions: total - completed,
            current_week,
            estimated_remaining_weeks,
            start_date: plan.start_date,
            end_date: plan.end_date,
            next_session,
        }
    }
}

/// Aggregates over a window of session logs.
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_sessions: usize,
    pub total_minutes: u64,
    pub total_calories: u64,
    pub average_duration: f64,
    pub sessions_per_week: f64,
    pub most_common_type: SessionType,
}

impl LogStats {
    pub fn compute(logs: &[SessionLog], from: NaiveDate, to: NaiveDate) -> Self {
        let total_minutes: u64 = logs.iter().map(|l| u64::from(l.duration_minutes)).sum();
        let total_calories: u64 = logs.iter().map(|l| u64::from(l.calories_burned)).sum();
        let average_duration = if logs.is_empty() {
            0.0
        } else {
            total_minutes as f64 / logs.len() as f64
        };

        let weeks = ((to - from).num_days() as f64 / 7.0).max(1.0);

        Self {
            from,
            to,
            total_sessions: logs.len(),
            total_minutes,
            total_calories,
            average_duration,
            sessions_per_week: logs.len() as f64 / weeks,
            most_common_type: most_common_type(logs),
        }
    }
}

/// Most frequent session type; ties go to the type seen first.
fn most_common_type(logs: &[SessionLog]) -> SessionType {
    let counts = logs.iter().map(|l| l.session_type).counts();
    let order: Vec<SessionType> = logs.iter().map(|l| l.session_type).unique().collect();

    order
        .into_iter()
        .rev()
        .max_by_key(|t| counts.get(t).copied().unwrap_or(0))
        .unwrap_or_default()
}

/// Body mass index rounded to two decimals, `None` without a usable height.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    Some(round_to(weight_kg / (meters * meters), 2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl std::fmt::Display for BmiClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal weight",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        };
        write!(f, "{}", s)
    }
}

pub fn classify_bmi(bmi: f64) -> BmiClass {
    if bmi < 18.5 {
        BmiClass::Underweight
    } else if bmi < 25.0 {
        BmiClass::Normal
    } else if bmi < 30.0 {
        BmiClass::Overweight
    } else {
        BmiClass::Obese
    }
}

/// Lorentz ideal weight, rounded to one decimal.
pub fn ideal_weight(height_cm: f64, gender: Option<Gender>) -> f64 {
    let divisor = match gender {
        Some(Gender::Male) => 4.0,
        _ => 2.5,
    };
    round_to(height_cm - 100.0 - (height_cm - 150.0) / divisor, 1)
}

/// Share of logged sessions per type, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub session_type: SessionType,
    pub count: usize,
    pub percentage: f64,
}

pub fn session_type_distribution(logs: &[SessionLog]) -> Vec<TypeShare> {
    let counts = logs.iter().map(|l| l.session_type).counts();
    logs.iter()
        .map(|l| l.session_type)
        .unique()
        .map(|session_type| {
            let count = counts.get(&session_type).copied().unwrap_or(0);
            TypeShare {
                session_type,
                count,
                percentage: round_to(count as f64 / logs.len() as f64 * 100.0, 1),
            }
        })
        .collect()
}

/// Days of history counted toward the monthly activity goal.
pub const ACTIVITY_WINDOW_DAYS: u64 = 30;

/// Sessions per 30 days expected at each activity level.
pub fn target_sessions(level: Option<ActivityLevel>) -> u32 {
    match level {
        Some(ActivityLevel::Sedentary) => 8,
        Some(ActivityLevel::Light) => 12,
        Some(ActivityLevel::Moderate) => 16,
        Some(ActivityLevel::High) => 20,
        None => 12,
    }
}

/// Percentage of the monthly session target reached, capped at 100.
pub fn activity_goal_progress(sessions: usize, target: u32) -> f64 {
    if target == 0 {
        return 100.0;
    }
    round_to((sessions as f64 / f64::from(target) * 100.0).min(100.0), 1)
}

pub fn weight_to_go(current_kg: f64, target_kg: f64) -> f64 {
    round_to((current_kg - target_kg).abs(), 1)
}

/// Weeks to close the weight gap at 0.5 kg/week when losing and
/// 0.25 kg/week otherwise.
pub fn weeks_to_goal(current_kg: f64, target_kg: f64, goal: Goal) -> u32 {
    let weekly_rate = match goal {
        Goal::Lose => 0.5,
        Goal::Maintain | Goal::Gain => 0.25,
    };
    let weeks = ((current_kg - target_kg).abs() / weekly_rate).ceil();
    if weeks.is_finite() { weeks as u32 } else { 0 }
}

/// Weight and activity targets for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub goal: Goal,
    pub current_weight_kg: f64,
    pub target_weight_kg: f64,
    pub weight_to_go_kg: f64,
    pub estimated_weeks_to_goal: u32,
    pub monthly_sessions: usize,
    pub target_sessions: u32,
    pub activity_progress: f64,
}

impl GoalProgress {
    /// `monthly_sessions` is the number of logs in the last
    /// [`ACTIVITY_WINDOW_DAYS`] days.
    pub fn build(profile: &Profile, monthly_sessions: usize) -> Self {
        let target = target_sessions(profile.activity_level);
        Self {
            goal: profile.goal,
            current_weight_kg: profile.weight_kg,
            target_weight_kg: profile.target_weight_kg,
            weight_to_go_kg: weight_to_go(profile.weight_kg, profile.target_weight_kg),
            estimated_weeks_to_goal: weeks_to_goal(
                profile.weight_kg,
                profile.target_weight_kg,
                profile.goal,
            ),
            monthly_sessions,
            target_sessions: target,
            activity_progress: activity_goal_progress(monthly_sessions, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Week;
    use crate::types::{Focus, Goal, PlanStatus};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(id: &str, day: NaiveDate, status: SessionStatus) -> Session {
        Session {
            id: id.into(),
            date: day,
            day_of_week: day.format("%A").to_string(),
            session_type: SessionType::Mixed,
            duration_minutes: 30,
            status,
            exercises: vec![],
        }
    }

    fn plan_with(weeks: Vec<Week>) -> Plan {
        Plan {
            id: "p1".into(),
            owner_id: "alice".into(),
            name: "Plan".into(),
            description: String::new(),
            goal: Goal::Lose,
            focus: Focus::General,
            duration_weeks: 2,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 15),
            weeks,
            status: PlanStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn log(session_type: SessionType, minutes: u32, kcal: u32) -> SessionLog {
        SessionLog {
            id: "l".into(),
            owner_id: "alice".into(),
            plan_id: None,
            session_id: None,
            date: date(2024, 1, 2),
            session_type,
            duration_minutes: minutes,
            calories_burned: kcal,
            notes: None,
            exercises: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_empty_plan_is_zero() {
        assert_eq!(progress(&plan_with(vec![])), 0.0);
        let empty_weeks = vec![Week { week_number: 1, sessions: vec![] }];
        assert_eq!(progress(&plan_with(empty_weeks)), 0.0);
    }

    #[test]
    fn test_progress_counts_only_completed() {
        let weeks = vec![
            Week {
                week_number: 1,
                sessions: vec![
                    session("a", date(2024, 1, 1), SessionStatus::Completed),
                    session("b", date(2024, 1, 2), SessionStatus::Skipped),
                ],
            },
            Week {
                week_number: 2,
                sessions: vec![
                    session("c", date(2024, 1, 8), SessionStatus::Completed),
                    session("d", date(2024, 1, 9), SessionStatus::Planned),
                ],
            },
        ];
        assert_eq!(progress(&plan_with(weeks)), 50.0);
    }

    #[test]
    fn test_progress_all_completed_is_hundred() {
        let weeks = vec![Week {
            week_number: 1,
            sessions: vec![
                session("a", date(2024, 1, 1), SessionStatus::Completed),
                session("b", date(2024, 1, 2), SessionStatus::Completed),
                session("c", date(2024, 1, 3), SessionStatus::Completed),
            ],
        }];
        assert_eq!(progress(&plan_with(weeks)), 100.0);
    }

    #[test]
    fn test_calorie_estimates() {
        assert_eq!(estimate_calories(80.0, 60, SessionType::Hiit), 60);
        assert_eq!(estimate_calories(80.0, 60, SessionType::Strength), 40);
        assert_eq!(estimate_calories(70.0, 45, SessionType::Cardio), 31);
        assert_eq!(estimate_calories(100.0, 30, SessionType::Mixed), 27);
        assert_eq!(estimate_calories(0.0, 30, SessionType::Mixed), 0);
    }

    #[test]
    fn test_progress_report() {
        let weeks = vec![
            Week {
                week_number: 1,
                sessions: vec![
                    session("a", date(2024, 1, 1), SessionStatus::Completed),
                    session("b", date(2024, 1, 3), SessionStatus::Planned),
                    session("c", date(2024, 1, 5), SessionStatus::Planned),
                ],
            },
            Week {
                week_number: 2,
                sessions: vec![session("d", date(2024, 1, 8), SessionStatus::Planned)],
            },
        ];
        let plan = plan_with(weeks);

        let report = ProgressReport::build(&plan, date(2024, 1, 4));
        assert_eq!(report.progress_percentage, 25.0);
        assert_eq!(report.completed_sessions, 1);
        assert_eq!(report.remaining_sessions, 3);
        assert_eq!(report.current_week, 1);
        assert_eq!(report.estimated_remaining_weeks, 2);
        assert_eq!(report.next_session.unwrap().id, "c");

        let late = ProgressReport::build(&plan, date(2024, 3, 1));
        assert_eq!(late.current_week, 2);
        assert_eq!(late.estimated_remaining_weeks, 0);
        assert!(late.next_session.is_none());

        let early = ProgressReport::build(&plan, date(2023, 12, 1));
        assert_eq!(early.current_week, 1);
    }

    #[test]
    fn test_log_stats() {
        let logs = vec![
            log(SessionType::Cardio, 30, 200),
            log(SessionType::Hiit, 20, 150),
            log(SessionType::Hiit, 40, 300),
            log(SessionType::Cardio, 30, 250),
        ];
        let stats = LogStats::compute(&logs, date(2024, 1, 1), date(2024, 1, 15));
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.total_minutes, 120);
        assert_eq!(stats.total_calories, 900);
        assert_eq!(stats.average_duration, 30.0);
        assert_eq!(stats.sessions_per_week, 2.0);
        // tie between cardio and hiit, cardio was seen first
        assert_eq!(stats.most_common_type, SessionType::Cardio);

        let empty = LogStats::compute(&[], date(2024, 1, 1), date(2024, 1, 2));
        assert_eq!(empty.sessions_per_week, 0.0);
        assert_eq!(empty.most_common_type, SessionType::Mixed);
    }

    #[test]
    fn test_body_metrics() {
        assert_eq!(bmi(70.0, 175.0), Some(22.86));
        assert_eq!(bmi(70.0, 0.0), None);
        assert_eq!(classify_bmi(17.0), BmiClass::Underweight);
        assert_eq!(classify_bmi(22.86), BmiClass::Normal);
        assert_eq!(classify_bmi(27.0), BmiClass::Overweight);
        assert_eq!(classify_bmi(31.0), BmiClass::Obese);
        assert_eq!(ideal_weight(180.0, Some(Gender::Male)), 72.5);
        assert_eq!(ideal_weight(170.0, Some(Gender::Female)), 62.0);
        assert_eq!(ideal_weight(170.0, None), 62.0);
    }

    #[test]
    fn test_type_distribution_in_first_seen_order() {
        let logs = vec![
            log(SessionType::Strength, 30, 0),
            log(SessionType::Cardio, 30, 0),
            log(SessionType::Strength, 45, 0),
        ];
        let shares = session_type_distribution(&logs);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].session_type, SessionType::Strength);
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[0].percentage, 66.7);
        assert_eq!(shares[1].session_type, SessionType::Cardio);
        assert_eq!(shares[1].percentage, 33.3);
        assert!(session_type_distribution(&[]).is_empty());
    }

    #[test]
    fn test_target_sessions_by_activity() {
        assert_eq!(target_sessions(Some(ActivityLevel::Sedentary)), 8);
        assert_eq!(target_sessions(Some(ActivityLevel::Light)), 12);
        assert_eq!(target_sessions(Some(ActivityLevel::Moderate)), 16);
        assert_eq!(target_sessions(Some(ActivityLevel::High)), 20);
        assert_eq!(target_sessions(None), 12);
    }

    #[test]
    fn test_activity_goal_progress_is_capped() {
        assert_eq!(activity_goal_progress(4, 16), 25.0);
        assert_eq!(activity_goal_progress(0, 8), 0.0);
        assert_eq!(activity_goal_progress(30, 20), 100.0);
    }

    #[test]
    fn test_weeks_to_goal_rate_depends_on_goal() {
        assert_eq!(weeks_to_goal(80.0, 75.0, Goal::Lose), 10);
        assert_eq!(weeks_to_goal(70.0, 72.0, Goal::Gain), 8);
        assert_eq!(weeks_to_goal(80.0, 77.3, Goal::Maintain), 11);
        assert_eq!(weeks_to_goal(80.0, 80.0, Goal::Lose), 0);
        assert_eq!(weight_to_go(70.0, 72.5), 2.5);
    }

    #[test]
    fn test_goal_progress_from_profile() {
        let mut profile = Profile::new("alice");
        profile.activity_level = Some(ActivityLevel::Light);
        profile.goal = Goal::Lose;
        profile.weight_kg = 82.0;
        profile.target_weight_kg = 76.0;

        let goal = GoalProgress::build(&profile, 6);
        assert_eq!(goal.weight_to_go_kg, 6.0);
        assert_eq!(goal.estimated_weeks_to_goal, 12);
        assert_eq!(goal.target_sessions, 12);
        assert_eq!(goal.activity_progress, 50.0);
    }
}
