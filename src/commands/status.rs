use anyhow::Result;
use chrono::{Datelike, Days, Local, NaiveDate};
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use fittrack::{
    ProfileSource, SessionLogStore, emit,
    models::SessionLog,
    plan::{
        GoalProgress, LogStats, ProgressReport, TypeShare, metrics::ACTIVITY_WINDOW_DAYS,
        session_type_distribution,
    },
    utils::{format_minutes, progress_bar},
};

use super::{Ctx, log::print_stats, plan::print_progress};

const WEEKS: u64 = 8;
const BAR_WIDTH: u64 = 30;

#[derive(Serialize)]
struct WeekTotal {
    week_start: NaiveDate,
    minutes: u64,
    sessions: usize,
}

#[derive(Serialize)]
struct Status {
    user: String,
    plan: Option<ProgressReport>,
    goals: GoalProgress,
    stats: LogStats,
    types: Vec<TypeShare>,
    weekly: Vec<WeekTotal>,
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Minutes and session counts per Monday-based week, oldest first, with
/// empty weeks filled in.
fn weekly_totals(logs: &[SessionLog], first_week: NaiveDate, weeks: u64) -> Vec<WeekTotal> {
    let grouped = logs
        .iter()
        .map(|l| (week_start(l.date), l))
        .into_group_map();

    (0..weeks)
        .filter_map(|i| first_week.checked_add_days(Days::new(i * 7)))
        .map(|start| {
            let logs = grouped.get(&start).map(Vec::as_slice).unwrap_or_default();
            WeekTotal {
                week_start: start,
                minutes: logs.iter().map(|l| u64::from(l.duration_minutes)).sum(),
                sessions: logs.len(),
            }
        })
        .collect()
}

fn print_goals(goals: &GoalProgress) {
    println!("{}", "Goals:".cyan().bold());
    println!(
        "  {:<18} {:.1} kg to {} ({:.1} → {:.1} kg, ~{} weeks)",
        "weight",
        goals.weight_to_go_kg,
        goals.goal.to_string().yellow(),
        goals.current_weight_kg,
        goals.target_weight_kg,
        goals.estimated_weeks_to_goal
    );
    println!(
        "  {:<18} {} {}/{} sessions in {} days",
        "activity",
        progress_bar(goals.activity_progress, 20),
        goals.monthly_sessions,
        goals.target_sessions,
        ACTIVITY_WINDOW_DAYS
    );
}

fn print_types(types: &[TypeShare]) {
    if types.is_empty() {
        return;
    }
    println!("{}", "Session types:".cyan().bold());
    for share in types {
        println!(
            "  {:<18} {:>3} ({:.1}%)",
            share.session_type.to_string(),
            share.count,
            share.percentage
        );
    }
}

fn print_weekly(weekly: &[WeekTotal]) {
    let max = weekly.iter().map(|w| w.minutes).max().unwrap_or(0);
    println!("{}", "Weekly volume:".cyan().bold());
    for w in weekly {
        let len = if max == 0 { 0 } else { w.minutes * BAR_WIDTH / max };
        println!(
            "  {} {} {} ({} sessions)",
            w.week_start.format("%b %d"),
            "█".repeat(len as usize).green(),
            format_minutes(w.minutes),
            w.sessions
        );
    }
}

pub async fn handle(ctx: &Ctx) -> Result<()> {
    let today = Local::now().date_naive();

    let Some(profile) = ctx.store().get_profile(&ctx.user).await? else {
        println!(
            "{} no profile for `{}` -- start with `profile set`",
            "warning:".yellow().bold(),
            ctx.user
        );
        return Ok(());
    };

    let plan = match ctx.service.active_plan(&ctx.user).await {
        Ok(plan) => Some(plan),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };
    let report = match &plan {
        Some(p) => Some(ctx.service.progress_report(&ctx.user, &p.id, today).await?),
        None => None,
    };

    let first_week = week_start(today)
        .checked_sub_days(Days::new((WEEKS - 1) * 7))
        .unwrap_or(today);
    let logs = ctx
        .store()
        .list_logs(&ctx.user, Some(first_week), Some(today))
        .await?;

    let month_start = today
        .checked_sub_days(Days::new(ACTIVITY_WINDOW_DAYS - 1))
        .unwrap_or(today);
    let monthly_sessions = logs.iter().filter(|l| l.date >= month_start).count();

    let status = Status {
        user: ctx.user.clone(),
        goals: GoalProgress::build(&profile, monthly_sessions),
        stats: LogStats::compute(&logs, first_week, today),
        types: session_type_distribution(&logs),
        weekly: weekly_totals(&logs, first_week, WEEKS),
        plan: report,
    };

    emit(ctx.fmt, &status, || {
        let activity = profile
            .activity_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".into());
        println!(
            "{} {} ({}, goal {}, {:.1} kg)",
            "Status for".cyan().bold(),
            status.user.bold(),
            activity.yellow(),
            profile.goal.to_string().yellow(),
            profile.weight_kg
        );
        println!();

        match (&plan, &status.plan) {
            (Some(plan), Some(report)) => print_progress(plan, report),
            _ => println!("{} no active plan -- try `plan generate`", "info:".blue().bold()),
        }
        println!();
        print_goals(&status.goals);
        println!();
        print_stats(&status.stats);
        print_types(&status.types);
        println!();
        print_weekly(&status.weekly);
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fittrack::types::SessionType;

    fn log(date: NaiveDate, minutes: u32) -> SessionLog {
        SessionLog {
            id: format!("log-{date}"),
            owner_id: "me".into(),
            plan_id: None,
            session_id: None,
            date,
            session_type: SessionType::Strength,
            duration_minutes: minutes,
            calories_burned: 100,
            notes: None,
            exercises: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-04 is a Thursday.
        let thursday = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        assert_eq!(week_start(thursday), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn test_weekly_totals_fill_gaps() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let logs = vec![log(d(2), 30), log(d(3), 45), log(d(17), 60)];

        let weekly = weekly_totals(&logs, d(1), 3);
        let minutes: Vec<u64> = weekly.iter().map(|w| w.minutes).collect();
        assert_eq!(minutes, vec![75, 0, 60]);
        assert_eq!(weekly[0].sessions, 2);
        assert_eq!(weekly[2].week_start, d(15));
    }
}
