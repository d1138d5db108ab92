use anyhow::{Result, bail};
use chrono::Local;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use fittrack::{
    PlanStore, emit,
    models::{Plan, PlanRequest, Session},
    plan::ProgressReport,
    types::{PlanStatus, SessionStatus},
    utils::{format_minutes, parse_date, progress_bar},
};

use super::{Ctx, plain_len, short_id};
use crate::cli::PlanCmd;

#[derive(Serialize)]
struct PlanSummary {
    id: String,
    name: String,
    status: PlanStatus,
    focus: String,
    duration_weeks: u32,
    start_date: String,
    end_date: String,
    completed_sessions: usize,
    total_sessions: usize,
    progress_percentage: f64,
}

impl From<&Plan> for PlanSummary {
    fn from(p: &Plan) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            status: p.status,
            focus: p.focus.to_string(),
            duration_weeks: p.duration_weeks,
            start_date: p.start_date.to_string(),
            end_date: p.end_date.to_string(),
            completed_sessions: p.completed_sessions(),
            total_sessions: p.total_sessions(),
            progress_percentage: fittrack::plan::progress(p),
        }
    }
}

fn status_label(status: SessionStatus) -> ColoredString {
    match status {
        SessionStatus::Planned => "planned".dimmed(),
        SessionStatus::Completed => "done".green().bold(),
        SessionStatus::Skipped => "skipped".yellow(),
    }
}

fn plan_status_label(status: PlanStatus) -> ColoredString {
    match status {
        PlanStatus::Active => "active".green().bold(),
        PlanStatus::Completed => "completed".blue(),
        PlanStatus::Cancelled => "cancelled".red(),
    }
}

/// Resolve a session by full id or unique id prefix.
pub fn find_session_id(plan: &Plan, key: &str) -> Result<String> {
    let matches: Vec<&Session> = plan.sessions().filter(|s| s.id.starts_with(key)).collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => bail!("no session `{}` in plan `{}`", key, plan.name),
        _ => bail!("session prefix `{}` is ambiguous", key),
    }
}

pub fn print_plan(plan: &Plan) {
    println!(
        "{} {} [{}]",
        "Plan:".cyan().bold(),
        plan.name.bold(),
        plan_status_label(plan.status)
    );
    if !plan.description.is_empty() {
        println!("  {}", plan.description.dimmed());
    }
    println!(
        "  {} → {} | goal {} | focus {} | {}",
        plan.start_date,
        plan.end_date,
        plan.goal.to_string().yellow(),
        plan.focus.to_string().yellow(),
        plan.id.dimmed()
    );

    for week in &plan.weeks {
        println!();
        println!("{}", format!("Week {}", week.week_number).cyan().bold());

        for (i, session) in week.sessions.iter().enumerate() {
            let last = i + 1 == week.sessions.len();
            let connector = if last { "└─" } else { "├─" };
            let rail = if last { "   " } else { "│  " };

            println!(
                " {} {} {:<9} {:<8} {:>6} {} {}",
                connector,
                session.date,
                session.day_of_week,
                session.session_type.to_string().bold(),
                format_minutes(u64::from(session.duration_minutes)),
                status_label(session.status),
                short_id(&session.id).dimmed()
            );

            if session.exercises.is_empty() {
                println!(" {}   {}", rail, "(no eligible exercises)".dimmed());
                continue;
            }

            let lines: Vec<String> = session
                .exercises
                .iter()
                .map(|ex| format!(" {}   • {}", rail, ex.exercise_name))
                .collect();
            let pad = lines.iter().map(|l| plain_len(l)).max().unwrap_or(0);

            for (line, ex) in lines.iter().zip(&session.exercises) {
                println!(
                    "{:<pad$} {} {}×{} rest {}s",
                    line,
                    "|".blue(),
                    ex.sets,
                    ex.reps,
                    ex.rest_seconds,
                    pad = pad
                );
            }
        }
    }
}

fn print_plan_list(plans: &[PlanSummary]) {
    println!("{}", "Plans:".cyan().bold());
    if plans.is_empty() {
        println!("{}", "  (no plans found)".dimmed());
        return;
    }

    let name_w = plans.iter().map(|p| p.name.len()).max().unwrap_or(4);
    for p in plans {
        println!(
            " • {:<name_w$}  {:<10} {} {:>5.1}%  {} → {}  {}",
            p.name.bold(),
            p.status.to_string(),
            progress_bar(p.progress_percentage, 10),
            p.progress_percentage,
            p.start_date,
            p.end_date,
            p.id.dimmed(),
            name_w = name_w
        );
    }
}

pub fn print_progress(plan: &Plan, report: &ProgressReport) {
    println!("{} {}", "Progress:".cyan().bold(), plan.name.bold());
    println!(
        "  {} {:.1}%  ({}/{} sessions, {} remaining)",
        progress_bar(report.progress_percentage, 20),
        report.progress_percentage,
        report.completed_sessions,
        report.total_sessions,
        report.remaining_sessions
    );
    println!(
        "  week {} of {} | ~{} week(s) left | ends {}",
        report.current_week, plan.duration_weeks, report.estimated_remaining_weeks, report.end_date
    );
    match &report.next_session {
        Some(s) => println!(
            "  {} {} {} ({}, {})",
            "next:".green().bold(),
            s.date,
            s.day_of_week,
            s.session_type,
            format_minutes(u64::from(s.duration_minutes))
        ),
        None => println!("  {}", "no planned sessions ahead".dimmed()),
    }
}

pub async fn handle(cmd: PlanCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        PlanCmd::Generate {
            name,
            desc,
            goal,
            focus,
            weeks,
            start,
            dry_run,
        } => {
            let start_date = start.as_deref().map(parse_date).transpose()?;
            let profile_goal = match goal {
                Some(g) => g,
                None => ctx.service.profile(&ctx.user).await?.goal,
            };

            let request = PlanRequest {
                description: desc.unwrap_or_default(),
                goal: profile_goal,
                focus,
                duration_weeks: weeks,
                start_date,
                ..PlanRequest::new(name)
            };

            let plan = if dry_run {
                ctx.service.generate_plan(&ctx.user, &request).await?
            } else {
                ctx.service.activate_new_plan(&ctx.user, &request).await?
            };

            emit(ctx.fmt, &plan, || {
                print_plan(&plan);
                if !dry_run {
                    println!();
                    println!(
                        "{} plan `{}` is now active ({} sessions)",
                        "ok:".green().bold(),
                        plan.name,
                        plan.total_sessions()
                    );
                }
            });
        }

        PlanCmd::List => {
            let plans = ctx.store().list_plans(&ctx.user).await?;
            let rows: Vec<PlanSummary> = plans.iter().map(PlanSummary::from).collect();
            emit(ctx.fmt, &rows, || print_plan_list(&rows));
        }

        PlanCmd::Show { plan } => {
            let plan = ctx.plan_or_active(plan.as_deref()).await?;
            emit(ctx.fmt, &plan, || print_plan(&plan));
        }

        PlanCmd::Regen { week, plan } => {
            let current = ctx.plan_or_active(plan.as_deref()).await?;
            check_week(&current, week)?;

            let updated = ctx
                .service
                .regenerate_and_save(&ctx.user, &current.id, week)
                .await?;

            emit(ctx.fmt, &updated, || {
                println!("{} regenerated week {} of `{}`", "ok:".green().bold(), week, updated.name);
            });
        }

        PlanCmd::Complete { session, plan } => {
            set_status(ctx, plan.as_deref(), &session, SessionStatus::Completed).await?;
        }

        PlanCmd::Skip { session, plan } => {
            set_status(ctx, plan.as_deref(), &session, SessionStatus::Skipped).await?;
        }

        PlanCmd::Progress { plan } => {
            let plan = ctx.plan_or_active(plan.as_deref()).await?;
            let report = ctx
                .service
                .progress_report(&ctx.user, &plan.id, Local::now().date_naive())
                .await?;
            emit(ctx.fmt, &report, || print_progress(&plan, &report));
        }

        PlanCmd::Cancel { plan } => {
            let cancelled = ctx.service.cancel_plan(&ctx.user, &plan).await?;
            println!("{} cancelled plan `{}`", "ok:".green().bold(), cancelled.name);
        }

        PlanCmd::Delete { plan } => {
            ctx.service.delete_plan(&ctx.user, &plan).await?;
            println!("{} deleted plan `{}`", "ok:".green().bold(), plan);
        }
    }

    Ok(())
}

fn check_week(plan: &Plan, week: u32) -> Result<()> {
    if week == 0 || week > plan.duration_weeks {
        bail!("week must be between 1 and {}, got {}", plan.duration_weeks, week);
    }
    Ok(())
}

async fn set_status(ctx: &Ctx, plan: Option<&str>, session: &str, status: SessionStatus) -> Result<()> {
    let current = ctx.plan_or_active(plan).await?;
    let session_id = find_session_id(&current, session)?;
    let updated = ctx
        .service
        .set_session_status(&ctx.user, &current.id, &session_id, status)
        .await?;

    println!(
        "{} session {} marked {} ({:.1}% of `{}` done)",
        "ok:".green().bold(),
        short_id(&session_id),
        status,
        fittrack::plan::progress(&updated),
        updated.name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use fittrack::models::Week;
    use fittrack::types::{Focus, Goal, SessionType};

    fn session(id: &str) -> Session {
        Session {
            id: id.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            day_of_week: "Monday".into(),
            session_type: SessionType::Mixed,
            duration_minutes: 30,
            status: SessionStatus::Planned,
            exercises: vec![],
        }
    }

    fn plan() -> Plan {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Plan {
            id: "plan-1".into(),
            owner_id: "me".into(),
            name: "Test".into(),
            description: String::new(),
            goal: Goal::Maintain,
            focus: Focus::General,
            duration_weeks: 1,
            start_date: start,
            end_date: start,
            weeks: vec![Week {
                week_number: 1,
                sessions: vec![session("abc12345-1"), session("abd12345-2")],
            }],
            status: PlanStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_week_bounds() {
        let p = plan();
        assert!(check_week(&p, 1).is_ok());
        let err = check_week(&p, 2).unwrap_err();
        assert!(err.to_string().contains("between 1 and 1"));
        assert!(check_week(&p, 0).is_err());
    }

    #[test]
    fn test_find_session_by_prefix() {
        let p = plan();
        assert_eq!(find_session_id(&p, "abc").unwrap(), "abc12345-1");
        assert_eq!(find_session_id(&p, "abd12345-2").unwrap(), "abd12345-2");
        assert!(find_session_id(&p, "ab").is_err());
        assert!(find_session_id(&p, "zzz").is_err());
    }
}
