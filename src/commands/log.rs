use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use colored::Colorize;

use fittrack::{
    SessionLogStore, emit,
    models::{NewExerciseLog, NewSessionLog, SessionLog},
    plan::LogStats,
    utils::{format_minutes, parse_date},
};

use super::{Ctx, plan::find_session_id, short_id};
use crate::cli::LogCmd;

fn print_logs(logs: &[SessionLog]) {
    println!("{}", "Session logs:".cyan().bold());
    if logs.is_empty() {
        println!("{}", "  (no sessions logged)".dimmed());
        return;
    }

    for log in logs {
        println!(
            " • {} {:<8} {:>6} {:>5} kcal  {}",
            log.date.to_string().green(),
            log.session_type.to_string().bold(),
            format_minutes(u64::from(log.duration_minutes)),
            log.calories_burned,
            short_id(&log.id).dimmed()
        );
        for ex in &log.exercises {
            let mark = if ex.completed { "✓".green() } else { "✗".red() };
            println!("     {} {} ({} sets)", mark, ex.exercise_name, ex.sets.len());
        }
        if let Some(notes) = log.notes.as_deref().filter(|n| !n.is_empty()) {
            println!("     {}", notes.dimmed());
        }
    }
}

pub fn print_stats(stats: &LogStats) {
    println!(
        "{} {} → {}",
        "Training stats:".cyan().bold(),
        stats.from,
        stats.to
    );
    println!("  {:<18} {}", "sessions", stats.total_sessions);
    println!(
        "  {:<18} {}",
        "time",
        format_minutes(stats.total_minutes)
    );
    println!("  {:<18} {} kcal", "calories", stats.total_calories);
    println!("  {:<18} {:.0} min", "avg duration", stats.average_duration);
    println!("  {:<18} {:.1}", "sessions/week", stats.sessions_per_week);
    println!(
        "  {:<18} {}",
        "most common",
        stats.most_common_type.to_string().yellow()
    );
}

pub async fn handle(cmd: LogCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        LogCmd::Add {
            session_type,
            minutes,
            calories,
            plan,
            session,
            date,
            notes,
            exercise,
        } => {
            let date = date.as_deref().map(parse_date).transpose()?;

            let new = NewSessionLog {
                plan_id: plan.clone(),
                session_id: None,
                date,
                session_type,
                duration_minutes: minutes,
                calories_burned: calories,
                notes,
                exercises: exercise
                    .into_iter()
                    .map(|id| NewExerciseLog {
                        exercise_id: id,
                        sets: Vec::new(),
                        completed: true,
                    })
                    .collect(),
            };

            // A plan session reference pins the log to that plan and completes it.
            let log = match session {
                Some(key) => {
                    let current = ctx.plan_or_active(plan.as_deref()).await?;
                    let sid = find_session_id(&current, &key)?;
                    let (log, _) = ctx
                        .service
                        .log_plan_session(&ctx.user, &current.id, &sid, new)
                        .await?;
                    log
                }
                None => ctx.service.log_session(&ctx.user, new).await?,
            };

            emit(ctx.fmt, &log, || {
                println!(
                    "{} logged {} {} session, {} kcal ({})",
                    "ok:".green().bold(),
                    format_minutes(u64::from(log.duration_minutes)),
                    log.session_type,
                    log.calories_burned,
                    short_id(&log.id).dimmed()
                );
                if log.session_id.is_some() {
                    println!("{} plan session marked completed", "info:".blue().bold());
                }
            });
        }

        LogCmd::List { from, to, plan } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let logs = match plan {
                Some(key) => {
                    let owned = ctx.service.owned_plan(&ctx.user, &key).await?;
                    let logs = ctx.store().list_logs_for_plan(&owned.id).await?;
                    within(logs, from, to)
                }
                None => ctx.store().list_logs(&ctx.user, from, to).await?,
            };
            emit(ctx.fmt, &logs, || print_logs(&logs));
        }

        LogCmd::Stats { weeks } => {
            let to = Local::now().date_naive();
            let from = to
                .checked_sub_days(Days::new(u64::from(weeks.max(1)) * 7))
                .unwrap_or(to);
            let stats = ctx.service.log_stats(&ctx.user, from, to).await?;
            emit(ctx.fmt, &stats, || print_stats(&stats));
        }

        LogCmd::Delete { id } => {
            let target = resolve_log_id(ctx, &id).await?;
            ctx.service.delete_log(&ctx.user, &target).await?;
            println!("{} deleted log {}", "ok:".green().bold(), short_id(&target));
        }
    }

    Ok(())
}

fn within(logs: Vec<SessionLog>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<SessionLog> {
    logs.into_iter()
        .filter(|l| from.is_none_or(|f| l.date >= f) && to.is_none_or(|t| l.date <= t))
        .collect()
}

/// Accept the short id printed by `log list` as well as the full one.
async fn resolve_log_id(ctx: &Ctx, key: &str) -> Result<String> {
    if ctx.store().get_log(key).await?.is_some() {
        return Ok(key.to_string());
    }
    let logs = ctx.store().list_logs(&ctx.user, None, None).await?;
    let matches: Vec<&SessionLog> = logs.iter().filter(|l| l.id.starts_with(key)).collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Ok(key.to_string()),
        _ => anyhow::bail!("log prefix `{}` is ambiguous", key),
    }
}
