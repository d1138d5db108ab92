use std::collections::{BTreeMap, HashSet};

use anyhow::{Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use colored::Colorize;
use serde::Serialize;

use fittrack::{
    PlanStore, SessionLogStore, emit,
    models::Session,
    types::{SessionStatus, SessionType},
    utils::format_minutes,
};

use super::Ctx;

#[derive(Serialize)]
struct CalendarDay {
    date: NaiveDate,
    sessions: Vec<Session>,
    logged: bool,
}

/// First and last day of the month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

fn resolve_month(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        bail!("month must be between 1 and 12, got {}", month);
    }
    match month_bounds(year, month) {
        Some(bounds) => Ok(bounds),
        None => bail!("invalid month {year}-{month:02}"),
    }
}

pub async fn handle(ctx: &Ctx, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let now = Local::now();
    let (first_day, last_day) =
        resolve_month(year.unwrap_or(now.year()), month.unwrap_or(now.month()))?;

    let plan = ctx.store().get_active_plan(&ctx.user).await?;
    let logs = ctx
        .store()
        .list_logs(&ctx.user, Some(first_day), Some(last_day))
        .await?;
    let logged: HashSet<NaiveDate> = logs.iter().map(|l| l.date).collect();

    let mut days: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();
    if let Some(plan) = &plan {
        for s in plan.sessions() {
            if (first_day..=last_day).contains(&s.date) {
                days.entry(s.date)
                    .or_insert_with(|| CalendarDay {
                        date: s.date,
                        sessions: Vec::new(),
                        logged: logged.contains(&s.date),
                    })
                    .sessions
                    .push(s.clone());
            }
        }
    }
    for date in &logged {
        days.entry(*date).or_insert_with(|| CalendarDay {
            date: *date,
            sessions: Vec::new(),
            logged: true,
        });
    }

    let entries: Vec<CalendarDay> = days.into_values().collect();
    emit(ctx.fmt, &entries, || {
        print_month(first_day, last_day, &entries);
        if let Some(plan) = &plan {
            println!("{} {}", "Active plan:".cyan().bold(), plan.name.bold());
        }
    });

    Ok(())
}

fn print_month(first_day: NaiveDate, last_day: NaiveDate, entries: &[CalendarDay]) {
    let month_name = first_day.format("%B %Y").to_string();
    println!("\n{}", month_name.bold().cyan());
    println!("{}", "Su Mo Tu We Th Fr Sa".dimmed());

    let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
    print!("{}", "   ".repeat(first_weekday));

    let by_day: BTreeMap<u32, &CalendarDay> = entries.iter().map(|d| (d.date.day(), d)).collect();

    for day in 1..=last_day.day() {
        let label = format!("{:2}", day);
        match by_day.get(&day) {
            Some(entry) if entry.sessions.iter().any(|s| s.status == SessionStatus::Completed) || entry.logged => {
                print!("{} ", label.green().bold())
            }
            Some(entry) if entry.sessions.iter().all(|s| s.status == SessionStatus::Skipped) => {
                print!("{} ", label.yellow())
            }
            Some(_) => print!("{} ", label.cyan()),
            None => print!("{} ", label),
        }

        if (first_weekday + day as usize) % 7 == 0 {
            println!();
        }
    }
    println!("\n");

    if entries.iter().all(|e| e.sessions.is_empty()) {
        return;
    }

    println!("{}", "Sessions:".bold().cyan());
    for entry in entries {
        for s in &entry.sessions {
            let status = match s.status {
                SessionStatus::Completed => "done".green(),
                SessionStatus::Skipped => "skipped".yellow(),
                SessionStatus::Planned => "planned".dimmed(),
            };
            let kind = match s.session_type {
                SessionType::Hiit => s.session_type.to_string().red(),
                _ => s.session_type.to_string().normal(),
            };
            println!(
                "  {} {} ({}) {}",
                s.date.format("%a %b %d").to_string().green(),
                kind.bold(),
                format_minutes(u64::from(s.duration_minutes)),
                status
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, dec_last) = month_bounds(2023, 12).unwrap();
        assert_eq!(dec_last, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn test_resolve_month_rejects_out_of_range() {
        assert!(resolve_month(2024, 6).is_ok());
        let err = resolve_month(2024, 13).unwrap_err();
        assert!(err.to_string().contains("between 1 and 12"));
        assert!(resolve_month(2024, 0).is_err());
    }
}
