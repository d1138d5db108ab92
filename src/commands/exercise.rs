use std::{collections::BTreeSet, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use fittrack::{
    ExerciseCatalog, emit,
    models::{CatalogExercise, ExerciseSearch, NewExercise},
    types::{
        ALLOWED_BODY_PARTS, ExerciseImport, best_body_part_suggestion, canonical_body_part,
        canonical_equipment,
    },
};

use super::{Ctx, plain_len};
use crate::cli::ExerciseCmd;

fn unknown_body_part(name: &str, body_part: &str) {
    match best_body_part_suggestion(body_part) {
        Some(sug) => println!(
            "{} `{}` skipped: unknown body part `{}` -- did you mean: `{}`?",
            "warning:".yellow().bold(),
            name,
            body_part,
            sug.green()
        ),
        None => println!(
            "{} `{}` skipped: unknown body part `{}`",
            "warning:".yellow().bold(),
            name,
            body_part
        ),
    }
}

fn allowed_body_parts() -> String {
    let mut allowed: Vec<&str> = ALLOWED_BODY_PARTS.iter().copied().collect();
    allowed.sort_unstable();
    allowed.join(", ")
}

pub async fn handle(cmd: ExerciseCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        ExerciseCmd::Add {
            name,
            body_part,
            equipment,
            target,
            difficulty,
            public,
        } => {
            if name.trim().is_empty() {
                anyhow::bail!("exercise name must not be empty");
            }
            let Some(part) = canonical_body_part(&body_part) else {
                unknown_body_part(&name, &body_part);
                println!("{} {}", "Allowed body parts:".cyan().bold(), allowed_body_parts());
                return Ok(());
            };

            let new = NewExercise {
                name: name.clone(),
                body_part: part,
                equipment: equipment.iter().map(canonical_equipment).collect(),
                target,
                difficulty,
                owner_id: (!public).then(|| ctx.user.clone()),
                is_public: public,
            };

            match ctx.store().add_exercise(&new).await? {
                Some(ex) => println!(
                    "{} Exercise \"{}\" added ({})",
                    "info:".blue().bold(),
                    ex.name,
                    ex.id.dimmed()
                ),
                None => println!(
                    "{} Exercise \"{}\" already exists -- use `ex list` to view all exercises",
                    "warning:".yellow().bold(),
                    name
                ),
            }
        }

        ExerciseCmd::Import { file } => {
            let path = Path::new(&file);
            let toml_str = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Could not read file: `{}`", file))?;

            let import: ExerciseImport = toml::from_str(&toml_str)
                .context("Failed to parse TOML: Expected `[[exercise]] entries`")?;

            if import.exercise.is_empty() {
                println!("{}", "warning: no [[exercise]] entries found".yellow().bold());
                return Ok(());
            }

            let mut inserted = 0;
            let mut skipped = 0;
            let mut unknowns: BTreeSet<String> = BTreeSet::new();

            for ex in import.exercise {
                if ex.name.trim().is_empty() {
                    println!("{} entry without a name skipped", "warning:".yellow().bold());
                    skipped += 1;
                    continue;
                }

                let Some(part) = canonical_body_part(&ex.body_part) else {
                    unknown_body_part(&ex.name, &ex.body_part);
                    skipped += 1;
                    unknowns.insert(ex.body_part);
                    continue;
                };

                let new = NewExercise {
                    name: ex.name.clone(),
                    body_part: part,
                    equipment: ex.equipment.iter().map(canonical_equipment).collect(),
                    target: ex.target,
                    difficulty: ex.difficulty,
                    owner_id: None,
                    is_public: true,
                };

                let added = ctx
                    .store()
                    .add_exercise(&new)
                    .await
                    .with_context(|| format!("DB error inserting `{}`", ex.name))?;

                if added.is_some() {
                    inserted += 1;
                    println!("{} `{}`", "ok:".green().bold(), ex.name);
                } else {
                    skipped += 1;
                    println!("{} `{}` (already exists)", "info:".blue().bold(), ex.name);
                }
            }

            println!(
                "\n{} {} inserted, {} skipped",
                "Summary:".cyan().bold(),
                inserted,
                skipped
            );

            if !unknowns.is_empty() {
                let bad = unknowns.into_iter().collect::<Vec<_>>().join(", ");
                println!();
                println!("{} {}", "Unknown body parts:".yellow().bold(), bad);
                println!("{} {}", "Allowed body parts:".cyan().bold(), allowed_body_parts());
            }
        }

        ExerciseCmd::List {
            body_part,
            equipment,
            name,
        } => {
            let filter = ExerciseSearch {
                visible_to: Some(ctx.user.clone()),
                name,
                body_part,
                equipment: equipment.map(canonical_equipment),
            };
            let exercises = ctx.store().search_exercises(&filter).await?;

            emit(ctx.fmt, &exercises, || print_exercises(&exercises));
        }

        ExerciseCmd::Delete { exercise } => {
            let found = resolve(ctx, &exercise).await?;
            let Some(ex) = found else {
                println!("{} no such exercise `{}`", "error:".red().bold(), exercise);
                return Ok(());
            };

            let owner = if ex.is_public { None } else { Some(ctx.user.as_str()) };
            if ctx.store().delete_exercise(&ex.id, owner).await? {
                println!("{} deleted exercise `{}`", "ok:".green().bold(), ex.name);
            } else {
                println!(
                    "{} `{}` belongs to another user",
                    "error:".red().bold(),
                    ex.name
                );
            }
        }
    }

    Ok(())
}

/// Look an exercise up by id first, then by exact name among visible ones.
async fn resolve(ctx: &Ctx, key: &str) -> Result<Option<CatalogExercise>> {
    if let Some(ex) = ctx.store().get_exercise(key).await? {
        return Ok(Some(ex));
    }
    let visible = ctx
        .store()
        .search_exercises(&ExerciseSearch::visible_to(ctx.user.clone()))
        .await?;
    Ok(visible.into_iter().find(|e| e.name.eq_ignore_ascii_case(key)))
}

fn print_exercises(exercises: &[CatalogExercise]) {
    println!("{}", "Exercises:".cyan().bold());

    if exercises.is_empty() {
        println!("{}", "  (no exercises found)".dimmed());
        return;
    }

    let mut left = Vec::<String>::new();
    let mut right = Vec::<String>::new();

    for ex in exercises {
        let part = ex.body_part.as_deref().unwrap_or("?");
        let scope = if ex.is_public { "" } else { " (private)" };
        left.push(format!(
            " • {} ({}){}",
            ex.name.bold(),
            part.yellow(),
            scope.dimmed()
        ));

        let equipment = if ex.equipment.is_empty() {
            "bodyweight".to_string()
        } else {
            ex.equipment.join(", ")
        };
        right.push(format!("{} {}", equipment, ex.id.dimmed()));
    }

    let printable_pad = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);

    for (l, r) in left.into_iter().zip(right) {
        let extra_hidden = l.len() - plain_len(&l);
        let total_pad = printable_pad + extra_hidden;
        println!("{:<total_pad$} {} {}", l, "|".blue(), r, total_pad = total_pad);
    }
}
