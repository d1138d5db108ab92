use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

use fittrack::{
    ProfileSource, emit,
    models::Profile,
    plan::metrics::{BmiClass, bmi, classify_bmi, ideal_weight},
    types::canonical_equipment,
};

use super::Ctx;
use crate::cli::ProfileCmd;

#[derive(Serialize)]
struct ProfileView<'a> {
    #[serde(flatten)]
    profile: &'a Profile,
    bmi: Option<f64>,
    bmi_class: Option<BmiClass>,
    ideal_weight_kg: Option<f64>,
}

pub async fn handle(cmd: ProfileCmd, ctx: &Ctx) -> Result<()> {
    match cmd {
        ProfileCmd::Set {
            activity,
            goal,
            weight,
            target,
            height,
            gender,
            equipment,
            no_equipment,
        } => {
            let mut profile = ctx
                .store()
                .get_profile(&ctx.user)
                .await?
                .unwrap_or_else(|| Profile::new(&ctx.user));

            for (label, value) in [("weight", weight), ("target", target), ("height", height)] {
                if value.is_some_and(|v| v <= 0.0) {
                    bail!("{label} must be positive");
                }
            }

            if let Some(level) = activity {
                profile.activity_level = Some(level);
            }
            if let Some(goal) = goal {
                profile.goal = goal;
            }
            if let Some(w) = weight {
                profile.weight_kg = w;
            }
            if let Some(t) = target {
                profile.target_weight_kg = t;
            }
            if height.is_some() {
                profile.height_cm = height;
            }
            if gender.is_some() {
                profile.gender = gender;
            }
            if no_equipment {
                profile.equipment.clear();
            } else if !equipment.is_empty() {
                let mut tags: Vec<String> = equipment.iter().map(canonical_equipment).collect();
                tags.sort();
                tags.dedup();
                profile.equipment = tags;
            }

            ctx.store().upsert_profile(&profile).await?;
            println!("{} profile saved for `{}`", "ok:".green().bold(), ctx.user);
        }

        ProfileCmd::Show => {
            let Some(profile) = ctx.store().get_profile(&ctx.user).await? else {
                println!(
                    "{} no profile for `{}` -- create one with `profile set`",
                    "warning:".yellow().bold(),
                    ctx.user
                );
                return Ok(());
            };

            let bmi = profile.height_cm.and_then(|h| bmi(profile.weight_kg, h));
            let view = ProfileView {
                profile: &profile,
                bmi,
                bmi_class: bmi.map(classify_bmi),
                ideal_weight_kg: profile.height_cm.map(|h| ideal_weight(h, profile.gender)),
            };

            emit(ctx.fmt, &view, || print_profile(&view));
        }
    }

    Ok(())
}

fn print_profile(view: &ProfileView) {
    let p = view.profile;
    println!("{} {}", "Profile:".cyan().bold(), p.owner_id.bold());

    let activity = p
        .activity_level
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown".into());
    println!("  {:<12} {}", "activity", activity.yellow());
    println!("  {:<12} {}", "goal", p.goal.to_string().yellow());
    println!("  {:<12} {:.1} kg", "weight", p.weight_kg);
    println!("  {:<12} {:.1} kg", "target", p.target_weight_kg);
    if let Some(h) = p.height_cm {
        println!("  {:<12} {:.0} cm", "height", h);
    }
    if let Some(g) = p.gender {
        println!("  {:<12} {}", "gender", g.code());
    }

    let equipment = if p.equipment.is_empty() {
        "bodyweight only".dimmed().to_string()
    } else {
        p.equipment.join(", ")
    };
    println!("  {:<12} {}", "equipment", equipment);

    if let (Some(bmi), Some(class)) = (view.bmi, view.bmi_class) {
        println!();
        println!("  {:<12} {:.2} ({})", "BMI", bmi, class.to_string().green());
    }
    if let Some(ideal) = view.ideal_weight_kg {
        println!("  {:<12} {:.1} kg", "ideal", ideal);
    }
}
