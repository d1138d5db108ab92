use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Ctx;
use fittrack::{
    FitError, OutputFmt, PlanService, ProfileSource, SqliteStore, config::Config, db, logging,
    plan::estimate_calories,
};

mod cli;
mod commands;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        match e.downcast_ref::<FitError>() {
            Some(FitError::NotFound { entity, id }) => {
                eprintln!("{} no {} `{}`", "error:".red().bold(), entity, id)
            }
            _ => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load(&Config::default_path()?)?;
    logging::init(cfg.log_level());

    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };

    // Config edits never need the database.
    let cmd = match cli.cmd {
        Commands::Config(cmd) => return commands::config::handle(cmd, fmt),
        other => other,
    };

    let db_path = cfg.db_path();
    tracing::debug!(db = db_path, "opening database");
    let pool = db::open(db_path).await?;

    let ctx = Ctx {
        service: PlanService::new(SqliteStore::new(pool)),
        user: cli.user.unwrap_or_else(|| cfg.user().to_string()),
        fmt,
    };

    match cmd {
        Commands::Profile(cmd) => commands::profile::handle(cmd, &ctx).await?,
        Commands::Exercise(cmd) => commands::exercise::handle(cmd, &ctx).await?,
        Commands::Plan(cmd) => commands::plan::handle(cmd, &ctx).await?,
        Commands::Log(cmd) => commands::log::handle(cmd, &ctx).await?,
        Commands::Calendar { year, month } => commands::calendar::handle(&ctx, year, month).await?,
        Commands::Status => commands::status::handle(&ctx).await?,
        Commands::Calories {
            session_type,
            minutes,
        } => {
            let weight = ctx
                .store()
                .get_profile(&ctx.user)
                .await?
                .map(|p| p.weight_kg)
                .unwrap_or_default();
            if weight <= 0.0 {
                println!(
                    "{} no body weight on file -- set one with `profile set --weight`",
                    "warning:".yellow().bold()
                );
            }
            let kcal = estimate_calories(weight, minutes, session_type);
            fittrack::emit(ctx.fmt, &serde_json::json!({ "calories": kcal }), || {
                println!("~{} kcal for {} min of {}", kcal.to_string().bold(), minutes, session_type)
            });
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
