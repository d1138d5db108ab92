use anyhow::Result;
use colored::Colorize;

use fittrack::{
    OutputFmt, emit,
    config::{self, Config},
};

use crate::cli::ConfigCmd;

fn warn_if_unknown(key: &str) {
    if !config::is_known_key(key) {
        let known: Vec<&str> = config::KNOWN_KEYS.iter().map(|(k, _)| *k).collect();
        println!(
            "{} `{}` is not read by fittrack (known keys: {})",
            "warning:".yellow().bold(),
            key,
            known.join(", ")
        );
    }
}

pub fn handle(cmd: ConfigCmd, fmt: OutputFmt) -> Result<()> {
    let config_path = Config::default_path()?;
    let mut cfg = Config::load(&config_path)?;

    match cmd {
        ConfigCmd::List => {
            let entries = cfg.entries();
            emit(fmt, &entries, || {
                println!("{} {}", "Config:".cyan().bold(), config_path.display().to_string().dimmed());
                for e in &entries {
                    let marker = if e.is_default { " (default)".dimmed() } else { "".normal() };
                    println!("  {} = {}{}", e.key.green(), e.value, marker);
                }
            });
        }

        ConfigCmd::Get { key } => match cfg.get_or_default(&key) {
            Some(val) => println!("{}", val),
            None => anyhow::bail!("key `{}` not found", key),
        },

        ConfigCmd::Set { key, val } => {
            cfg.set(&key, &val)?;
            cfg.save(&config_path)?;
            tracing::debug!(key = %key, path = %config_path.display(), "config updated");
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
            warn_if_unknown(&key);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(&config_path)?;
                match cfg.get_or_default(&key) {
                    Some(default) => println!(
                        "{} removed `{}`, back to default `{}`",
                        "info:".blue().bold(),
                        key.green(),
                        default
                    ),
                    None => println!("{} removed `{}`", "info:".blue().bold(), key.green()),
                }
            } else {
                println!("{} key `{}` not set", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
