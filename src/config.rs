use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logging;

pub const CONFIG_ENV: &str = "FITTRACK_CONFIG";
pub const DEFAULT_DB_PATH: &str = "./fittrack.db";
pub const DEFAULT_USER: &str = "me";

pub const KEY_DB_PATH: &str = "db.path";
pub const KEY_USER: &str = "user";
pub const KEY_LOG_LEVEL: &str = "log.level";

/// Keys the application reads, with the value used when unset.
pub const KNOWN_KEYS: [(&str, &str); 3] = [
    (KEY_DB_PATH, DEFAULT_DB_PATH),
    (KEY_USER, DEFAULT_USER),
    (KEY_LOG_LEVEL, logging::DEFAULT_LEVEL),
];

pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.iter().any(|(k, _)| *k == key)
}

/// Reject values the application could not use. Unknown keys pass.
pub fn validate_entry(key: &str, val: &str) -> Result<()> {
    match key {
        KEY_DB_PATH | KEY_USER if val.trim().is_empty() => bail!("`{}` must not be empty", key),
        KEY_LOG_LEVEL => {
            EnvFilter::try_new(val).with_context(|| format!("`{}` is not a valid log filter", val))?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// One row of `config list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub is_default: bool,
}

/// Flat `key = "value"` settings file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// `$FITTRACK_CONFIG`, else `<config dir>/fittrack/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|d| d.join("fittrack").join("config.toml"))
            .context("Could not determine config directory")
    }

    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config `{}`", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config `{}`", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create `{}`", parent.display()))?;
        }
        let raw = toml::to_string(self).context("Could not encode config")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Could not write config `{}`", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    /// The stored value, or the built-in default for a known key.
    pub fn get_or_default(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            KNOWN_KEYS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, default)| *default)
        })
    }

    pub fn set(&mut self, key: &str, val: &str) -> Result<()> {
        validate_entry(key, val)?;
        self.map.insert(key.to_string(), val.to_string());
        Ok(())
    }

    /// Known keys with their effective values, then any extra stored keys.
    pub fn entries(&self) -> Vec<Entry> {
        let known = KNOWN_KEYS.iter().map(|(key, default)| match self.get(key) {
            Some(val) => Entry {
                key: key.to_string(),
                value: val.to_string(),
                is_default: false,
            },
            None => Entry {
                key: key.to_string(),
                value: default.to_string(),
                is_default: true,
            },
        });
        let extra = self
            .map
            .iter()
            .filter(|(k, _)| !is_known_key(k))
            .map(|(k, v)| Entry {
                key: k.clone(),
                value: v.clone(),
                is_default: false,
            });
        known.chain(extra).collect()
    }

    pub fn db_path(&self) -> &str {
        self.get(KEY_DB_PATH).unwrap_or(DEFAULT_DB_PATH)
    }

    pub fn user(&self) -> &str {
        self.get(KEY_USER).unwrap_or(DEFAULT_USER)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.get(KEY_LOG_LEVEL)
    }
}
