use once_cell::sync::Lazy;
use std::{collections::HashSet, fmt::Display, str::FromStr};
use strsim::jaro_winkler;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Ordinal activity tier driving volume, duration and rest heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[value(alias = "sedentario")]
    #[serde(alias = "sedentario")]
    Sedentary,
    #[value(alias = "leve")]
    #[serde(alias = "leve")]
    Light,
    #[value(alias = "moderado")]
    #[serde(alias = "moderado")]
    Moderate,
    #[value(alias = "alto")]
    #[serde(alias = "alto")]
    High,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = FitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" | "sedentario" | "sedentário" => Ok(Self::Sedentary),
            "light" | "leve" => Ok(Self::Light),
            "moderate" | "moderado" => Ok(Self::Moderate),
            "high" | "alto" => Ok(Self::High),
            other => Err(FitError::validation(format!("unknown activity level `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    #[value(alias = "perder")]
    #[serde(alias = "perder")]
    Lose,
    #[value(alias = "manter")]
    #[serde(alias = "manter")]
    Maintain,
    #[value(alias = "ganhar")]
    #[serde(alias = "ganhar")]
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lose => "lose",
            Self::Maintain => "maintain",
            Self::Gain => "gain",
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Goal {
    type Err = FitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lose" | "perder" => Ok(Self::Lose),
            "maintain" | "manter" => Ok(Self::Maintain),
            "gain" | "ganhar" => Ok(Self::Gain),
            other => Err(FitError::validation(format!("unknown goal `{other}`"))),
        }
    }
}

/// Plan-level thematic bias used to assign session types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    #[default]
    #[value(alias = "geral")]
    #[serde(alias = "geral")]
    General,
    Cardio,
    #[value(alias = "forca")]
    #[serde(alias = "força", alias = "forca")]
    Strength,
    Hiit,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Cardio => "cardio",
            Self::Strength => "strength",
            Self::Hiit => "hiit",
        }
    }
}

impl Display for Focus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Focus {
    type Err = FitError;

    /// Anything that is not a recognised specific focus is general.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "cardio" => Self::Cardio,
            "strength" | "força" | "forca" => Self::Strength,
            "hiit" => Self::Hiit,
            _ => Self::General,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Cardio,
    Strength,
    Hiit,
    #[default]
    Mixed,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardio => "cardio",
            Self::Strength => "strength",
            Self::Hiit => "hiit",
            Self::Mixed => "mixed",
        }
    }
}

impl Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = FitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cardio" => Ok(Self::Cardio),
            "strength" => Ok(Self::Strength),
            "hiit" => Ok(Self::Hiit),
            "mixed" => Ok(Self::Mixed),
            other => Err(FitError::validation(format!("unknown session type `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Planned,
    Completed,
    Skipped,
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = FitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(FitError::validation(format!("unknown plan status `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Gender {
    #[value(name = "m", alias = "male")]
    #[serde(rename = "M")]
    Male,
    #[value(name = "f", alias = "female")]
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" | "m" => Some(Self::Male),
            "F" | "f" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Body-part tag reserved for conditioning work.
pub const CARDIO_BODY_PART: &str = "cardio";

pub static ALLOWED_BODY_PARTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "back",
        "cardio",
        "chest",
        "lower arms",
        "lower legs",
        "neck",
        "shoulders",
        "upper arms",
        "upper legs",
        "waist",
    ])
});

/// Returns the canonical lowercase body part or `None` if not allowed.
pub fn canonical_body_part<S: AsRef<str>>(b: S) -> Option<String> {
    let b = b.as_ref().trim().to_ascii_lowercase();
    if ALLOWED_BODY_PARTS.contains(b.as_str()) {
        Some(b)
    } else {
        None
    }
}

/// Return the closest allowed body part for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn best_body_part_suggestion(input: &str) -> Option<&'static str> {
    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() {
        return None;
    }

    let mut scores: Vec<(&'static str, f64)> = ALLOWED_BODY_PARTS
        .iter()
        .copied()
        .map(|b| (b, jaro_winkler(&inp, b)))
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

/// Equipment tags are free-form but compared lowercased and trimmed.
pub fn canonical_equipment<S: AsRef<str>>(tag: S) -> String {
    tag.as_ref().trim().to_lowercase()
}

#[derive(Deserialize)]
pub struct ExerciseDef {
    pub name: String,
    pub body_part: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub target: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Deserialize)]
pub struct ExerciseImport {
    pub exercise: Vec<ExerciseDef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Print `value` as JSON, or hand over to `pretty` for colorful text.
pub fn emit<T: Serialize, F: FnOnce()>(fmt: OutputFmt, value: &T, pretty: F) {
    match fmt {
        OutputFmt::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("failed to encode json: {e}"),
        },
        OutputFmt::Text => pretty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_level_aliases() {
        assert_eq!("moderado".parse::<ActivityLevel>().unwrap(), ActivityLevel::Moderate);
        assert_eq!("HIGH".parse::<ActivityLevel>().unwrap(), ActivityLevel::High);
        assert_eq!("sedentario".parse::<ActivityLevel>().unwrap(), ActivityLevel::Sedentary);
        assert!("athlete".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_activity_level_is_ordinal() {
        assert!(ActivityLevel::Sedentary < ActivityLevel::Light);
        assert!(ActivityLevel::Light < ActivityLevel::Moderate);
        assert!(ActivityLevel::Moderate < ActivityLevel::High);
    }

    #[test]
    fn test_focus_falls_back_to_general() {
        assert_eq!("geral".parse::<Focus>().unwrap(), Focus::General);
        assert_eq!("força".parse::<Focus>().unwrap(), Focus::Strength);
        assert_eq!("yoga".parse::<Focus>().unwrap(), Focus::General);
    }

    #[test]
    fn test_serde_accepts_legacy_values() {
        let level: ActivityLevel = serde_json::from_str("\"leve\"").unwrap();
        assert_eq!(level, ActivityLevel::Light);
        let goal: Goal = serde_json::from_str("\"ganhar\"").unwrap();
        assert_eq!(goal, Goal::Gain);
        assert_eq!(serde_json::to_string(&Focus::Hiit).unwrap(), "\"hiit\"");
    }

    #[test]
    fn test_body_part_canonical_and_suggestion() {
        assert_eq!(canonical_body_part(" Chest "), Some("chest".to_string()));
        assert_eq!(canonical_body_part("wings"), None);
        assert_eq!(best_body_part_suggestion("cardoi"), Some("cardio"));
        assert_eq!(best_body_part_suggestion(""), None);
    }
}
