use clap::{Parser, Subcommand};

use fittrack::types::{ActivityLevel, Focus, Gender, Goal, SessionType};

#[derive(Parser)]
#[command(name = "fittrack", version, about = "Training plans and workout tracking")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Act as this user instead of the configured one.
    #[arg(global = true, long, short)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Physical profile and preferences
    #[command(subcommand, visible_alias = "pr")]
    Profile(ProfileCmd),

    /// Exercise catalog management
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Training plan management
    #[command(subcommand, visible_alias = "p")]
    Plan(PlanCmd),

    /// Record and review performed workouts
    #[command(subcommand, visible_alias = "l")]
    Log(LogCmd),

    /// Estimate calories burned for a workout
    Calories {
        #[arg(short = 't', long = "type", value_parser = str::parse::<SessionType>)]
        session_type: SessionType,

        /// Duration in minutes
        #[arg(short, long)]
        minutes: u32,
    },

    /// Show the active plan in a calendar view
    #[command(visible_alias = "cal")]
    Calendar {
        /// Year to show (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Show profile, active plan and recent activity at a glance
    Status,

    /// View or edit fittrack config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand)]
pub enum ProfileCmd {
    /// Create or update the profile; omitted fields keep their value
    #[command(visible_alias = "s")]
    Set {
        /// sedentary, light, moderate or high (Portuguese names accepted)
        #[arg(short, long, value_parser = str::parse::<ActivityLevel>)]
        activity: Option<ActivityLevel>,

        /// lose, maintain or gain
        #[arg(short, long, value_parser = str::parse::<Goal>)]
        goal: Option<Goal>,

        /// Body weight in kg
        #[arg(short, long)]
        weight: Option<f64>,

        /// Target weight in kg
        #[arg(short, long)]
        target: Option<f64>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        #[arg(long, value_enum)]
        gender: Option<Gender>,

        /// Available equipment tag (repeatable); replaces the current list
        #[arg(short, long = "equipment")]
        equipment: Vec<String>,

        /// Forget all equipment (bodyweight only)
        #[arg(long, conflicts_with = "equipment")]
        no_equipment: bool,
    },

    /// Show the profile with body metrics
    #[command(visible_alias = "i")]
    Show,
}

#[derive(Debug, Subcommand)]
pub enum ExerciseCmd {
    /// Add a custom exercise
    #[command(visible_alias = "a")]
    Add {
        /// Exercise name
        name: String,

        /// Body part (e.g. chest, cardio, upper legs)
        #[arg(short, long)]
        body_part: String,

        /// Required equipment tag (repeatable)
        #[arg(short, long)]
        equipment: Vec<String>,

        /// Target muscle
        #[arg(short, long)]
        target: Option<String>,

        #[arg(short, long)]
        difficulty: Option<String>,

        /// Make the exercise visible to every user
        #[arg(long)]
        public: bool,
    },

    /// Import public exercises from a TOML file
    #[command(visible_alias = "i")]
    Import {
        /// Path to TOML file
        file: String,
    },

    /// List exercises visible to the user
    #[command(visible_alias = "ls")]
    List {
        /// Filter by body part
        #[arg(short, long)]
        body_part: Option<String>,

        /// Filter by equipment tag
        #[arg(short, long)]
        equipment: Option<String>,

        /// Filter by name fragment
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete an exercise
    #[command(visible_alias = "d")]
    Delete {
        /// Exercise id or exact name
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCmd {
    /// Generate a plan and make it the active one
    #[command(visible_alias = "g")]
    Generate {
        name: String,

        #[arg(short, long)]
        desc: Option<String>,

        #[arg(short, long, value_parser = str::parse::<Goal>)]
        goal: Option<Goal>,

        /// general, cardio, strength or hiit; anything else is general
        #[arg(short, long, value_parser = str::parse::<Focus>, default_value = "general")]
        focus: Focus,

        /// Plan length in weeks
        #[arg(short, long, default_value = "4")]
        weeks: u32,

        /// First day (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,

        /// Print the plan without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List plans
    #[command(visible_alias = "ls")]
    List,

    /// Show a plan in detail (defaults to the active plan)
    #[command(visible_alias = "s")]
    Show { plan: Option<String> },

    /// Rebuild the exercises of one week
    #[command(visible_alias = "r")]
    Regen {
        /// 1-based week number
        week: u32,

        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Mark a session completed
    #[command(visible_alias = "c")]
    Complete {
        session: String,

        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Mark a session skipped
    Skip {
        session: String,

        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Progress report (defaults to the active plan)
    #[command(visible_alias = "pg")]
    Progress { plan: Option<String> },

    /// Cancel a plan
    Cancel { plan: String },

    /// Delete a plan
    #[command(visible_alias = "d")]
    Delete { plan: String },
}

#[derive(Subcommand)]
pub enum LogCmd {
    /// Record a performed workout
    #[command(visible_alias = "a")]
    Add {
        #[arg(
            short = 't',
            long = "type",
            value_parser = str::parse::<SessionType>,
            default_value = "mixed"
        )]
        session_type: SessionType,

        /// Duration in minutes
        #[arg(short, long)]
        minutes: u32,

        /// Calories burned (estimated when omitted)
        #[arg(short, long)]
        calories: Option<i64>,

        #[arg(short, long)]
        plan: Option<String>,

        /// Plan session this workout fulfils; marks it completed
        #[arg(short, long)]
        session: Option<String>,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Catalog exercise id performed (repeatable)
        #[arg(short, long = "exercise")]
        exercise: Vec<String>,
    },

    /// List logged workouts
    #[command(visible_alias = "ls")]
    List {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Only workouts logged against this plan
        #[arg(short, long)]
        plan: Option<String>,
    },

    /// Totals over the last N weeks
    Stats {
        #[arg(short, long, default_value = "4")]
        weeks: u32,
    },

    /// Delete a log entry
    #[command(visible_alias = "d")]
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
