//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// AI-assisted nutrition and workout tracker.
///
/// Photograph a meal and let a multimodal model estimate its nutrition
/// facts; keep a durable history with daily totals against your targets,
/// and generate structured training plans from your profile.
#[derive(Debug, Parser)]
#[command(name = "nv", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this profile instead of the configured one.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create or update your profile and compute daily targets.
    Init(InitArgs),

    /// Analyze a food photograph and optionally log it.
    Analyze(AnalyzeArgs),

    /// Show logged entries, most recent first.
    History {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete a single logged entry by ID.
    Delete {
        /// The entry ID, as shown by `history --json`.
        id: String,
    },

    /// Show today's totals against your targets.
    Today {
        /// Emit JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change daily calorie and macro targets.
    Goals {
        #[command(subcommand)]
        action: GoalsAction,
    },

    /// Generate and track a training plan.
    Workout {
        #[command(subcommand)]
        action: WorkoutAction,
    },

    /// Delete all logged entries for the profile.
    Clear {
        /// Confirm the irreversible deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Delete the profile, its plan, and its entire history.
    Reset {
        /// Confirm the irreversible deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Show store location and tracking summary.
    Status,
}

/// Onboarding arguments.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Body weight in kilograms.
    #[arg(long)]
    pub weight: Option<f64>,

    /// Height in centimeters.
    #[arg(long)]
    pub height: Option<f64>,

    /// Age in years.
    #[arg(long)]
    pub age: Option<u32>,

    /// Biological sex (male|female).
    #[arg(long)]
    pub sex: Option<String>,

    /// Training objective (hypertrophy|weight_loss|strength|endurance).
    #[arg(long, default_value = "hypertrophy")]
    pub objective: String,

    /// Experience tier (beginner|intermediate|advanced).
    #[arg(long, default_value = "beginner")]
    pub experience: String,

    /// Weekly training frequency (2-6).
    #[arg(long, default_value_t = 3)]
    pub days_per_week: u8,
}

/// Food photograph analysis arguments.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Path to the food photograph (jpeg, png, webp, or gif).
    pub image: PathBuf,

    /// Portion multiplier applied to the estimate before overrides.
    #[arg(long, default_value_t = 1.0)]
    pub portion: f64,

    /// Replace the identified food label.
    #[arg(long)]
    pub food_name: Option<String>,

    /// Override the estimated mass (grams).
    #[arg(long)]
    pub weight_grams: Option<f64>,

    /// Override total calories (kcal).
    #[arg(long)]
    pub calories: Option<f64>,

    /// Override total carbohydrates (g).
    #[arg(long)]
    pub carbs: Option<f64>,

    /// Override total protein (g).
    #[arg(long)]
    pub protein: Option<f64>,

    /// Override total fat (g).
    #[arg(long)]
    pub fat: Option<f64>,

    /// Meal slot (breakfast|lunch|dinner|snack).
    #[arg(long)]
    pub meal: Option<String>,

    /// Save the reviewed entry to the history.
    #[arg(long)]
    pub save: bool,
}

/// Goal management subcommands.
#[derive(Debug, Subcommand)]
pub enum GoalsAction {
    /// Derive targets from body weight and objective.
    Compute {
        /// Body weight in kilograms; falls back to the profile, then 70.
        #[arg(long)]
        weight: Option<f64>,

        /// Objective to compute for; falls back to the profile's.
        #[arg(long)]
        objective: Option<String>,

        /// Persist the computed targets to the profile.
        #[arg(long)]
        save: bool,
    },

    /// Manually override daily targets.
    ///
    /// Values are numeric strings; anything unparseable is coerced to 0.
    Set {
        #[arg(long)]
        calories: Option<String>,
        #[arg(long)]
        protein: Option<String>,
        #[arg(long)]
        carbs: Option<String>,
        #[arg(long)]
        fat: Option<String>,
    },

    /// Show the current targets.
    Show {
        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Workout plan subcommands.
#[derive(Debug, Subcommand)]
pub enum WorkoutAction {
    /// Generate a new plan from the profile.
    ///
    /// Replaces any existing plan and resets completion progress.
    Generate,

    /// Show the active plan with completion progress.
    Show {
        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Toggle one exercise's finished mark.
    Toggle {
        /// Zero-based day index into the plan.
        day: usize,

        /// Zero-based exercise index within the day.
        exercise: usize,
    },
}
