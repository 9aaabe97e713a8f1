//! Core domain logic for the nutrition ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Goal derivation: daily calorie/macro targets from body weight and objective
//! - Aggregation: today's totals, the weekly activity mask, plan completion
//! - Profile normalization: filling stored profiles' missing fields at load
//!
//! Everything here is pure computation: no I/O, no clock reads. The current
//! time is always an explicit parameter.

pub mod aggregate;
pub mod entry;
pub mod goals;
pub mod plan;
pub mod profile;
pub mod types;

pub use aggregate::{DayProgress, DayTotals, plan_progress, today_totals, weekly_activity};
pub use entry::{EntryDraft, MacroOverrides, MealType, NutritionEntry, NutritionEstimate};
pub use goals::{
    DEFAULT_WEIGHT_KG, GoalSet, TrainingObjective, compute_goals, effective_weight,
};
pub use plan::{CompletionState, Exercise, WorkoutDay, WorkoutPlan};
pub use profile::{
    BiologicalSex, ExperienceTier, RawProfile, UserProfile, normalize_profile,
};
pub use types::{Confidence, EntryId, HealthScore, UserId, ValidationError};
