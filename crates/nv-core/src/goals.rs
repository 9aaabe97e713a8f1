//! Daily calorie and macro target derivation.
//!
//! Targets are a pure function of body weight and training objective.
//! Calories scale linearly with weight by an objective-specific factor;
//! protein and fat are fixed per-kg allowances, and carbohydrates absorb
//! the remaining calorie budget with a 50 g floor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Fallback body weight when the profile has none recorded.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Minimum carbohydrate target in grams.
///
/// Without this floor, a low calorie factor combined with the fixed
/// protein/fat allowances can drive the carbohydrate remainder negative
/// for light users. The clamp is intentional, not an error path.
pub const CARBS_FLOOR_G: u32 = 50;

/// The user's primary training objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingObjective {
    /// Muscle growth; calorie surplus.
    #[default]
    Hypertrophy,
    /// Calorie deficit.
    WeightLoss,
    /// Slight surplus.
    Strength,
    /// Maintenance-level intake.
    Endurance,
}

impl TrainingObjective {
    /// Calories per kilogram of body weight for this objective.
    #[must_use]
    pub const fn calorie_factor(self) -> f64 {
        match self {
            Self::WeightLoss => 24.0,
            Self::Endurance => 28.0,
            Self::Strength => 30.0,
            Self::Hypertrophy => 32.0,
        }
    }

    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hypertrophy => "hypertrophy",
            Self::WeightLoss => "weight_loss",
            Self::Strength => "strength",
            Self::Endurance => "endurance",
        }
    }
}

impl fmt::Display for TrainingObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrainingObjective {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hypertrophy" => Ok(Self::Hypertrophy),
            "weight_loss" => Ok(Self::WeightLoss),
            "strength" => Ok(Self::Strength),
            "endurance" => Ok(Self::Endurance),
            _ => Err(ValidationError::InvalidVariant {
                field: "training objective",
                value: s.to_string(),
            }),
        }
    }
}

/// Daily calorie and macronutrient targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSet {
    /// Daily calorie target (kcal).
    pub calories: u32,
    /// Daily protein target (g).
    pub protein_g: u32,
    /// Daily carbohydrate target (g).
    pub carbs_g: u32,
    /// Daily fat target (g).
    pub fat_g: u32,
}

impl Default for GoalSet {
    /// Targets applied until the onboarding wizard computes real ones.
    fn default() -> Self {
        Self {
            calories: 2000,
            protein_g: 140,
            carbs_g: 220,
            fat_g: 65,
        }
    }
}

/// Derives daily targets from body weight and training objective.
///
/// Deterministic: same inputs always yield the same targets. Callers are
/// responsible for substituting [`DEFAULT_WEIGHT_KG`] for missing or
/// non-positive weight before invoking (see [`effective_weight`]).
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "values are rounded and floored non-negative before the cast"
)]
pub fn compute_goals(weight_kg: f64, objective: TrainingObjective) -> GoalSet {
    let calories = (weight_kg * objective.calorie_factor()).round();
    let protein_g = (weight_kg * 2.0).round();
    let fat_g = (weight_kg * 0.9).round();
    let carbs_raw = ((calories - protein_g * 4.0 - fat_g * 9.0) / 4.0).round();
    let carbs_g = carbs_raw.max(f64::from(CARBS_FLOOR_G));

    GoalSet {
        calories: calories as u32,
        protein_g: protein_g as u32,
        carbs_g: carbs_g as u32,
        fat_g: fat_g as u32,
    }
}

/// Resolves the weight to feed [`compute_goals`].
///
/// Missing or non-positive recorded weight falls back to
/// [`DEFAULT_WEIGHT_KG`].
#[must_use]
pub fn effective_weight(weight_kg: Option<f64>) -> f64 {
    match weight_kg {
        Some(w) if w > 0.0 => w,
        _ => DEFAULT_WEIGHT_KG,
    }
}
