//! Nutrition estimates and saved history entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Confidence, EntryId, HealthScore, UserId, ValidationError};

/// Meal slot a logged entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(ValidationError::InvalidVariant {
                field: "meal type",
                value: s.to_string(),
            }),
        }
    }
}

/// Nutrition facts as estimated by the analysis model for one photograph.
///
/// Macros are grams for the estimated mass, not per-100 g. Confidence zero
/// means the model judged the subject not to be food; the payload is still
/// a successful estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    /// Identified dish or food label.
    pub food_name: String,
    /// Estimated mass in grams.
    pub weight_grams: f64,
    /// Total calories (kcal) for the estimated mass.
    pub calories: f64,
    /// Total carbohydrates (g).
    pub carbs: f64,
    /// Total protein (g).
    pub protein: f64,
    /// Total fat (g).
    pub fat: f64,
    /// Identification confidence, 0-100.
    pub confidence: Confidence,
    /// Healthiness rating, 0-10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<HealthScore>,
    /// Main visible ingredients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    /// Short nutritional observations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
}

/// A saved history entry: an accepted estimate plus ownership and identity.
///
/// Immutable once saved. The whole set for a user may be cleared in bulk,
/// and single entries may be deleted, but an entry is never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Owning user.
    pub user: UserId,
    /// When the entry was logged.
    pub timestamp: DateTime<Utc>,
    /// The accepted nutrition facts.
    #[serde(flatten)]
    pub estimate: NutritionEstimate,
    /// Meal slot, when the user picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<MealType>,
    /// Reference to the source photograph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

/// Manual field overrides applied before an estimate is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroOverrides {
    pub weight_grams: Option<f64>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
}

impl MacroOverrides {
    /// Whether any override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.weight_grams.is_none()
            && self.calories.is_none()
            && self.carbs.is_none()
            && self.protein.is_none()
            && self.fat.is_none()
    }
}

/// An estimate under user review, before it becomes a saved entry.
///
/// The portion multiplier scales the raw estimate's mass and macros first;
/// explicit overrides then replace the scaled value for that field only.
/// An overridden field is never additionally scaled. The draft may hold
/// values that would be invalid to save; validation happens at
/// [`EntryDraft::accept`].
#[derive(Debug, Clone)]
pub struct EntryDraft {
    estimate: NutritionEstimate,
    portion: f64,
    overrides: MacroOverrides,
}

impl EntryDraft {
    /// Starts a draft from a raw model estimate.
    #[must_use]
    pub fn new(estimate: NutritionEstimate) -> Self {
        Self {
            estimate,
            portion: 1.0,
            overrides: MacroOverrides::default(),
        }
    }

    /// Sets the portion multiplier. Non-positive multipliers are ignored.
    #[must_use]
    pub fn portion(mut self, multiplier: f64) -> Self {
        if multiplier > 0.0 {
            self.portion = multiplier;
        }
        self
    }

    /// Applies manual field overrides.
    #[must_use]
    pub fn overrides(mut self, overrides: MacroOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replaces the food label.
    #[must_use]
    pub fn rename(mut self, food_name: impl Into<String>) -> Self {
        self.estimate.food_name = food_name.into();
        self
    }

    /// The facts as they would be saved, after scaling and overrides.
    #[must_use]
    pub fn resolved(&self) -> NutritionEstimate {
        let mut estimate = self.estimate.clone();
        estimate.weight_grams *= self.portion;
        estimate.calories *= self.portion;
        estimate.carbs *= self.portion;
        estimate.protein *= self.portion;
        estimate.fat *= self.portion;

        if let Some(v) = self.overrides.weight_grams {
            estimate.weight_grams = v;
        }
        if let Some(v) = self.overrides.calories {
            estimate.calories = v;
        }
        if let Some(v) = self.overrides.carbs {
            estimate.carbs = v;
        }
        if let Some(v) = self.overrides.protein {
            estimate.protein = v;
        }
        if let Some(v) = self.overrides.fat {
            estimate.fat = v;
        }
        estimate
    }

    /// Finalizes the draft into a saved entry.
    ///
    /// A saved entry must carry a positive estimated mass and positive
    /// calories; a draft still violating either after edits is rejected.
    pub fn accept(
        self,
        id: EntryId,
        user: UserId,
        timestamp: DateTime<Utc>,
        meal: Option<MealType>,
        image_ref: Option<String>,
    ) -> Result<NutritionEntry, ValidationError> {
        let estimate = self.resolved();
        if estimate.food_name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "food name" });
        }
        if estimate.weight_grams <= 0.0 {
            return Err(ValidationError::NonPositiveMass {
                value: estimate.weight_grams,
            });
        }
        if estimate.calories <= 0.0 {
            return Err(ValidationError::NonPositiveCalories {
                value: estimate.calories,
            });
        }
        Ok(NutritionEntry {
            id,
            user,
            timestamp,
            estimate,
            meal,
            image_ref,
        })
    }
}
