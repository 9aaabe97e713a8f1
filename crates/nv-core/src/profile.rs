//! User profiles and the load-time normalization migration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goals::{GoalSet, TrainingObjective};
use crate::types::{UserId, ValidationError};

/// Default weekly training frequency.
pub const DEFAULT_DAYS_PER_WEEK: u8 = 3;

/// Valid range for weekly training frequency.
pub const DAYS_PER_WEEK_RANGE: std::ops::RangeInclusive<u8> = 2..=6;

/// Biological sex, used only to contextualize plan generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

impl BiologicalSex {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for BiologicalSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BiologicalSex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(ValidationError::InvalidVariant {
                field: "biological sex",
                value: s.to_string(),
            }),
        }
    }
}

/// Training experience tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceTier {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExperienceTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ValidationError::InvalidVariant {
                field: "experience tier",
                value: s.to_string(),
            }),
        }
    }
}

/// A fully-normalized user profile.
///
/// After [`normalize_profile`] every field the goal and plan flows depend on
/// is present; only body metrics stay optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,

    // Body metrics; optional, defaults applied at the point of use
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<BiologicalSex>,

    pub objective: TrainingObjective,
    pub experience: ExperienceTier,
    /// Weekly training frequency, clamped to 2-6.
    pub days_per_week: u8,

    /// Daily targets; defaults until the onboarding computation runs.
    pub goals: GoalSet,
}

/// A profile as loaded from storage, before defaults are applied.
///
/// Rows written by older builds may lack the objective, experience,
/// frequency, or goal fields entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub objective: Option<String>,
    pub experience: Option<String>,
    pub days_per_week: Option<u8>,
    pub goals: Option<GoalSet>,
}

/// Fills missing or unrecognized profile fields with their defaults.
///
/// This is the single migration point for shape drift in stored profiles:
/// objective falls back to hypertrophy, experience to beginner, frequency
/// to 3 (clamped into 2-6), goals to the stock 2000/140/220/65 targets.
/// Unknown enum strings are treated the same as absent values.
pub fn normalize_profile(raw: RawProfile) -> Result<UserProfile, ValidationError> {
    let id = UserId::new(raw.id)?;
    if raw.objective.is_none() || raw.goals.is_none() {
        tracing::debug!(user = %id, "profile missing fields, applying defaults");
    }
    let objective = raw
        .objective
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let experience = raw
        .experience
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let sex = raw.sex.as_deref().and_then(|s| s.parse().ok());
    let days_per_week = raw
        .days_per_week
        .unwrap_or(DEFAULT_DAYS_PER_WEEK)
        .clamp(*DAYS_PER_WEEK_RANGE.start(), *DAYS_PER_WEEK_RANGE.end());

    Ok(UserProfile {
        id,
        name: raw.name,
        created_at: raw.created_at.unwrap_or_default(),
        weight_kg: raw.weight_kg.filter(|w| *w > 0.0),
        height_cm: raw.height_cm.filter(|h| *h > 0.0),
        age: raw.age,
        sex,
        objective,
        experience,
        days_per_week,
        goals: raw.goals.unwrap_or_default(),
    })
}
