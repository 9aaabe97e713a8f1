//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The confidence value was out of range.
    #[error("confidence must be between 0 and 100, got {value}")]
    ConfidenceOutOfRange { value: f32 },

    /// The health score was out of range.
    #[error("health score must be between 0 and 10, got {value}")]
    HealthScoreOutOfRange { value: f32 },

    /// The estimated mass was not strictly positive.
    #[error("estimated mass must be positive, got {value} g")]
    NonPositiveMass { value: f64 },

    /// A saved entry must carry calories.
    #[error("entry calories must be positive, got {value}")]
    NonPositiveCalories { value: f64 },

    /// Invalid enum string form.
    #[error("invalid {field}: {value}")]
    InvalidVariant { field: &'static str, value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// User IDs must be non-empty strings. All history entries and the active
    /// workout plan are keyed by the owning user ID.
    UserId, "user ID"
);

define_string_id!(
    /// A validated nutrition entry identifier.
    ///
    /// Entry IDs must be non-empty strings. They should be unique within the
    /// system, though uniqueness is enforced at the database level.
    EntryId, "entry ID"
);

/// A confidence score in the range \[0, 100\].
///
/// Reported by the analysis model for a food identification. A confidence of
/// zero is the model's way of flagging a non-food image; it is still a
/// successful payload, not an error. Values are clamped during
/// deserialization to be lenient with external data.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f32);

impl Confidence {
    /// The maximum confidence value (100).
    pub const MAX: Self = Self(100.0);

    /// The minimum confidence value (0).
    pub const MIN: Self = Self(0.0);

    /// Creates a new confidence value after validation.
    ///
    /// Returns an error if the value is outside \[0, 100\] or is NaN.
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping to \[0, 100\].
    ///
    /// NaN values become 0. Values outside the range are clamped.
    #[must_use]
    pub const fn clamped(value: f32) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value > 100.0 {
            Self(100.0)
        } else {
            Self(value)
        }
    }

    /// Returns the inner f32 value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Whether the model flagged the subject as not food.
    #[must_use]
    pub fn is_non_food(self) -> bool {
        self.0 <= 0.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}", self.0)
    }
}

impl TryFrom<f32> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl Serialize for Confidence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        // Clamp on deserialization to be lenient with external data
        Ok(Self::clamped(value))
    }
}

/// A health score in the range \[0, 10\], 10 being the healthiest.
///
/// Clamped during deserialization like [`Confidence`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HealthScore(f32);

impl HealthScore {
    /// Creates a new health score after validation.
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=10.0).contains(&value) {
            return Err(ValidationError::HealthScoreOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Creates a health score, clamping to \[0, 10\]. NaN becomes 0.
    #[must_use]
    pub const fn clamped(value: f32) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value > 10.0 {
            Self(10.0)
        } else {
            Self(value)
        }
    }

    /// Returns the inner f32 value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl Serialize for HealthScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HealthScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Ok(Self::clamped(value))
    }
}
