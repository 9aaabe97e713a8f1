//! Workout plans and per-exercise completion state.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prescribed exercise.
///
/// Sets, reps, and rest are display strings as produced by the generator
/// (e.g. "4", "8-12", "60s"); the core never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub rest: String,
    /// Short execution cue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

/// One training day within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDay {
    /// Day label (e.g. "Day A - Chest").
    pub label: String,
    /// Muscle group or session focus.
    #[serde(default)]
    pub focus: String,
    /// Ordered exercise prescription.
    pub exercises: Vec<Exercise>,
}

/// A generated multi-day training plan.
///
/// A user owns at most one active plan; generating a new plan replaces the
/// old one, and `generated_at` distinguishes successive generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub days: Vec<WorkoutDay>,
    /// When this plan generation was produced.
    pub generated_at: DateTime<Utc>,
}

/// Finished-exercise marks for the active plan generation.
///
/// Pairs are `(day_index, exercise_index)` into the plan's ordered days and
/// exercises. Indices are only meaningful against the plan they were
/// recorded for, so the set must be cleared whenever the plan is replaced;
/// the storage layer enforces that atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionState(BTreeSet<(usize, usize)>);

impl CompletionState {
    /// An empty completion set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Builds a set from stored pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Flips membership of the pair; returns the new state.
    pub fn toggle(&mut self, day_index: usize, exercise_index: usize) -> bool {
        let key = (day_index, exercise_index);
        if self.0.remove(&key) {
            false
        } else {
            self.0.insert(key);
            true
        }
    }

    /// Whether the exercise is marked finished.
    #[must_use]
    pub fn contains(&self, day_index: usize, exercise_index: usize) -> bool {
        self.0.contains(&(day_index, exercise_index))
    }

    /// Number of finished exercises in the given day.
    #[must_use]
    pub fn completed_in_day(&self, day_index: usize) -> usize {
        self.0.iter().filter(|(day, _)| *day == day_index).count()
    }

    /// Total number of marks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no exercise is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the marked pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied()
    }
}
