//! Derived aggregates over the entry ledger.
//!
//! Everything here is a pure recomputation from the full entry list plus an
//! explicit "now". The current time is always a parameter, never an
//! ambient clock read, so identical inputs always produce identical
//! aggregates. Calendar-day math uses the offset carried by `now`, which
//! callers take from the device's local timezone.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};

use crate::entry::NutritionEntry;
use crate::goals::GoalSet;
use crate::plan::{CompletionState, WorkoutPlan};

/// Number of weekday slots in the activity mask.
pub const WEEK_SLOTS: usize = 7;

/// Today's consumption totals against the user's targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct DayTotals {
    /// Calories consumed today (kcal).
    pub calories: f64,
    /// Protein consumed today (g).
    pub protein: f64,
    /// Carbohydrates consumed today (g).
    pub carbs: f64,
    /// Fat consumed today (g).
    pub fat: f64,
    /// Calories left before the target, clamped at zero.
    ///
    /// A surplus is not represented as a negative remainder.
    pub remaining: f64,
    /// Number of entries logged today.
    pub meals: usize,
}

/// Completion progress for one plan day.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct DayProgress {
    /// Exercises marked finished.
    pub completed: usize,
    /// Exercises prescribed for the day.
    pub total: usize,
    /// `completed / total`; zero for an empty day.
    pub ratio: f64,
    /// True iff every prescribed exercise is finished and the day is
    /// non-empty. An empty day is never complete.
    pub complete: bool,
}

/// The local calendar date of a timestamp, in `now`'s offset.
fn local_date(timestamp: DateTime<chrono::Utc>, now: DateTime<FixedOffset>) -> NaiveDate {
    timestamp.with_timezone(now.offset()).date_naive()
}

/// Sums today's entries against the goal set.
///
/// "Today" is the midnight-to-midnight calendar day of `now` in `now`'s
/// own offset; entries are compared in that same offset.
#[must_use]
pub fn today_totals(
    entries: &[NutritionEntry],
    goals: &GoalSet,
    now: DateTime<FixedOffset>,
) -> DayTotals {
    let today = now.date_naive();
    let mut totals = DayTotals::default();
    for entry in entries {
        if local_date(entry.timestamp, now) != today {
            continue;
        }
        totals.calories += entry.estimate.calories;
        totals.protein += entry.estimate.protein;
        totals.carbs += entry.estimate.carbs;
        totals.fat += entry.estimate.fat;
        totals.meals += 1;
    }
    totals.remaining = (f64::from(goals.calories) - totals.calories).max(0.0);
    totals
}

/// Weekday activity mask over the trailing seven days.
///
/// Slots are indexed Sunday = 0 through Saturday = 6. A slot is set iff at
/// least one entry's local calendar day falls within the last seven days
/// (today inclusive) and lands on that weekday. Days with no logged entry
/// stay false - today and yesterday get no special treatment.
#[must_use]
pub fn weekly_activity(entries: &[NutritionEntry], now: DateTime<FixedOffset>) -> [bool; WEEK_SLOTS] {
    let today = now.date_naive();
    let window_start = today
        .checked_sub_days(Days::new(WEEK_SLOTS as u64 - 1))
        .unwrap_or(NaiveDate::MIN);

    let mut mask = [false; WEEK_SLOTS];
    for entry in entries {
        let date = local_date(entry.timestamp, now);
        if date < window_start || date > today {
            continue;
        }
        mask[date.weekday().num_days_from_sunday() as usize] = true;
    }
    mask
}

/// Per-day completion progress for the active plan.
///
/// The completion set is assumed to belong to this plan generation; the
/// storage layer guarantees that by clearing marks on plan replacement.
/// Marks pointing past the day's exercise list are ignored rather than
/// counted.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "exercise counts are far below f64 precision limits"
)]
pub fn plan_progress(plan: &WorkoutPlan, completion: &CompletionState) -> Vec<DayProgress> {
    plan.days
        .iter()
        .enumerate()
        .map(|(day_index, day)| {
            let total = day.exercises.len();
            let completed = (0..total)
                .filter(|exercise| completion.contains(day_index, *exercise))
                .count();
            let ratio = if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            };
            DayProgress {
                completed,
                total,
                ratio,
                complete: total > 0 && completed == total,
            }
        })
        .collect()
}
