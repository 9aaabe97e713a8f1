//! Storage layer for the nutrition ledger.
//!
//! Provides persistence for nutrition history entries, user profiles, and
//! the active workout plan with its completion marks, using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization. The
//! application model is a single writer per user session, so no locking is
//! layered on top here.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format (always UTC), so
//! lexicographic ordering matches chronological ordering and values stay
//! human-readable in the database. Structured payloads (plan days,
//! ingredient lists) are stored as JSON TEXT columns.
//!
//! Writes commit before the call returns: an entry is visible to every
//! subsequent read once `insert_entry` succeeds, so aggregates computed
//! right after a save always include it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use nv_core::{
    CompletionState, NutritionEntry, RawProfile, UserId, UserProfile, WorkoutPlan,
    normalize_profile,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The durable store could not be opened.
    #[error("storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {id}: {timestamp}")]
    TimestampParse {
        id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the data model (bad JSON, empty key, ...).
    #[error("invalid row for {id}: {message}")]
    InvalidRow { id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open. Open failures
    /// surface as [`DbError::Unavailable`] so callers can tell a missing or
    /// blocked store apart from a query error.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).map_err(|source| DbError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                weight_kg REAL,
                height_cm REAL,
                age INTEGER,
                sex TEXT,
                objective TEXT,
                experience TEXT,
                days_per_week INTEGER,
                goal_calories INTEGER,
                goal_protein_g INTEGER,
                goal_carbs_g INTEGER,
                goal_fat_g INTEGER
            );

            -- Entries table: append-only nutrition history
            -- timestamp: RFC 3339 format (e.g. '2025-01-15T10:30:00.000Z')
            -- ingredients/insights: JSON arrays of strings
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                food_name TEXT NOT NULL,
                weight_grams REAL NOT NULL,
                calories REAL NOT NULL,
                carbs REAL NOT NULL,
                protein REAL NOT NULL,
                fat REAL NOT NULL,
                confidence REAL NOT NULL,
                health_score REAL,
                meal_type TEXT,
                ingredients TEXT NOT NULL DEFAULT '[]',
                insights TEXT NOT NULL DEFAULT '[]',
                image_ref TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entries_user ON entries(user_id);
            CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp);

            -- At most one active plan per user; days is a JSON array
            CREATE TABLE IF NOT EXISTS plans (
                user_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                generated_at TEXT NOT NULL,
                days TEXT NOT NULL
            );

            -- Completion marks are scoped to the current plan generation
            CREATE TABLE IF NOT EXISTS completions (
                user_id TEXT NOT NULL,
                day_index INTEGER NOT NULL,
                exercise_index INTEGER NOT NULL,
                PRIMARY KEY (user_id, day_index, exercise_index),
                FOREIGN KEY (user_id) REFERENCES plans(user_id) ON DELETE CASCADE
            );
            ",
        )?;
        Ok(())
    }

    /// Appends a nutrition entry, ignoring duplicates by ID.
    ///
    /// Entries are append-only: an existing ID is never overwritten.
    /// Returns whether a row was written. The write is durable once this
    /// returns `Ok`.
    pub fn insert_entry(&mut self, entry: &NutritionEntry) -> Result<bool, DbError> {
        let ingredients = encode_strings(&entry.estimate.ingredients);
        let insights = encode_strings(&entry.estimate.insights);
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO entries
            (id, user_id, timestamp, food_name, weight_grams, calories, carbs, protein, fat,
             confidence, health_score, meal_type, ingredients, insights, image_ref)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                entry.id.as_str(),
                entry.user.as_str(),
                format_timestamp(entry.timestamp),
                entry.estimate.food_name,
                entry.estimate.weight_grams,
                entry.estimate.calories,
                entry.estimate.carbs,
                entry.estimate.protein,
                entry.estimate.fat,
                f64::from(entry.estimate.confidence.value()),
                entry.estimate.health_score.map(|score| f64::from(score.value())),
                entry.meal.map(nv_core::MealType::as_str),
                ingredients,
                insights,
                entry.image_ref,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Lists all entries for a user.
    ///
    /// Storage order is unspecified; display callers sort explicitly
    /// (timestamp descending by convention).
    pub fn list_entries(&self, user: &UserId) -> Result<Vec<NutritionEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, timestamp, food_name, weight_grams, calories, carbs, protein,
                   fat, confidence, health_score, meal_type, ingredients, insights, image_ref
            FROM entries
            WHERE user_id = ?
            ",
        )?;
        let rows = stmt.query_map([user.as_str()], |row| {
            Ok(EntryRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                timestamp: row.get(2)?,
                food_name: row.get(3)?,
                weight_grams: row.get(4)?,
                calories: row.get(5)?,
                carbs: row.get(6)?,
                protein: row.get(7)?,
                fat: row.get(8)?,
                confidence: row.get(9)?,
                health_score: row.get(10)?,
                meal_type: row.get(11)?,
                ingredients: row.get(12)?,
                insights: row.get(13)?,
                image_ref: row.get(14)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(decode_entry(row?)?);
        }
        Ok(entries)
    }

    /// Deletes a single entry by ID. Returns whether a row was removed.
    pub fn delete_entry(&mut self, entry_id: &nv_core::EntryId) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?", [entry_id.as_str()])?;
        Ok(removed > 0)
    }

    /// Removes all entries for a user. Irreversible.
    pub fn clear_entries(&mut self, user: &UserId) -> Result<usize, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE user_id = ?", [user.as_str()])?;
        Ok(removed)
    }

    /// Saves (creates or replaces) a user profile.
    pub fn save_profile(&mut self, profile: &UserProfile) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO profiles
            (user_id, name, created_at, weight_kg, height_cm, age, sex, objective, experience,
             days_per_week, goal_calories, goal_protein_g, goal_carbs_g, goal_fat_g)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                created_at = excluded.created_at,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age = excluded.age,
                sex = excluded.sex,
                objective = excluded.objective,
                experience = excluded.experience,
                days_per_week = excluded.days_per_week,
                goal_calories = excluded.goal_calories,
                goal_protein_g = excluded.goal_protein_g,
                goal_carbs_g = excluded.goal_carbs_g,
                goal_fat_g = excluded.goal_fat_g
            ",
            params![
                profile.id.as_str(),
                profile.name,
                format_timestamp(profile.created_at),
                profile.weight_kg,
                profile.height_cm,
                profile.age,
                profile.sex.map(nv_core::BiologicalSex::as_str),
                profile.objective.as_str(),
                profile.experience.as_str(),
                profile.days_per_week,
                profile.goals.calories,
                profile.goals.protein_g,
                profile.goals.carbs_g,
                profile.goals.fat_g,
            ],
        )?;
        Ok(())
    }

    /// Loads a user profile, normalizing missing fields to their defaults.
    pub fn load_profile(&self, user: &UserId) -> Result<Option<UserProfile>, DbError> {
        let raw = self
            .conn
            .query_row(
                "
                SELECT user_id, name, created_at, weight_kg, height_cm, age, sex, objective,
                       experience, days_per_week, goal_calories, goal_protein_g, goal_carbs_g,
                       goal_fat_g
                FROM profiles
                WHERE user_id = ?
                ",
                [user.as_str()],
                |row| {
                    Ok(ProfileRow {
                        user_id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                        weight_kg: row.get(3)?,
                        height_cm: row.get(4)?,
                        age: row.get(5)?,
                        sex: row.get(6)?,
                        objective: row.get(7)?,
                        experience: row.get(8)?,
                        days_per_week: row.get(9)?,
                        goal_calories: row.get(10)?,
                        goal_protein_g: row.get(11)?,
                        goal_carbs_g: row.get(12)?,
                        goal_fat_g: row.get(13)?,
                    })
                },
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        decode_profile(raw).map(Some)
    }

    /// Replaces the user's active plan and resets completion marks.
    ///
    /// Both happen in one transaction: completion indices are only
    /// meaningful against the plan generation they were recorded for, so a
    /// new plan must never be observable alongside old marks.
    pub fn set_plan(&mut self, user: &UserId, plan: &WorkoutPlan) -> Result<(), DbError> {
        let days = serde_json::to_string(&plan.days).map_err(|err| DbError::InvalidRow {
            id: user.to_string(),
            message: err.to_string(),
        })?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "
            INSERT INTO plans (user_id, title, description, generated_at, days)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                generated_at = excluded.generated_at,
                days = excluded.days
            ",
            params![
                user.as_str(),
                plan.title,
                plan.description,
                format_timestamp(plan.generated_at),
                days,
            ],
        )?;
        tx.execute("DELETE FROM completions WHERE user_id = ?", [user.as_str()])?;
        tx.commit()?;
        tracing::debug!(user = %user, title = %plan.title, "plan replaced, completions reset");
        Ok(())
    }

    /// Loads the user's active plan, if any.
    pub fn active_plan(&self, user: &UserId) -> Result<Option<WorkoutPlan>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT title, description, generated_at, days FROM plans WHERE user_id = ?",
                [user.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((title, description, generated_at, days)) = row else {
            return Ok(None);
        };
        let generated_at = parse_timestamp(&generated_at, user.as_str())?;
        let days = serde_json::from_str(&days).map_err(|err| DbError::InvalidRow {
            id: user.to_string(),
            message: err.to_string(),
        })?;
        Ok(Some(WorkoutPlan {
            title,
            description,
            days,
            generated_at,
        }))
    }

    /// Flips one completion mark; returns the new state (true = finished).
    ///
    /// The mark is durable once this returns `Ok`.
    pub fn toggle_completion(
        &mut self,
        user: &UserId,
        day_index: usize,
        exercise_index: usize,
    ) -> Result<bool, DbError> {
        let day = to_index(day_index);
        let exercise = to_index(exercise_index);
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM completions WHERE user_id = ? AND day_index = ? AND exercise_index = ?",
            params![user.as_str(), day, exercise],
        )?;
        let now_complete = if removed == 0 {
            tx.execute(
                "INSERT INTO completions (user_id, day_index, exercise_index) VALUES (?, ?, ?)",
                params![user.as_str(), day, exercise],
            )?;
            true
        } else {
            false
        };
        tx.commit()?;
        Ok(now_complete)
    }

    /// Loads the user's completion marks.
    pub fn completion_state(&self, user: &UserId) -> Result<CompletionState, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT day_index, exercise_index
            FROM completions
            WHERE user_id = ?
            ORDER BY day_index ASC, exercise_index ASC
            ",
        )?;
        let rows = stmt.query_map([user.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut pairs = Vec::new();
        for row in rows {
            let (day, exercise) = row?;
            pairs.push((from_index(day), from_index(exercise)));
        }
        Ok(CompletionState::from_pairs(pairs))
    }

    /// Account reset: deletes the profile, plan, completion marks, and the
    /// entire entry history for a user in one transaction.
    pub fn reset_account(&mut self, user: &UserId) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM completions WHERE user_id = ?", [user.as_str()])?;
        tx.execute("DELETE FROM plans WHERE user_id = ?", [user.as_str()])?;
        tx.execute("DELETE FROM entries WHERE user_id = ?", [user.as_str()])?;
        tx.execute("DELETE FROM profiles WHERE user_id = ?", [user.as_str()])?;
        tx.commit()?;
        tracing::debug!(user = %user, "account reset");
        Ok(())
    }

    /// Number of stored entries for a user.
    pub fn entry_count(&self, user: &UserId) -> Result<usize, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ?",
            [user.as_str()],
            |row| row.get(0),
        )?;
        Ok(from_index(count))
    }
}

#[derive(Debug)]
struct EntryRow {
    id: String,
    user_id: String,
    timestamp: String,
    food_name: String,
    weight_grams: f64,
    calories: f64,
    carbs: f64,
    protein: f64,
    fat: f64,
    confidence: f64,
    health_score: Option<f64>,
    meal_type: Option<String>,
    ingredients: String,
    insights: String,
    image_ref: Option<String>,
}

#[derive(Debug)]
struct ProfileRow {
    user_id: String,
    name: String,
    created_at: String,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age: Option<u32>,
    sex: Option<String>,
    objective: Option<String>,
    experience: Option<String>,
    days_per_week: Option<u8>,
    goal_calories: Option<u32>,
    goal_protein_g: Option<u32>,
    goal_carbs_g: Option<u32>,
    goal_fat_g: Option<u32>,
}

fn decode_entry(row: EntryRow) -> Result<NutritionEntry, DbError> {
    let invalid = |message: String| DbError::InvalidRow {
        id: row.id.clone(),
        message,
    };
    let id = nv_core::EntryId::new(row.id.clone()).map_err(|err| invalid(err.to_string()))?;
    let user = UserId::new(row.user_id.clone()).map_err(|err| invalid(err.to_string()))?;
    let timestamp = parse_timestamp(&row.timestamp, id.as_str())?;
    let ingredients =
        serde_json::from_str(&row.ingredients).map_err(|err| invalid(err.to_string()))?;
    let insights = serde_json::from_str(&row.insights).map_err(|err| invalid(err.to_string()))?;
    let meal = row
        .meal_type
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|err: nv_core::ValidationError| invalid(err.to_string()))?;

    Ok(NutritionEntry {
        id,
        user,
        timestamp,
        estimate: nv_core::NutritionEstimate {
            food_name: row.food_name,
            weight_grams: row.weight_grams,
            calories: row.calories,
            carbs: row.carbs,
            protein: row.protein,
            fat: row.fat,
            confidence: nv_core::Confidence::clamped(to_f32(row.confidence)),
            health_score: row
                .health_score
                .map(|score| nv_core::HealthScore::clamped(to_f32(score))),
            ingredients,
            insights,
        },
        meal,
        image_ref: row.image_ref,
    })
}

fn decode_profile(row: ProfileRow) -> Result<UserProfile, DbError> {
    let created_at = parse_timestamp(&row.created_at, &row.user_id)?;
    let goals = match (
        row.goal_calories,
        row.goal_protein_g,
        row.goal_carbs_g,
        row.goal_fat_g,
    ) {
        (Some(calories), Some(protein_g), Some(carbs_g), Some(fat_g)) => Some(nv_core::GoalSet {
            calories,
            protein_g,
            carbs_g,
            fat_g,
        }),
        _ => None,
    };
    let raw = RawProfile {
        id: row.user_id.clone(),
        name: row.name,
        created_at: Some(created_at),
        weight_kg: row.weight_kg,
        height_cm: row.height_cm,
        age: row.age,
        sex: row.sex,
        objective: row.objective,
        experience: row.experience,
        days_per_week: row.days_per_week,
        goals,
    };
    normalize_profile(raw).map_err(|err| DbError::InvalidRow {
        id: row.user_id,
        message: err.to_string(),
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(timestamp: &str, id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn encode_strings(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "stored scores fit comfortably in f32"
)]
fn to_f32(value: f64) -> f32 {
    value as f32
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "indices are small and non-negative by construction"
)]
const fn to_index(value: usize) -> i64 {
    value as i64
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "indices are small and non-negative by construction"
)]
const fn from_index(value: i64) -> usize {
    value as usize
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use nv_core::{
        Confidence, EntryId, Exercise, HealthScore, MealType, NutritionEstimate, TrainingObjective,
        WorkoutDay,
    };

    use super::*;

    fn user() -> UserId {
        UserId::new("local").unwrap()
    }

    fn entry(id: &str, calories: f64) -> NutritionEntry {
        NutritionEntry {
            id: EntryId::new(id).unwrap(),
            user: user(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).single().unwrap(),
            estimate: NutritionEstimate {
                food_name: "Grilled chicken with rice".to_string(),
                weight_grams: 320.0,
                calories,
                carbs: 45.0,
                protein: 38.0,
                fat: 12.0,
                confidence: Confidence::new(88.0).unwrap(),
                health_score: Some(HealthScore::new(8.0).unwrap()),
                ingredients: vec!["chicken".to_string(), "rice".to_string()],
                insights: vec!["good protein source".to_string()],
            },
            meal: Some(MealType::Lunch),
            image_ref: Some("img-123".to_string()),
        }
    }

    fn plan(title: &str, exercise_count: usize) -> WorkoutPlan {
        let exercises = (0..exercise_count)
            .map(|i| Exercise {
                name: format!("exercise {i}"),
                sets: "4".to_string(),
                reps: "8-12".to_string(),
                rest: "60s".to_string(),
                tip: (i == 0).then(|| "slow negatives".to_string()),
            })
            .collect();
        WorkoutPlan {
            title: title.to_string(),
            description: Some("generated split".to_string()),
            days: vec![WorkoutDay {
                label: "Day A".to_string(),
                focus: "Push".to_string(),
                exercises,
            }],
            generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().unwrap(),
        }
    }

    fn profile() -> UserProfile {
        normalize_profile(RawProfile {
            id: "local".to_string(),
            name: "Ana".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap()),
            weight_kg: Some(70.0),
            height_cm: Some(172.0),
            age: Some(29),
            sex: Some("female".to_string()),
            objective: Some("hypertrophy".to_string()),
            experience: Some("intermediate".to_string()),
            days_per_week: Some(4),
            goals: Some(nv_core::compute_goals(70.0, TrainingObjective::Hypertrophy)),
        })
        .unwrap()
    }

    #[test]
    fn open_in_memory_database() {
        assert!(Database::open_in_memory().is_ok());
    }

    #[test]
    fn open_reports_unavailable_storage() {
        let err = Database::open(Path::new("/nonexistent-dir/nv.db")).unwrap_err();
        assert!(matches!(err, DbError::Unavailable { .. }));
    }

    #[test]
    fn entry_roundtrip_preserves_all_fields() {
        let mut db = Database::open_in_memory().unwrap();
        let original = entry("entry-1", 520.0);

        assert!(db.insert_entry(&original).unwrap());
        let listed = db.list_entries(&user()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], original);
    }

    #[test]
    fn insert_entry_never_overwrites_existing_id() {
        let mut db = Database::open_in_memory().unwrap();
        let first = entry("entry-1", 500.0);
        let second = entry("entry-1", 999.0);

        assert!(db.insert_entry(&first).unwrap());
        assert!(!db.insert_entry(&second).unwrap());

        let listed = db.list_entries(&user()).unwrap();
        assert_eq!(listed.len(), 1);
        assert!((listed[0].estimate.calories - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn list_entries_is_scoped_to_the_user() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("entry-1", 400.0)).unwrap();
        let mut other = entry("entry-2", 300.0);
        other.user = UserId::new("someone-else").unwrap();
        db.insert_entry(&other).unwrap();

        assert_eq!(db.list_entries(&user()).unwrap().len(), 1);
        assert_eq!(db.entry_count(&user()).unwrap(), 1);
    }

    #[test]
    fn delete_entry_removes_a_single_row() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("entry-1", 400.0)).unwrap();
        db.insert_entry(&entry("entry-2", 350.0)).unwrap();

        assert!(db.delete_entry(&EntryId::new("entry-1").unwrap()).unwrap());
        assert!(!db.delete_entry(&EntryId::new("entry-1").unwrap()).unwrap());
        assert_eq!(db.list_entries(&user()).unwrap().len(), 1);
    }

    #[test]
    fn clear_entries_removes_only_that_users_history() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("entry-1", 400.0)).unwrap();
        db.insert_entry(&entry("entry-2", 350.0)).unwrap();
        let mut other = entry("entry-3", 300.0);
        other.user = UserId::new("someone-else").unwrap();
        db.insert_entry(&other).unwrap();

        assert_eq!(db.clear_entries(&user()).unwrap(), 2);
        assert!(db.list_entries(&user()).unwrap().is_empty());
        assert_eq!(
            db.list_entries(&UserId::new("someone-else").unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn profile_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let original = profile();
        db.save_profile(&original).unwrap();

        let loaded = db.load_profile(&user()).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_profile_normalizes_missing_fields() {
        let db = Database::open_in_memory().unwrap();
        // A row written by an older build: no objective, frequency, or goals
        db.conn
            .execute(
                "INSERT INTO profiles (user_id, name, created_at) VALUES (?, ?, ?)",
                params!["local", "Ana", "2025-01-01T00:00:00.000Z"],
            )
            .unwrap();

        let loaded = db.load_profile(&user()).unwrap().unwrap();
        assert_eq!(loaded.objective, TrainingObjective::Hypertrophy);
        assert_eq!(loaded.days_per_week, 3);
        assert_eq!(loaded.goals, nv_core::GoalSet::default());
    }

    #[test]
    fn load_profile_returns_none_for_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_profile(&user()).unwrap().is_none());
    }

    #[test]
    fn plan_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let original = plan("Push/Pull/Legs", 4);
        db.set_plan(&user(), &original).unwrap();

        let loaded = db.active_plan(&user()).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn active_plan_is_none_before_generation() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.active_plan(&user()).unwrap().is_none());
    }

    #[test]
    fn toggle_completion_flips_and_persists() {
        let mut db = Database::open_in_memory().unwrap();
        db.set_plan(&user(), &plan("Full body", 4)).unwrap();

        assert!(db.toggle_completion(&user(), 0, 1).unwrap());
        assert!(db.completion_state(&user()).unwrap().contains(0, 1));

        assert!(!db.toggle_completion(&user(), 0, 1).unwrap());
        assert!(db.completion_state(&user()).unwrap().is_empty());
    }

    #[test]
    fn replacing_the_plan_resets_completion_state() {
        let mut db = Database::open_in_memory().unwrap();
        db.set_plan(&user(), &plan("Plan one", 4)).unwrap();
        db.toggle_completion(&user(), 0, 0).unwrap();
        db.toggle_completion(&user(), 0, 1).unwrap();
        assert_eq!(db.completion_state(&user()).unwrap().len(), 2);

        db.set_plan(&user(), &plan("Plan two", 5)).unwrap();
        assert!(db.completion_state(&user()).unwrap().is_empty());

        let loaded = db.active_plan(&user()).unwrap().unwrap();
        assert_eq!(loaded.title, "Plan two");
    }

    #[test]
    fn completion_ratio_resets_with_the_plan() {
        let mut db = Database::open_in_memory().unwrap();
        db.set_plan(&user(), &plan("Full body", 4)).unwrap();
        for exercise in 0..4 {
            db.toggle_completion(&user(), 0, exercise).unwrap();
        }

        let active = db.active_plan(&user()).unwrap().unwrap();
        let progress = nv_core::plan_progress(&active, &db.completion_state(&user()).unwrap());
        assert!((progress[0].ratio - 1.0).abs() < f64::EPSILON);
        assert!(progress[0].complete);

        db.set_plan(&user(), &plan("Regenerated", 4)).unwrap();
        let active = db.active_plan(&user()).unwrap().unwrap();
        let progress = nv_core::plan_progress(&active, &db.completion_state(&user()).unwrap());
        assert_eq!(progress[0].completed, 0);
        assert!(!progress[0].complete);
    }

    #[test]
    fn reset_account_clears_everything_for_the_user() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_profile(&profile()).unwrap();
        db.insert_entry(&entry("entry-1", 400.0)).unwrap();
        db.set_plan(&user(), &plan("Plan", 3)).unwrap();
        db.toggle_completion(&user(), 0, 0).unwrap();

        let mut other = entry("entry-other", 300.0);
        other.user = UserId::new("someone-else").unwrap();
        db.insert_entry(&other).unwrap();

        db.reset_account(&user()).unwrap();
        assert!(db.load_profile(&user()).unwrap().is_none());
        assert!(db.list_entries(&user()).unwrap().is_empty());
        assert!(db.active_plan(&user()).unwrap().is_none());
        assert!(db.completion_state(&user()).unwrap().is_empty());
        assert_eq!(
            db.list_entries(&UserId::new("someone-else").unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nv.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.insert_entry(&entry("entry-1", 450.0)).unwrap();
            db.set_plan(&user(), &plan("Persisted plan", 3)).unwrap();
            db.toggle_completion(&user(), 0, 2).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_entries(&user()).unwrap().len(), 1);
        assert_eq!(db.active_plan(&user()).unwrap().unwrap().title, "Persisted plan");
        assert!(db.completion_state(&user()).unwrap().contains(0, 2));
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().unwrap();

        let entries_columns = table_columns(&db.conn, "entries");
        assert_eq!(
            entries_columns,
            vec![
                "id",
                "user_id",
                "timestamp",
                "food_name",
                "weight_grams",
                "calories",
                "carbs",
                "protein",
                "fat",
                "confidence",
                "health_score",
                "meal_type",
                "ingredients",
                "insights",
                "image_ref",
            ]
        );

        let completions_columns = table_columns(&db.conn, "completions");
        assert_eq!(
            completions_columns,
            vec!["user_id", "day_index", "exercise_index"]
        );

        let completions_foreign_keys = foreign_keys(&db.conn, "completions");
        assert_eq!(completions_foreign_keys.len(), 1);
        assert_eq!(
            completions_foreign_keys[0],
            (
                "plans".to_string(),
                "user_id".to_string(),
                "user_id".to_string(),
                "CASCADE".to_string(),
            )
        );
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn foreign_keys(conn: &Connection, table: &str) -> Vec<(String, String, String, String)> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA foreign_key_list({table})"))
            .expect("prepare foreign_key_list");
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .expect("query foreign_key_list");
        rows.map(|row| row.expect("foreign_key_list row")).collect()
    }
}
