//! Inspect or change daily calorie and macro targets.

use std::io::Write;

use anyhow::{Context, Result};
use nv_core::{GoalSet, UserId, compute_goals, effective_weight};
use nv_db::Database;

use crate::cli::GoalsAction;
use crate::commands::require_profile;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    action: &GoalsAction,
) -> Result<()> {
    match action {
        GoalsAction::Compute {
            weight,
            objective,
            save,
        } => compute(writer, db, user, *weight, objective.as_deref(), *save),
        GoalsAction::Set {
            calories,
            protein,
            carbs,
            fat,
        } => set(
            writer,
            db,
            user,
            calories.as_deref(),
            protein.as_deref(),
            carbs.as_deref(),
            fat.as_deref(),
        ),
        GoalsAction::Show { json } => show(writer, db, user, *json),
    }
}

fn compute<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    weight: Option<f64>,
    objective: Option<&str>,
    save: bool,
) -> Result<()> {
    let mut profile = require_profile(db, user)?;
    let objective = match objective {
        Some(value) => value
            .parse()
            .with_context(|| format!("invalid objective '{value}'"))?,
        None => profile.objective,
    };
    let weight = effective_weight(weight.or(profile.weight_kg));
    let goals = compute_goals(weight, objective);

    write_goals(writer, &goals)?;
    if save {
        profile.objective = objective;
        profile.goals = goals;
        db.save_profile(&profile).context("failed to save profile")?;
        writeln!(writer, "targets saved")?;
    }
    Ok(())
}

fn set<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    calories: Option<&str>,
    protein: Option<&str>,
    carbs: Option<&str>,
    fat: Option<&str>,
) -> Result<()> {
    let mut profile = require_profile(db, user)?;
    if let Some(value) = calories {
        profile.goals.calories = coerce_numeric(value);
    }
    if let Some(value) = protein {
        profile.goals.protein_g = coerce_numeric(value);
    }
    if let Some(value) = carbs {
        profile.goals.carbs_g = coerce_numeric(value);
    }
    if let Some(value) = fat {
        profile.goals.fat_g = coerce_numeric(value);
    }
    db.save_profile(&profile).context("failed to save profile")?;
    write_goals(writer, &profile.goals)?;
    Ok(())
}

fn show<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let profile = require_profile(db, user)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&profile.goals)?)?;
    } else {
        write_goals(writer, &profile.goals)?;
    }
    Ok(())
}

fn write_goals<W: Write>(writer: &mut W, goals: &GoalSet) -> Result<()> {
    writeln!(
        writer,
        "daily targets: {} kcal / {}g protein / {}g carbs / {}g fat",
        goals.calories, goals.protein_g, goals.carbs_g, goals.fat_g
    )?;
    Ok(())
}

/// Manual goal edits coerce unparseable input to zero instead of rejecting.
fn coerce_numeric(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}
