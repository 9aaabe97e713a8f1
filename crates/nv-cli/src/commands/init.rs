//! Onboarding: create or update the profile and compute daily targets.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use nv_core::{UserId, compute_goals, effective_weight, normalize_profile};
use nv_db::Database;

use crate::cli::InitArgs;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    args: &InitArgs,
) -> Result<()> {
    let objective: nv_core::TrainingObjective = args
        .objective
        .parse()
        .with_context(|| format!("invalid objective '{}'", args.objective))?;
    let experience: nv_core::ExperienceTier = args
        .experience
        .parse()
        .with_context(|| format!("invalid experience '{}'", args.experience))?;
    let sex: Option<nv_core::BiologicalSex> = args
        .sex
        .as_deref()
        .map(str::parse)
        .transpose()
        .context("invalid sex (expected male or female)")?;

    // Keep the original creation time when re-running onboarding
    let created_at = db
        .load_profile(user)
        .context("failed to load profile")?
        .map_or_else(Utc::now, |existing| existing.created_at);

    let goals = compute_goals(effective_weight(args.weight), objective);
    let profile = normalize_profile(nv_core::RawProfile {
        id: user.to_string(),
        name: args.name.clone(),
        created_at: Some(created_at),
        weight_kg: args.weight,
        height_cm: args.height,
        age: args.age,
        sex: sex.map(|s| s.as_str().to_string()),
        objective: Some(objective.to_string()),
        experience: Some(experience.to_string()),
        days_per_week: Some(args.days_per_week),
        goals: Some(goals),
    })
    .context("invalid profile")?;

    db.save_profile(&profile).context("failed to save profile")?;

    writeln!(writer, "profile saved for {}", profile.name)?;
    writeln!(
        writer,
        "daily targets: {} kcal / {}g protein / {}g carbs / {}g fat",
        goals.calories, goals.protein_g, goals.carbs_g, goals.fat_g
    )?;
    Ok(())
}
