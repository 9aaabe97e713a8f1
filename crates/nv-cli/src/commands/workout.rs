//! Generate and track the training plan.

use std::io::Write;

use anyhow::{Context, Result, bail};
use nv_core::{CompletionState, UserId, WorkoutPlan, plan_progress};
use nv_db::Database;
use nv_llm::Client;

use crate::Config;
use crate::cli::WorkoutAction;
use crate::commands::require_profile;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    config: &Config,
    action: &WorkoutAction,
) -> Result<()> {
    match action {
        WorkoutAction::Generate => generate(writer, db, user, config),
        WorkoutAction::Show { json } => show(writer, db, user, *json),
        WorkoutAction::Toggle { day, exercise } => toggle(writer, db, user, *day, *exercise),
    }
}

fn generate<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    config: &Config,
) -> Result<()> {
    let profile = require_profile(db, user)?;
    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .context("missing Claude API key (set NV_API_KEY or config.toml)")?;

    let client = Client::new(api_key.to_string()).context("failed to create gateway client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    // On failure the previous plan stays untouched
    let plan = runtime
        .block_on(client.generate_workout(&config.model, &profile))
        .context("failed to generate workout plan")?;

    db.set_plan(user, &plan).context("failed to save plan")?;
    writeln!(writer, "{} ({} days)", plan.title, plan.days.len())?;
    if let Some(description) = &plan.description {
        writeln!(writer, "{description}")?;
    }
    writeln!(writer, "completion progress was reset")?;
    Ok(())
}

fn show<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let Some(plan) = db.active_plan(user).context("failed to load plan")? else {
        writeln!(writer, "no active plan; run `nv workout generate`")?;
        return Ok(());
    };
    let completion = db
        .completion_state(user)
        .context("failed to load completion state")?;
    let progress = plan_progress(&plan, &completion);

    if json {
        let payload = serde_json::json!({
            "plan": plan,
            "progress": progress,
        });
        writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }

    writeln!(writer, "{}", render_plan(&plan, &completion))?;
    Ok(())
}

fn toggle<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &UserId,
    day: usize,
    exercise: usize,
) -> Result<()> {
    let Some(plan) = db.active_plan(user).context("failed to load plan")? else {
        bail!("no active plan; run `nv workout generate` first");
    };
    let Some(plan_day) = plan.days.get(day) else {
        bail!("day {day} is out of range (plan has {} days)", plan.days.len());
    };
    if exercise >= plan_day.exercises.len() {
        bail!(
            "exercise {exercise} is out of range ({} has {} exercises)",
            plan_day.label,
            plan_day.exercises.len()
        );
    }

    let now_complete = db
        .toggle_completion(user, day, exercise)
        .context("failed to persist completion mark")?;
    let state = if now_complete { "done" } else { "not done" };
    writeln!(
        writer,
        "{} - {}: {state}",
        plan_day.label, plan_day.exercises[exercise].name
    )?;

    let completion = db
        .completion_state(user)
        .context("failed to load completion state")?;
    let progress = plan_progress(&plan, &completion);
    if let Some(day_progress) = progress.get(day) {
        writeln!(
            writer,
            "{}: {}/{} complete",
            plan_day.label, day_progress.completed, day_progress.total
        )?;
    }
    Ok(())
}

fn render_plan(plan: &WorkoutPlan, completion: &CompletionState) -> String {
    let progress = plan_progress(plan, completion);
    let mut lines = Vec::new();
    lines.push(plan.title.clone());
    for (day_index, (day, day_progress)) in plan.days.iter().zip(&progress).enumerate() {
        let check = if day_progress.complete { " ✓" } else { "" };
        lines.push(format!(
            "[{day_index}] {} ({}) {}/{}{check}",
            day.label, day.focus, day_progress.completed, day_progress.total
        ));
        for (exercise_index, exercise) in day.exercises.iter().enumerate() {
            let mark = if completion.contains(day_index, exercise_index) {
                "x"
            } else {
                " "
            };
            lines.push(format!(
                "  [{mark}] {}  {} x {} (rest {})",
                exercise.name, exercise.sets, exercise.reps, exercise.rest
            ));
        }
    }
    lines.join("\n")
}
