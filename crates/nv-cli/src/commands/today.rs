//! Today's totals against the daily targets.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use nv_core::{GoalSet, UserId, today_totals, weekly_activity};
use nv_db::Database;

const WEEKDAY_LETTERS: [char; 7] = ['S', 'M', 'T', 'W', 'T', 'F', 'S'];

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    json: bool,
    now: DateTime<FixedOffset>,
) -> Result<()> {
    // Defaults apply when onboarding hasn't run yet
    let goals = db
        .load_profile(user)
        .context("failed to load profile")?
        .map_or_else(GoalSet::default, |profile| profile.goals);
    let entries = db.list_entries(user).context("failed to list entries")?;

    let totals = today_totals(&entries, &goals, now);
    let mask = weekly_activity(&entries, now);

    if json {
        let payload = serde_json::json!({
            "date": now.date_naive().to_string(),
            "totals": totals,
            "goals": goals,
            "week": mask,
        });
        writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }

    writeln!(writer, "{}", render_summary(&totals, &goals, mask))?;
    Ok(())
}

fn render_summary(
    totals: &nv_core::DayTotals,
    goals: &GoalSet,
    mask: [bool; 7],
) -> String {
    let week: String = mask
        .iter()
        .zip(WEEKDAY_LETTERS)
        .map(|(active, letter)| if *active { letter } else { '.' })
        .collect();
    let mut lines = Vec::new();
    lines.push(format!(
        "today: {:.0} / {} kcal ({} meals), {:.0} remaining",
        totals.calories, goals.calories, totals.meals, totals.remaining
    ));
    lines.push(format!(
        "macros: {:.0}/{}g protein, {:.0}/{}g carbs, {:.0}/{}g fat",
        totals.protein, goals.protein_g, totals.carbs, goals.carbs_g, totals.fat, goals.fat_g
    ));
    lines.push(format!("week:   {week}"));
    lines.join("\n")
}
