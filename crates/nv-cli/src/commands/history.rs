//! List logged entries.

use std::io::Write;

use anyhow::{Context, Result};
use nv_core::{NutritionEntry, UserId};
use nv_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let mut entries = db.list_entries(user).context("failed to list entries")?;
    // Storage order is unspecified; most recent first is the display rule
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.as_str().cmp(a.id.as_str())));

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "no entries logged")?;
        return Ok(());
    }
    for entry in &entries {
        writeln!(writer, "{}", render_line(entry))?;
    }
    Ok(())
}

/// Deletes a single entry by ID.
pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = nv_core::EntryId::new(id).context("invalid entry ID")?;
    if db.delete_entry(&id).context("failed to delete entry")? {
        writeln!(writer, "deleted entry {id}")?;
    } else {
        writeln!(writer, "no entry with ID {id}")?;
    }
    Ok(())
}

fn render_line(entry: &NutritionEntry) -> String {
    let meal = entry
        .meal
        .map_or_else(String::new, |meal| format!(" [{meal}]"));
    format!(
        "{}  {}{}  {:.0} kcal ({:.0}g P / {:.0}g C / {:.0}g F)  conf {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.estimate.food_name,
        meal,
        entry.estimate.calories,
        entry.estimate.protein,
        entry.estimate.carbs,
        entry.estimate.fat,
        entry.estimate.confidence,
    )
}
