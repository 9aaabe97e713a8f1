//! Store location and tracking summary.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use nv_core::UserId;
use nv_db::Database;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    database_path: &Path,
) -> Result<()> {
    writeln!(writer, "database: {}", database_path.display())?;
    writeln!(writer, "user:     {user}")?;

    match db.load_profile(user).context("failed to load profile")? {
        Some(profile) => {
            writeln!(
                writer,
                "profile:  {} ({}, {}, {} days/week)",
                profile.name, profile.objective, profile.experience, profile.days_per_week
            )?;
        }
        None => writeln!(writer, "profile:  none (run `nv init`)")?,
    }

    let entry_count = db.entry_count(user).context("failed to count entries")?;
    writeln!(writer, "entries:  {entry_count}")?;

    match db.active_plan(user).context("failed to load plan")? {
        Some(plan) => {
            let completion = db
                .completion_state(user)
                .context("failed to load completion state")?;
            writeln!(
                writer,
                "plan:     {} ({} days, generated {}, {} marks)",
                plan.title,
                plan.days.len(),
                plan.generated_at.format("%Y-%m-%d"),
                completion.len()
            )?;
        }
        None => writeln!(writer, "plan:     none")?,
    }
    Ok(())
}
