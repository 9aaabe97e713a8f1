//! Bulk-delete the entry history.

use std::io::Write;

use anyhow::{Context, Result, bail};
use nv_core::UserId;
use nv_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, user: &UserId, yes: bool) -> Result<()> {
    if !yes {
        bail!("clearing the history is irreversible; pass --yes to confirm");
    }
    let removed = db.clear_entries(user).context("failed to clear entries")?;
    writeln!(writer, "removed {removed} entries")?;
    Ok(())
}
