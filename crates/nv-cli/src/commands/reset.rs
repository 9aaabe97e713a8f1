//! Account reset: profile, plan, and history in one stroke.

use std::io::Write;

use anyhow::{Context, Result, bail};
use nv_core::UserId;
use nv_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, user: &UserId, yes: bool) -> Result<()> {
    if !yes {
        bail!("resetting the account is irreversible; pass --yes to confirm");
    }
    db.reset_account(user).context("failed to reset account")?;
    writeln!(writer, "account '{user}' reset")?;
    Ok(())
}
