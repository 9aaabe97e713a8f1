//! Command implementations.

pub mod analyze;
pub mod clear;
pub mod goals;
pub mod history;
pub mod init;
pub mod reset;
pub mod status;
pub mod today;
pub mod workout;

use anyhow::{Context, Result};
use nv_core::UserId;

/// Resolves the acting user from the CLI override or the config default.
pub fn resolve_user(override_user: Option<&str>, config_user: &str) -> Result<UserId> {
    let name = override_user.unwrap_or(config_user);
    UserId::new(name).with_context(|| format!("invalid user '{name}'"))
}

/// Loads the user's profile or explains how to create one.
pub fn require_profile(
    db: &nv_db::Database,
    user: &UserId,
) -> Result<nv_core::UserProfile> {
    db.load_profile(user)
        .context("failed to load profile")?
        .with_context(|| format!("no profile for '{user}'; run `nv init` first"))
}
