use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nv_cli::commands::{
    self, analyze, clear, goals, history, init, reset, status, today, workout,
};
use nv_cli::{Cli, Commands, Config};

/// Load config and open the database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(nv_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = nv_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Init(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            init::run(&mut stdout, &mut db, &user, args)?;
        }
        Some(Commands::Analyze(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            analyze::run(&mut stdout, &mut db, &user, &config, args)?;
        }
        Some(Commands::History { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            history::run(&mut stdout, &db, &user, *json)?;
        }
        Some(Commands::Delete { id }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            history::delete(&mut stdout, &mut db, id)?;
        }
        Some(Commands::Today { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            today::run(&mut stdout, &db, &user, *json, Local::now().fixed_offset())?;
        }
        Some(Commands::Goals { action }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            goals::run(&mut stdout, &mut db, &user, action)?;
        }
        Some(Commands::Workout { action }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            workout::run(&mut stdout, &mut db, &user, &config, action)?;
        }
        Some(Commands::Clear { yes }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            clear::run(&mut stdout, &mut db, &user, *yes)?;
        }
        Some(Commands::Reset { yes }) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            reset::run(&mut stdout, &mut db, &user, *yes)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = commands::resolve_user(cli.user.as_deref(), &config.user)?;
            status::run(&mut stdout, &db, &user, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
