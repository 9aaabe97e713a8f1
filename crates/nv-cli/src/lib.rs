pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{AnalyzeArgs, Cli, Commands, GoalsAction, InitArgs, WorkoutAction};
pub use config::Config;
