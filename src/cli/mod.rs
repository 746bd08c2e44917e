//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, RunArgs};
pub use commands::{apply_run_args, handle_config_action, list_formats, open_source, run, CliError};
pub use enums::FormatArg;
