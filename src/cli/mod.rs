//! Command-line interface components
//!
//! This module contains CLI-specific code for the commonlib binary:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, DirsArgs, FetchArgs, FormatArg, GlobalArgs, GridArgs,
    ImageArgs,
};
pub use commands::{handle_config, handle_dirs, handle_fetch, handle_grid, handle_image};
