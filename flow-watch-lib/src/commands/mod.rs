//! Command-line interface and orchestration for flow-watch
//!
//! This module implements the CLI commands and wires the API client, the
//! monitor, and the console sink together. It handles argument parsing,
//! configuration management, and the high-level workflows.
//!
//! # Commands
//!
//! - **watch**: Follow an existing task until it completes, fails, or times out,
//!   then print the dashboard
//! - **submit**: Authenticate, start a processing job for a date range, and watch it
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. The watch and submit commands follow
//! the same pattern:
//!
//! 1. Set up logging and load configuration
//! 2. Build the API client
//! 3. Run a monitor session with a console sink
//! 4. Print the dashboard, export data if asked, and map the outcome to an exit code
//!
//! The `common` module holds the shared pieces: logging setup, color mode
//! handling, and the watch workflow itself.

mod common;
mod config;
mod host;
mod init;
mod run;
mod submit;
mod validate;
mod watch;

pub use common::{ColorMode, CommonArgs, LogLevel};
pub use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TOML};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use submit::{SubmitArgs, submit_task};
pub use validate::{ValidateArgs, validate_config};
pub use watch::{WatchArgs, watch_task};
