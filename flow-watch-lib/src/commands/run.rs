//! Command dispatch logic for flow-watch

use super::{InitArgs, SubmitArgs, ValidateArgs, WatchArgs, init_config, submit_task, validate_config, watch_task};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "flow-watch", version, about, author, long_about = None)]
#[command(about = "Submit bank-statement processing jobs and follow them to completion")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: FlowSubcommand,
}

#[derive(Subcommand, Debug)]
enum FlowSubcommand {
    /// Follow a task that has already been submitted
    Watch(Box<WatchArgs>),
    /// Authenticate, submit a processing job, and follow it
    Submit(Box<SubmitArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails, if the executed command fails, or if
/// a monitored task does not complete successfully
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        FlowSubcommand::Watch(watch_args) => watch_task(host, watch_args).await,
        FlowSubcommand::Submit(submit_args) => submit_task(host, submit_args).await,
        FlowSubcommand::Init(init_args) => init_config(host, init_args),
        FlowSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
