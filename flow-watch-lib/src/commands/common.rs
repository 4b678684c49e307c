//! Common processing logic shared between the watch and submit commands.

use super::Host;
use super::config::Config;
use crate::Result;
use crate::api::ApiClient;
use crate::monitor::{Monitor, Outcome};
use crate::report::export;
use crate::sink::ConsoleSink;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use clap::Args;
use clap::ValueEnum;
use ohno::bail;
use std::io::Write;
use std::sync::Arc;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Common arguments shared between the watch and submit commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Root URL of the backend (overrides `base_url` from the configuration file)
    #[arg(long, value_name = "URL", env = "FLOW_WATCH_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file (default is `flow-watch.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    /// Write the finished task's data to a JSON file. With no PATH, a dated file is created in the current directory
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    #[expect(clippy::option_option, reason = "clap reads this as a flag with an optional value")]
    pub export: Option<Option<Utf8PathBuf>>,
}

pub struct Common<'a, H: Host> {
    pub config: Config,
    pub client: Arc<ApiClient>,
    host: &'a mut H,
    use_colors: bool,
    show_progress: bool,
    export: Option<Option<Utf8PathBuf>>,
}

impl<'a, H: Host> Common<'a, H> {
    /// Set up logging, load the configuration, and build the API client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the client cannot be built
    pub fn new(host: &'a mut H, args: &CommonArgs) -> Result<Self> {
        Self::init_logging(args.log_level);

        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;
        let base_url = args.base_url.as_deref().unwrap_or(&config.base_url);
        let client = ApiClient::new(base_url, config.request_timeout)?;

        let use_colors = match args.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                use std::io::{IsTerminal, stderr};
                stderr().is_terminal()
            }
        };

        Ok(Self {
            config,
            client: Arc::new(client),
            host,
            use_colors,

            // the bar and log lines would fight over stderr
            show_progress: args.log_level == LogLevel::None,
            export: args.export.clone(),
        })
    }

    /// Initialize logger based on log level
    fn init_logging(log_level: LogLevel) {
        let level = match log_level {
            LogLevel::None => return,
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        let env = env_logger::Env::default().filter_or("RUST_LOG", level);

        // try_init: a second command in the same process keeps the first logger
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
            .try_init();
    }

    pub const fn host(&mut self) -> &mut H {
        self.host
    }

    /// Follow `task_id` until it ends, then print the dashboard and export its data if asked
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor cannot be created or the export fails
    pub async fn watch(&mut self, task_id: &str) -> Result<Outcome> {
        let sink = Arc::new(if self.show_progress {
            ConsoleSink::new(Vec::new(), self.use_colors)
        } else {
            ConsoleSink::hidden(Vec::new(), self.use_colors)
        });

        let mut monitor = Monitor::new(
            self.config.to_monitor_config(),
            Arc::clone(&self.client),
            Arc::clone(&self.client),
            Arc::clone(&sink),
        )?;

        let _ = monitor.start(task_id);
        let Some(outcome) = monitor.wait().await else {
            bail!("monitoring of task '{task_id}' was cancelled");
        };

        let dashboard = sink.take_dashboard();
        if !dashboard.is_empty() {
            let mut out = self.host.output();
            let _ = out.write_all(&dashboard);
            let _ = out.flush();
        }

        if let Some(path) = &self.export
            && let Some(report) = sink.take_report()
        {
            let path = path
                .clone()
                .unwrap_or_else(|| Utf8PathBuf::from(export::default_file_name(Local::now().date_naive())));

            export::write_json(&report, &path)?;
            let _ = writeln!(self.host.output(), "Exported task data to {path}");
        }

        Ok(outcome)
    }

    /// Map a finished session to the process exit status
    ///
    /// # Errors
    ///
    /// Returns an error describing the outcome if it was not a success
    pub fn finish(&mut self, outcome: &Outcome) -> Result<()> {
        if outcome.is_success() {
            return Ok(());
        }

        self.host.exit(1);
        bail!("{outcome}");
    }
}
