use crate::Result;
use crate::api::DEFAULT_REQUEST_TIMEOUT;
use crate::monitor::{
    DEFAULT_ERROR_CEILING, DEFAULT_FINAL_MESSAGE, DEFAULT_POLL_CEILING, DEFAULT_POLL_INTERVAL, DEFAULT_SETTLE_DELAY, MonitorConfig,
};
use crate::narrator::StageTable;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "flow-watch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root URL of the backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Time a single HTTP request may take
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Time between status polls
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Polls allowed before giving up on a task
    #[serde(default = "default_poll_ceiling")]
    pub poll_ceiling: u32,

    /// Consecutive failed polls tolerated before giving up
    #[serde(default = "default_error_ceiling")]
    pub error_ceiling: u32,

    /// Pause between showing completion and loading the result
    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    /// Narration shown on completion
    #[serde(default = "default_final_message")]
    pub final_message: String,

    /// Progress narration
    #[serde(default)]
    pub stages: StageTable,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

const fn default_poll_ceiling() -> u32 {
    DEFAULT_POLL_CEILING
}

const fn default_error_ceiling() -> u32 {
    DEFAULT_ERROR_CEILING
}

const fn default_settle_delay() -> Duration {
    DEFAULT_SETTLE_DELAY
}

fn default_final_message() -> String {
    DEFAULT_FINAL_MESSAGE.to_string()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// With no explicit path, `flow-watch.toml` in `base_dir` is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading flow-watch configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("no '{path}' found, using the default configuration");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading flow-watch configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate().into_app_err_with(|| format!("validating configuration file '{final_path}'"))?;

        log::debug!("loaded configuration from '{final_path}'");
        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or any timing value is out of range
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).into_app_err_with(|| format!("base_url '{}' is not a valid URL", self.base_url))?;
        if url.cannot_be_a_base() {
            return Err(app_err!("base_url '{}' cannot be used as a base URL", self.base_url));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        self.to_monitor_config().validate()
    }

    /// The polling settings as a monitor understands them
    #[must_use]
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: self.poll_interval,
            poll_ceiling: self.poll_ceiling,
            error_ceiling: self.error_ceiling,
            settle_delay: self.settle_delay,
            final_message: self.final_message.clone(),
            stages: self.stages.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
