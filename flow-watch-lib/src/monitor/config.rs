use crate::Result;
use crate::narrator::StageTable;
use core::time::Duration;
use ohno::bail;

/// Time between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls allowed before a session gives up waiting (about two minutes at the default interval).
pub const DEFAULT_POLL_CEILING: u32 = 60;

/// Consecutive failed polls tolerated before a session gives up.
pub const DEFAULT_ERROR_CEILING: u32 = 30;

/// Pause between the final progress render and loading the result.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Narration shown once the task reports completion.
pub const DEFAULT_FINAL_MESSAGE: &str = "Processing completed!";

/// Narration used when neither the stage table nor the server supplies one.
pub const FALLBACK_MESSAGE: &str = "Processing...";

/// Tuning knobs for a [`Monitor`](super::Monitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Tick cadence.
    pub poll_interval: Duration,

    /// A session times out on the first non-terminal poll after this many polls.
    pub poll_ceiling: u32,

    /// A session fails on the first failed poll after this many consecutive failures.
    pub error_ceiling: u32,

    /// Delay between rendering completion and invoking the result loader.
    pub settle_delay: Duration,

    /// Narration rendered alongside 100% on completion.
    pub final_message: String,

    /// Mapping from progress to narration.
    pub stages: StageTable,
}

impl MonitorConfig {
    /// Check that the configuration can drive a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is zero or either ceiling is zero.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("poll_interval must be greater than zero");
        }

        if self.poll_ceiling == 0 {
            bail!("poll_ceiling must be greater than zero");
        }

        if self.error_ceiling == 0 {
            bail!("error_ceiling must be greater than zero");
        }

        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_ceiling: DEFAULT_POLL_CEILING,
            error_ceiling: DEFAULT_ERROR_CEILING,
            settle_delay: DEFAULT_SETTLE_DELAY,
            final_message: DEFAULT_FINAL_MESSAGE.to_string(),
            stages: StageTable::default(),
        }
    }
}
