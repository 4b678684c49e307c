//! Presentation of monitor output
//!
//! The monitor never draws anything itself. Everything a user sees flows through
//! the [`Sink`] trait: progress updates, one-line notifications, and the final
//! dashboard. [`ConsoleSink`] is the terminal implementation used by the CLI;
//! tests supply their own recording sinks.

mod console_sink;

use crate::report::TaskReport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

pub use console_sink::ConsoleSink;

/// How prominently a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// Receives everything the monitor wants shown to the user.
///
/// Implementations must be cheap to call; they are invoked from the polling task
/// between network requests.
pub trait Sink: Send + Sync + 'static {
    /// Show the current progress percentage and narration.
    fn render_progress(&self, progress: u8, message: &str);

    /// Show a short, transient notification.
    fn notify(&self, message: &str, severity: Severity);

    /// Show the final result of a completed task.
    fn render_dashboard(&self, report: &TaskReport);

    /// Highlight the stage at `index` out of `total`. Called whenever the narrated stage moves forward.
    fn render_stage(&self, _index: usize, _total: usize) {}

    /// Tear down any live progress display. Called once when a session ends.
    fn close_progress(&self) {}
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn render_progress(&self, progress: u8, message: &str) {
        (**self).render_progress(progress, message);
    }

    fn notify(&self, message: &str, severity: Severity) {
        (**self).notify(message, severity);
    }

    fn render_dashboard(&self, report: &TaskReport) {
        (**self).render_dashboard(report);
    }

    fn render_stage(&self, index: usize, total: usize) {
        (**self).render_stage(index, total);
    }

    fn close_progress(&self) {
        (**self).close_progress();
    }
}
