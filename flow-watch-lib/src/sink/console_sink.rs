use super::{Severity, Sink};
use crate::report::{TaskReport, console};
use core::fmt::{Debug, Formatter};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

const TEMPLATE: &str = "{prefix:>7.bold.cyan} [{bar:25}] {pos:>3}% {msg}";
const TEMPLATE_NO_COLOR: &str = "{prefix:>7} [{bar:25}] {pos:>3}% {msg}";

/// Terminal presentation: a progress bar on stderr, colored notifications, and a
/// text dashboard written to `W`.
///
/// The most recently rendered report is retained so it can be exported afterwards.
pub struct ConsoleSink<W> {
    bar: ProgressBar,
    dashboard: Mutex<W>,
    report: Mutex<Option<TaskReport>>,
    use_colors: bool,
}

impl<W: Write + Send + 'static> ConsoleSink<W> {
    /// Create a sink that draws its progress bar on stderr.
    #[must_use]
    pub fn new(dashboard: W, use_colors: bool) -> Self {
        Self::with_draw_target(dashboard, use_colors, ProgressDrawTarget::stderr_with_hz(10))
    }

    /// Create a sink whose progress bar is never drawn.
    #[must_use]
    pub fn hidden(dashboard: W, use_colors: bool) -> Self {
        Self::with_draw_target(dashboard, use_colors, ProgressDrawTarget::hidden())
    }

    fn with_draw_target(dashboard: W, use_colors: bool, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), target);
        let template = if use_colors { TEMPLATE } else { TEMPLATE_NO_COLOR };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("=> "));
        }

        Self {
            bar,
            dashboard: Mutex::new(dashboard),
            report: Mutex::new(None),
            use_colors,
        }
    }

    /// Take everything written to the dashboard so far, leaving an empty writer behind.
    pub fn take_dashboard(&self) -> W
    where
        W: Default,
    {
        core::mem::take(&mut *self.dashboard.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Take the last report passed to [`Sink::render_dashboard`].
    pub fn take_report(&self) -> Option<TaskReport> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn format_notification(&self, message: &str, severity: Severity) -> String {
        let label = format!("{:>7}", severity.to_string());
        if !self.use_colors {
            return format!("{label}: {message}");
        }

        let label = match severity {
            Severity::Success => label.green().bold().to_string(),
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Info => label.cyan().bold().to_string(),
        };
        format!("{label}: {message}")
    }
}

impl<W: Write + Send + 'static> Sink for ConsoleSink<W> {
    fn render_progress(&self, progress: u8, message: &str) {
        self.bar.set_position(u64::from(progress));
        self.bar.set_message(message.to_string());
    }

    fn notify(&self, message: &str, severity: Severity) {
        let line = self.format_notification(message, severity);
        self.bar.suspend(|| eprintln!("{line}"));
    }

    fn render_dashboard(&self, report: &TaskReport) {
        let mut text = String::new();
        if let Err(e) = console::generate(report, self.use_colors, &mut text) {
            log::error!("could not render dashboard: {e:#}");
            return;
        }

        {
            let mut out = self.dashboard.lock().unwrap_or_else(PoisonError::into_inner);
            self.bar.suspend(|| {
                if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
                    log::error!("could not write dashboard: {e}");
                }
            });
        }

        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
    }

    fn render_stage(&self, index: usize, total: usize) {
        self.bar.set_prefix(format!("{}/{total}", index + 1));
    }

    fn close_progress(&self) {
        self.bar.finish_and_clear();
    }
}

impl<W> Debug for ConsoleSink<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("bar", &self.bar)
            .field("dashboard", &"<writer>")
            .field("use_colors", &self.use_colors)
            .finish()
    }
}
