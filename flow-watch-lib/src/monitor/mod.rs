//! Polling state machine for long-running backend tasks
//!
//! A [`Monitor`] owns at most one session at a time. Each session polls a
//! [`StatusSource`] on a fixed cadence, narrates progress through a
//! [`Sink`](crate::sink::Sink), and ends in exactly one [`Outcome`].
//!
//! # Session lifecycle
//!
//! 1. `start` cancels any running session, issues a fresh [`Generation`], and
//!    spawns a Tokio task that waits one interval before the first poll.
//! 2. Each tick awaits a single status request, and the next tick is scheduled
//!    one full interval after that request ends, so requests never overlap and
//!    a slow backend is never polled back to back.
//! 3. Responses are applied by [`PollSession::observe`], a pure state machine
//!    that tracks the poll count, consecutive failures, and the narrated stage.
//! 4. On completion the ticker is dropped, the session sleeps for the settle
//!    delay, and then calls the [`ResultLoader`] exactly once.
//!
//! A response is applied only while its generation is still current, and the
//! generation is checked under a lock so that a concurrent `stop` cannot
//! interleave with sink calls.

mod config;
mod outcome;
mod progress_monitor;
mod session;
mod source;

pub use config::{
    DEFAULT_ERROR_CEILING, DEFAULT_FINAL_MESSAGE, DEFAULT_POLL_CEILING, DEFAULT_POLL_INTERVAL, DEFAULT_SETTLE_DELAY,
    FALLBACK_MESSAGE, MonitorConfig,
};
pub use outcome::Outcome;
pub use progress_monitor::Monitor;
pub use session::{CurrentGuard, Generation, GenerationCounter, PollSession, ProgressUpdate, Tick, Verdict};
pub use source::{ResultLoader, StatusPoll, StatusSource};
