use super::config::{FALLBACK_MESSAGE, MonitorConfig};
use super::outcome::Outcome;
use super::source::StatusPoll;
use crate::Result;
use crate::api::{StatusReport, TaskStatus};
use crate::narrator::advance_stage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LOG_TARGET: &str = "  session";

/// Identifies one monitoring session among all sessions a monitor has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(u64);

/// Issues generation tokens. Issuing a new token invalidates every earlier one.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<Mutex<Generation>>,
}

/// Proof that a generation was still current when the guard was taken.
///
/// While held, no new generation can be issued, so effects applied under the
/// guard cannot interleave with a concurrent `start` or `stop`. Never hold it
/// across an `.await`.
#[derive(Debug)]
pub struct CurrentGuard<'a> {
    _guard: MutexGuard<'a, Generation>,
}

impl GenerationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token, invalidating all earlier ones.
    pub fn advance(&self) -> Generation {
        let mut current = self.lock();
        current.0 += 1;
        *current
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        *self.lock() == generation
    }

    /// Lock the counter if `generation` is still current.
    #[must_use]
    pub fn enter(&self, generation: Generation) -> Option<CurrentGuard<'_>> {
        let guard = self.lock();
        (*guard == generation).then_some(CurrentGuard { _guard: guard })
    }

    fn lock(&self) -> MutexGuard<'_, Generation> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What the sink should show after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: u8,
    pub message: String,
    pub stage: usize,

    /// `true` if `stage` moved forward on this poll.
    pub stage_changed: bool,
}

/// Where the session stands after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep polling.
    Continue,

    /// The task completed; hand off to the result loader.
    Completed,

    /// The session ended without a result.
    Failed(Outcome),
}

/// The effect of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub render: Option<ProgressUpdate>,
    pub verdict: Verdict,
}

/// Counters and narration state for one monitored task.
///
/// A session is a pure state machine: it never performs I/O and never sleeps.
/// Feed it one status response per tick through [`observe`](Self::observe).
#[derive(Debug, Clone)]
pub struct PollSession {
    task_id: Arc<str>,
    generation: Generation,
    poll_count: u32,
    consecutive_errors: u32,
    stage_index: usize,
    finished: bool,
}

impl PollSession {
    #[must_use]
    pub const fn new(task_id: Arc<str>, generation: Generation) -> Self {
        Self {
            task_id,
            generation,
            poll_count: 0,
            consecutive_errors: 0,
            stage_index: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn poll_count(&self) -> u32 {
        self.poll_count
    }

    #[must_use]
    pub const fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    #[must_use]
    pub const fn stage_index(&self) -> usize {
        self.stage_index
    }

    /// Returns `true` once a terminal verdict has been produced.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply one poll's response.
    ///
    /// Returns `None` if the session already reached a terminal verdict; a
    /// session produces exactly one `Completed` or `Failed` verdict.
    pub fn observe(&mut self, response: Result<StatusPoll>, config: &MonitorConfig) -> Option<Tick> {
        if self.finished {
            return None;
        }

        self.poll_count = self.poll_count.saturating_add(1);

        let tick = match response {
            Err(e) => self.observe_failure(&e, config),
            Ok(StatusPoll::Answered(report)) => self.observe_report(report, config),
            Ok(StatusPoll::Unanswered) => self.observe_unanswered(config),
        };

        if !matches!(tick.verdict, Verdict::Continue) {
            self.finished = true;
        }

        Some(tick)
    }

    fn observe_failure(&mut self, error: &ohno::AppError, config: &MonitorConfig) -> Tick {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        log::warn!(
            target: LOG_TARGET,
            "poll {} for task '{}' failed ({} in a row): {error:#}",
            self.poll_count,
            self.task_id,
            self.consecutive_errors
        );

        let verdict = if self.consecutive_errors > config.error_ceiling {
            Verdict::Failed(Outcome::ErrorThreshold {
                failures: self.consecutive_errors,
            })
        } else {
            self.check_poll_ceiling(config)
        };

        Tick { render: None, verdict }
    }

    fn observe_unanswered(&self, config: &MonitorConfig) -> Tick {
        log::debug!(
            target: LOG_TARGET,
            "poll {} for task '{}' got no answer in time",
            self.poll_count,
            self.task_id
        );

        Tick {
            render: None,
            verdict: self.check_poll_ceiling(config),
        }
    }

    fn observe_report(&mut self, report: StatusReport, config: &MonitorConfig) -> Tick {
        self.consecutive_errors = 0;
        log::debug!(
            target: LOG_TARGET,
            "poll {} for task '{}': {} at {}%",
            self.poll_count,
            self.task_id,
            report.status,
            report.progress
        );

        match report.status {
            TaskStatus::Pending | TaskStatus::Running => {
                let previous = self.stage_index;
                self.stage_index = advance_stage(previous, report.progress, &config.stages);

                let message = config
                    .stages
                    .message(self.stage_index)
                    .or_else(|| report.message())
                    .unwrap_or(FALLBACK_MESSAGE)
                    .to_string();

                Tick {
                    render: Some(ProgressUpdate {
                        progress: report.progress,
                        message,
                        stage: self.stage_index,
                        stage_changed: self.stage_index != previous,
                    }),
                    verdict: self.check_poll_ceiling(config),
                }
            }

            TaskStatus::Completed => {
                let previous = self.stage_index;
                self.stage_index = self.stage_index.max(config.stages.last_index());

                Tick {
                    render: Some(ProgressUpdate {
                        progress: 100,
                        message: config.final_message.clone(),
                        stage: self.stage_index,
                        stage_changed: self.stage_index != previous,
                    }),
                    verdict: Verdict::Completed,
                }
            }

            TaskStatus::Error => Tick {
                render: None,
                verdict: Verdict::Failed(Outcome::ServerError {
                    message: report.message().map(String::from),
                }),
            },
        }
    }

    fn check_poll_ceiling(&self, config: &MonitorConfig) -> Verdict {
        if self.poll_count > config.poll_ceiling {
            Verdict::Failed(Outcome::TimedOut { polls: self.poll_count })
        } else {
            Verdict::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    fn session() -> PollSession {
        PollSession::new(Arc::from("task-1"), Generation::default())
    }

    fn running(progress: u8) -> Result<StatusPoll> {
        Ok(StatusReport::new(TaskStatus::Running, progress).into())
    }

    fn failure() -> Result<StatusPoll> {
        Err(app_err!("connection refused"))
    }

    #[test]
    fn test_generation_counter_invalidates_previous() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        assert!(counter.is_current(first));

        let second = counter.advance();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert!(counter.enter(first).is_none());
        assert!(counter.enter(second).is_some());
    }

    #[test]
    fn test_generation_counter_clones_share_state() {
        let counter = GenerationCounter::new();
        let clone = counter.clone();
        let generation = counter.advance();
        assert!(clone.is_current(generation));
        let _ = clone.advance();
        assert!(!counter.is_current(generation));
    }

    #[test]
    fn test_running_renders_stage_message() {
        let config = MonitorConfig::default();
        let mut session = session();

        let tick = session.observe(running(15), &config).unwrap();
        assert_eq!(tick.verdict, Verdict::Continue);

        let update = tick.render.unwrap();
        assert_eq!(update.progress, 15);
        assert_eq!(update.stage, 1);
        assert!(update.stage_changed);
        assert_eq!(Some(update.message.as_str()), config.stages.message(1));
        assert_eq!(session.poll_count(), 1);
    }

    #[test]
    fn test_server_message_used_when_stage_message_blank() {
        let config = MonitorConfig {
            stages: crate::narrator::StageTable::new(vec![crate::narrator::Stage::new(0, "")]).unwrap(),
            ..MonitorConfig::default()
        };

        let mut session = session();
        let tick = session
            .observe(Ok(StatusReport::new(TaskStatus::Pending, 0).with_message("Connecting").into()), &config)
            .unwrap();
        assert_eq!(tick.render.unwrap().message, "Connecting");

        let tick = session.observe(running(5), &config).unwrap();
        assert_eq!(tick.render.unwrap().message, FALLBACK_MESSAGE);
    }

    #[test]
    fn test_stage_index_never_regresses() {
        let config = MonitorConfig::default();
        let mut session = session();
        let mut previous = 0;

        for progress in [0, 15, 40, 12, 0, 99, 3, 100] {
            let _ = session.observe(running(progress), &config).unwrap();
            assert!(session.stage_index() >= previous);
            assert!(session.stage_index() <= config.stages.last_index());
            previous = session.stage_index();
        }

        assert_eq!(session.stage_index(), config.stages.last_index());
    }

    #[test]
    fn test_failure_keeps_stage() {
        let config = MonitorConfig::default();
        let mut session = session();
        let _ = session.observe(running(40), &config).unwrap();
        let stage = session.stage_index();

        let tick = session.observe(failure(), &config).unwrap();
        assert_eq!(tick.render, None);
        assert_eq!(tick.verdict, Verdict::Continue);
        assert_eq!(session.stage_index(), stage);
        assert_eq!(session.consecutive_errors(), 1);
    }

    #[test]
    fn test_error_threshold_on_31st_consecutive_failure() {
        let config = MonitorConfig::default();
        let mut session = session();

        for _ in 0..30 {
            assert_eq!(session.observe(failure(), &config).unwrap().verdict, Verdict::Continue);
        }

        let tick = session.observe(failure(), &config).unwrap();
        assert_eq!(tick.verdict, Verdict::Failed(Outcome::ErrorThreshold { failures: 31 }));
        assert!(session.is_finished());
    }

    #[test]
    fn test_success_resets_error_count() {
        let config = MonitorConfig::default();
        let mut session = session();

        for _ in 0..30 {
            let _ = session.observe(failure(), &config).unwrap();
        }
        let _ = session.observe(running(10), &config).unwrap();
        assert_eq!(session.consecutive_errors(), 0);

        for _ in 0..28 {
            assert_eq!(session.observe(failure(), &config).unwrap().verdict, Verdict::Continue);
        }

        // 30 + 1 + 28 = 59 polls so far; the ceiling is not yet reached
        assert_eq!(session.poll_count(), 59);
        assert!(!session.is_finished());
    }

    #[test]
    fn test_timeout_on_61st_poll() {
        let config = MonitorConfig::default();
        let mut session = session();

        for _ in 0..60 {
            assert_eq!(session.observe(running(10), &config).unwrap().verdict, Verdict::Continue);
        }

        let tick = session.observe(running(10), &config).unwrap();
        assert!(tick.render.is_some());
        assert_eq!(tick.verdict, Verdict::Failed(Outcome::TimedOut { polls: 61 }));
    }

    #[test]
    fn test_completion_on_the_last_allowed_poll_wins_over_timeout() {
        let config = MonitorConfig::default();
        let mut session = session();

        for _ in 0..60 {
            let _ = session.observe(running(50), &config).unwrap();
        }

        let tick = session.observe(Ok(StatusReport::new(TaskStatus::Completed, 100).into()), &config).unwrap();
        assert_eq!(tick.verdict, Verdict::Completed);
    }

    #[test]
    fn test_completed_renders_final_message() {
        let config = MonitorConfig::default();
        let mut session = session();

        let tick = session.observe(Ok(StatusReport::new(TaskStatus::Completed, 97).into()), &config).unwrap();
        assert_eq!(tick.verdict, Verdict::Completed);

        let update = tick.render.unwrap();
        assert_eq!(update.progress, 100);
        assert_eq!(update.message, config.final_message);
        assert_eq!(update.stage, config.stages.last_index());
    }

    #[test]
    fn test_server_error_is_terminal_without_render() {
        let config = MonitorConfig::default();
        let mut session = session();

        let report = StatusReport::new(TaskStatus::Error, 0).with_message("Processing failed: bad password");
        let tick = session.observe(Ok(report.into()), &config).unwrap();
        assert_eq!(tick.render, None);
        assert_eq!(
            tick.verdict,
            Verdict::Failed(Outcome::ServerError {
                message: Some("Processing failed: bad password".into())
            })
        );
    }

    #[test]
    fn test_exactly_one_terminal_verdict() {
        let config = MonitorConfig::default();
        let mut session = session();

        let _ = session.observe(Ok(StatusReport::new(TaskStatus::Error, 0).into()), &config).unwrap();
        assert!(session.observe(running(10), &config).is_none());
        assert!(session.observe(Ok(StatusReport::new(TaskStatus::Completed, 100).into()), &config).is_none());
        assert_eq!(session.poll_count(), 1);
    }

    #[test]
    fn test_unanswered_poll_is_not_a_failure() {
        let config = MonitorConfig::default();
        let mut session = session();
        let _ = session.observe(running(40), &config).unwrap();
        let _ = session.observe(failure(), &config).unwrap();

        let tick = session.observe(Ok(StatusPoll::Unanswered), &config).unwrap();
        assert_eq!(tick.render, None);
        assert_eq!(tick.verdict, Verdict::Continue);
        assert_eq!(session.consecutive_errors(), 1);
        assert_eq!(session.poll_count(), 3);
    }

    #[test]
    fn test_unanswered_polls_never_reach_error_threshold() {
        let config = MonitorConfig::default();
        let mut session = session();

        for _ in 0..60 {
            assert_eq!(session.observe(Ok(StatusPoll::Unanswered), &config).unwrap().verdict, Verdict::Continue);
        }

        let tick = session.observe(Ok(StatusPoll::Unanswered), &config).unwrap();
        assert_eq!(tick.verdict, Verdict::Failed(Outcome::TimedOut { polls: 61 }));
        assert_eq!(session.consecutive_errors(), 0);
    }
}
