use super::config::MonitorConfig;
use super::outcome::Outcome;
use super::session::{Generation, GenerationCounter, PollSession, Verdict};
use super::source::{ResultLoader, StatusPoll, StatusSource};
use crate::Result;
use crate::sink::{Severity, Sink};
use core::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const LOG_TARGET: &str = "  monitor";

/// Drives one monitoring session at a time against a status source.
///
/// Starting a new session always cancels the previous one. Every poll response
/// carries the generation of the session that issued it, and responses from a
/// superseded session are dropped without touching the sink.
pub struct Monitor<S, L, K> {
    shared: Arc<Shared<S, L, K>>,
    generations: GenerationCounter,
    active: Option<ActiveSession>,
}

struct Shared<S, L, K> {
    config: MonitorConfig,
    source: S,
    loader: L,
    sink: K,
}

#[derive(Debug)]
struct ActiveSession {
    task_id: Arc<str>,
    generation: Generation,
    task: JoinHandle<Option<Outcome>>,
}

impl<S, L, K> Monitor<S, L, K>
where
    S: StatusSource,
    L: ResultLoader,
    K: Sink,
{
    /// Create an idle monitor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: MonitorConfig, source: S, loader: L, sink: K) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                source,
                loader,
                sink,
            }),
            generations: GenerationCounter::new(),
            active: None,
        })
    }

    /// Begin monitoring `task_id`, cancelling any session already in progress.
    ///
    /// The first poll happens one interval from now. Must be called from within a Tokio runtime.
    pub fn start(&mut self, task_id: impl Into<Arc<str>>) -> Generation {
        self.stop();

        let task_id = task_id.into();
        let generation = self.generations.advance();
        log::info!(target: LOG_TARGET, "monitoring task '{task_id}'");

        let session = PollSession::new(Arc::clone(&task_id), generation);
        let task = tokio::spawn(run_session(Arc::clone(&self.shared), self.generations.clone(), session));

        self.active = Some(ActiveSession {
            task_id,
            generation,
            task,
        });

        generation
    }
}

impl<S, L, K> Monitor<S, L, K> {
    /// Cancel the current session, if any.
    ///
    /// Once this returns, the cancelled session makes no further sink calls and
    /// never invokes the result loader. Calling it with no active session is a no-op.
    pub fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let _ = self.generations.advance();
        active.task.abort();
        log::debug!(target: LOG_TARGET, "stopped monitoring task '{}'", active.task_id);
    }

    /// Returns `true` while a session is polling or handing off its result.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|active| !active.task.is_finished())
    }

    /// The task being monitored by the current session.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.active.as_ref().map(|active| &*active.task_id)
    }

    /// The generation of the current session.
    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|active| active.generation)
    }

    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    /// Wait for the current session to end.
    ///
    /// Returns `None` if there is no session or the session was superseded before finishing.
    pub async fn wait(&mut self) -> Option<Outcome> {
        let active = self.active.take()?;

        match active.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_panic() {
                    log::error!(target: LOG_TARGET, "monitoring task '{}' panicked", active.task_id);
                }
                None
            }
        }
    }
}

impl<S, L, K> Drop for Monitor<S, L, K> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S, L, K> Debug for Monitor<S, L, K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("config", &self.shared.config)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

async fn run_session<S, L, K>(shared: Arc<Shared<S, L, K>>, generations: GenerationCounter, mut session: PollSession) -> Option<Outcome>
where
    S: StatusSource,
    L: ResultLoader,
    K: Sink,
{
    let config = &shared.config;
    let generation = session.generation();

    let mut ticker = time::interval_at(Instant::now() + config.poll_interval, config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let _ = ticker.tick().await;
        let response = shared.source.fetch_status(session.task_id()).await;

        // the next poll is one full interval after this one ended
        ticker.reset();

        let Some(_current) = generations.enter(generation) else {
            log::debug!(target: LOG_TARGET, "dropping stale response for task '{}'", session.task_id());
            return None;
        };

        let tick = session.observe(response, config)?;

        if let Some(update) = &tick.render {
            if update.stage_changed {
                shared.sink.render_stage(update.stage, config.stages.len());
            }
            shared.sink.render_progress(update.progress, &update.message);
        }

        match tick.verdict {
            Verdict::Continue => {}
            Verdict::Completed => break,
            Verdict::Failed(outcome) => {
                log::warn!(target: LOG_TARGET, "task '{}': {outcome}", session.task_id());
                shared.sink.close_progress();
                shared.sink.notify(outcome.user_message(), outcome.severity());
                return Some(outcome);
            }
        }
    }

    drop(ticker);
    log::info!(
        target: LOG_TARGET,
        "task '{}' completed after {} polls",
        session.task_id(),
        session.poll_count()
    );

    hand_off(&*shared, &generations, &session).await
}

async fn hand_off<S, L, K>(shared: &Shared<S, L, K>, generations: &GenerationCounter, session: &PollSession) -> Option<Outcome>
where
    L: ResultLoader,
    K: Sink,
{
    let generation = session.generation();

    if !shared.config.settle_delay.is_zero() {
        time::sleep(shared.config.settle_delay).await;
    }

    if !generations.is_current(generation) {
        log::debug!(target: LOG_TARGET, "result hand-off for task '{}' cancelled", session.task_id());
        return None;
    }

    let result = shared.loader.load_result(session.task_id()).await;

    let _current = generations.enter(generation)?;
    shared.sink.close_progress();

    match result {
        Ok(report) => {
            shared.sink.render_dashboard(&report);
            let outcome = Outcome::Completed;
            shared.sink.notify(outcome.user_message(), Severity::Success);
            Some(outcome)
        }

        Err(e) => {
            log::error!(target: LOG_TARGET, "could not load result for task '{}': {e:#}", session.task_id());
            let outcome = Outcome::ResultLoadFailed {
                reason: format!("{e:#}"),
            };
            shared.sink.notify(outcome.user_message(), outcome.severity());
            Some(outcome)
        }
    }
}
