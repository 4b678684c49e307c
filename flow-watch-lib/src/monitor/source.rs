use crate::Result;
use crate::api::StatusReport;
use crate::report::TaskReport;
use std::sync::Arc;

/// What one status request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPoll {
    /// The backend described the task.
    Answered(StatusReport),

    /// The backend did not answer within the request's time allowance.
    ///
    /// The poll still counts toward the poll ceiling, but not toward the
    /// consecutive-error ceiling: a slow backend is not a failing one.
    Unanswered,
}

impl From<StatusReport> for StatusPoll {
    fn from(report: StatusReport) -> Self {
        Self::Answered(report)
    }
}

/// Answers "what is this task doing right now?".
///
/// Any error returned here is treated as a transient transport failure by the
/// monitor and counted toward the consecutive-error ceiling.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_status(&self, task_id: &str) -> impl Future<Output = Result<StatusPoll>> + Send;
}

/// Fetches the artifact of a completed task. Called at most once per session.
pub trait ResultLoader: Send + Sync + 'static {
    fn load_result(&self, task_id: &str) -> impl Future<Output = Result<TaskReport>> + Send;
}

impl<T: StatusSource> StatusSource for Arc<T> {
    fn fetch_status(&self, task_id: &str) -> impl Future<Output = Result<StatusPoll>> + Send {
        (**self).fetch_status(task_id)
    }
}

impl<T: ResultLoader> ResultLoader for Arc<T> {
    fn load_result(&self, task_id: &str) -> impl Future<Output = Result<TaskReport>> + Send {
        (**self).load_result(task_id)
    }
}
