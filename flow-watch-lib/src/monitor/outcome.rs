use crate::sink::Severity;
use core::fmt::{Display, Formatter};

const SUCCESS_MESSAGE: &str = "Analysis completed successfully!";
const SERVER_ERROR_FALLBACK: &str = "Processing failed";
const ERROR_THRESHOLD_MESSAGE: &str = "Unable to check processing status. Please refresh and try again.";
const TIMEOUT_MESSAGE: &str = "Processing is taking longer than expected. Please try again.";
const RESULT_LOAD_MESSAGE: &str = "Error loading dashboard data";

/// How a monitoring session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The task completed and its result was loaded and rendered.
    Completed,

    /// The server reported the task as failed.
    ServerError { message: Option<String> },

    /// Too many consecutive polls failed to produce a usable status.
    ErrorThreshold { failures: u32 },

    /// The poll ceiling was exceeded without the task finishing. The task may still be running.
    TimedOut { polls: u32 },

    /// The task completed but its result could not be loaded.
    ResultLoadFailed { reason: String },
}

impl Outcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Text shown to the user when the session ends.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Completed => SUCCESS_MESSAGE,
            Self::ServerError { message } => message.as_deref().unwrap_or(SERVER_ERROR_FALLBACK),
            Self::ErrorThreshold { .. } => ERROR_THRESHOLD_MESSAGE,
            Self::TimedOut { .. } => TIMEOUT_MESSAGE,
            Self::ResultLoadFailed { .. } => RESULT_LOAD_MESSAGE,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Completed => Severity::Success,
            Self::TimedOut { .. } => Severity::Warning,
            Self::ServerError { .. } | Self::ErrorThreshold { .. } | Self::ResultLoadFailed { .. } => Severity::Error,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::ServerError { message: Some(message) } => write!(f, "server reported an error: {message}"),
            Self::ServerError { message: None } => write!(f, "server reported an error"),
            Self::ErrorThreshold { failures } => write!(f, "gave up after {failures} consecutive failed polls"),
            Self::TimedOut { polls } => write!(f, "timed out after {polls} polls"),
            Self::ResultLoadFailed { reason } => write!(f, "result could not be loaded: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_completed_is_success() {
        assert!(Outcome::Completed.is_success());
        assert!(!Outcome::TimedOut { polls: 61 }.is_success());
        assert!(!Outcome::ResultLoadFailed { reason: "x".into() }.is_success());
    }

    #[test]
    fn test_server_message_is_forwarded() {
        let outcome = Outcome::ServerError {
            message: Some("Processing failed: bad password".into()),
        };
        assert_eq!(outcome.user_message(), "Processing failed: bad password");
        assert_eq!(Outcome::ServerError { message: None }.user_message(), SERVER_ERROR_FALLBACK);
    }

    #[test]
    fn test_threshold_and_server_error_messages_differ() {
        let threshold = Outcome::ErrorThreshold { failures: 31 };
        let server = Outcome::ServerError { message: None };
        assert_ne!(threshold.user_message(), server.user_message());
    }

    #[test]
    fn test_timeout_is_advisory() {
        assert_eq!(Outcome::TimedOut { polls: 61 }.severity(), Severity::Warning);
        assert_eq!(Outcome::ErrorThreshold { failures: 31 }.severity(), Severity::Error);
    }

    #[test]
    fn test_display() {
        assert_eq!(Outcome::TimedOut { polls: 61 }.to_string(), "timed out after 61 polls");
    }
}
