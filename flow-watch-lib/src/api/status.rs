use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

/// Lifecycle state reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    Pending,

    /// Older backends report a running task as `processing`.
    #[serde(alias = "processing")]
    Running,

    Completed,
    Error,
}

/// One snapshot of a task as seen by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: TaskStatus,

    /// Completion percentage, clamped into `0..=100`.
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReport {
    #[must_use]
    pub fn new(status: TaskStatus, progress: u8) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The server's message, if present and not blank.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Accept any JSON number (or null) and clamp it into a percentage.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if value.is_nan() {
        return Ok(0);
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "value is clamped into 0..=100 first")]
    let progress = value.clamp(0.0, 100.0).round() as u8;
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_running() {
        let report: StatusReport = serde_json::from_str(r#"{"status": "running", "progress": 35, "message": "Scanning"}"#).unwrap();
        assert_eq!(report.status, TaskStatus::Running);
        assert_eq!(report.progress, 35);
        assert_eq!(report.message(), Some("Scanning"));
    }

    #[test]
    fn test_processing_is_running() {
        let report: StatusReport = serde_json::from_str(r#"{"status": "processing", "progress": 0}"#).unwrap();
        assert_eq!(report.status, TaskStatus::Running);
    }

    #[test]
    fn test_progress_is_clamped() {
        let high: StatusReport = serde_json::from_str(r#"{"status": "running", "progress": 250}"#).unwrap();
        assert_eq!(high.progress, 100);

        let low: StatusReport = serde_json::from_str(r#"{"status": "running", "progress": -4}"#).unwrap();
        assert_eq!(low.progress, 0);

        let fractional: StatusReport = serde_json::from_str(r#"{"status": "running", "progress": 54.6}"#).unwrap();
        assert_eq!(fractional.progress, 55);
    }

    #[test]
    fn test_missing_progress_is_zero() {
        let report: StatusReport = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(report.progress, 0);
        assert_eq!(report.message(), None);

        let null: StatusReport = serde_json::from_str(r#"{"status": "pending", "progress": null}"#).unwrap();
        assert_eq!(null.progress, 0);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<StatusReport>(r#"{"status": "not_found"}"#).is_err());
    }

    #[test]
    fn test_blank_message_is_none() {
        let report = StatusReport::new(TaskStatus::Running, 10).with_message("   ");
        assert_eq!(report.message(), None);
    }
}
