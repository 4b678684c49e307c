use crate::Result;
use chrono::{Days, NaiveDate};
use core::fmt::{Debug, Formatter};
use ohno::bail;
use serde::{Deserialize, Serialize};

/// Look-back used when no date range is given.
pub const DEFAULT_RANGE_DAYS: u64 = 365;

/// Mailbox credentials used to open a backend session.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters of a statement-processing job.
#[derive(Clone, Serialize)]
pub struct ProcessRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub pdf_password: String,
}

impl ProcessRequest {
    /// Build a request covering `[from_date, to_date]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or the password is empty.
    pub fn new(from_date: NaiveDate, to_date: NaiveDate, pdf_password: impl Into<String>) -> Result<Self> {
        let pdf_password = pdf_password.into();
        if from_date > to_date {
            bail!("start date {from_date} is after end date {to_date}");
        }
        if pdf_password.is_empty() {
            bail!("a PDF password is required");
        }

        Ok(Self {
            from_date,
            to_date,
            pdf_password,
        })
    }

    /// Build a request covering the `days` days up to and including `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range cannot be represented or the password is empty.
    pub fn for_last_days(days: u64, today: NaiveDate, pdf_password: impl Into<String>) -> Result<Self> {
        let Some(from_date) = today.checked_sub_days(Days::new(days)) else {
            bail!("cannot go back {days} days from {today}");
        };
        Self::new(from_date, today, pdf_password)
    }
}

impl Debug for ProcessRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProcessRequest")
            .field("from_date", &self.from_date)
            .field("to_date", &self.to_date)
            .field("pdf_password", &"<redacted>")
            .finish()
    }
}

/// Reply shared by the authentication and submission endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AckResponse {
    pub success: bool,
    pub message: Option<String>,
    pub task_id: Option<String>,
}
