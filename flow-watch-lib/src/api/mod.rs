//! Wire types and HTTP client for the statement-processing backend
//!
//! The backend exposes four JSON endpoints:
//!
//! - `POST /authenticate` opens a cookie-backed session for a mailbox.
//! - `POST /api/process-statements` starts a job and returns its task id.
//! - `GET /api/processing-status/{id}` reports `{status, progress, message}`.
//! - `GET /api/transactions/{id}` returns the finished [`TaskReport`](crate::report::TaskReport),
//!   or `{error}` if there is none.
//!
//! [`ApiClient`] implements both [`StatusSource`](crate::monitor::StatusSource) and
//! [`ResultLoader`](crate::monitor::ResultLoader), so it plugs straight into a monitor.

mod client;
mod status;
mod submission;

pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT};
pub use status::{StatusReport, TaskStatus};
pub use submission::{AckResponse, Credentials, DEFAULT_RANGE_DAYS, ProcessRequest};
