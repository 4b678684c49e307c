//! The result artifact of a completed task and the ways it is presented
//!
//! [`TaskReport`] mirrors the payload served by the result endpoint: the
//! categorized transactions, an aggregate summary, and a handful of generated
//! insights. [`console`] renders the completion dashboard as terminal text and
//! [`export`] writes the raw report to disk as JSON.

pub mod console;
pub mod export;
mod task_report;

pub use task_report::{CategoryTotal, DateRange, Insight, ReportMetadata, Summary, TaskReport, Transaction};
