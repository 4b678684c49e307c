#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for flow-watch
//!
//! This library consolidates all functionality for the flow-watch tool, which
//! submits bank-statement processing jobs to a backend and follows them to
//! completion, narrating progress along the way.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`api`]: Wire types and the HTTP client for the backend
//! - [`monitor`]: Polling state machine and session lifecycle
//! - [`narrator`]: Mapping from progress percentages to stage narration
//! - [`sink`]: Presentation of progress, notifications, and results
//! - [`report`]: The finished task's data, its dashboard text, and JSON export

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod api;
pub mod monitor;
pub mod narrator;
pub mod report;
pub mod sink;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub use crate::commands::{Host, run};
