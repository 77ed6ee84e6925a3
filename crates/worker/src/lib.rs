#![forbid(unsafe_code)]

//! Notification worker: consumes queued jobs and records their outcome.

pub mod append_log;
pub mod task;
pub mod worker;

pub use append_log::AppendLog;
pub use task::{JobHandler, NotificationTask, TaskError};
pub use worker::Worker;
