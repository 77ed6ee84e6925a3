#![forbid(unsafe_code)]

//! HTTP gateway: submits notification jobs and reports their status.

pub mod error;
pub mod http;
pub mod service;

pub use error::ApiError;
pub use http::router;
pub use service::{JobHandle, NotificationService};
