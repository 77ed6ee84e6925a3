#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared job model, wire types and job store backends for the notification
//! gateway and its workers.

/// Request and response bodies of the gateway's HTTP API.
pub mod api;
/// Broker connection settings.
pub mod config;
/// SurrealDB-backed job store.
pub mod db;
/// Process-local job store.
pub mod memory;
/// Job record and lifecycle.
pub mod model;
pub mod store;

mod util;

pub use config::BrokerConfig;
pub use db::SurrealStore;
pub use memory::InMemoryStore;
pub use model::{Job, JobId, JobOutcome, JobState, JobStatusView};
pub use store::{JobStore, StoreError};
pub use util::{new_ulid, now_ms};
