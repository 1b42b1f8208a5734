//! Datadog API surface.
//!
//! The API layer is split into cohesive modules:
//! - `client`: endpoint methods and HTTP dispatch
//! - `executor`: retry policy and failure classification around each call
//! - `types`: serde models for the payloads the CLI renders

pub mod client;
pub mod executor;
pub mod types;

pub use client::{parse_retry_after_secs, DatadogClient};
pub use executor::{execute, execute_with_cancel, CallOutcome, RetryPolicy};
