//! Moves tabular data from a Google Sheets range into a BigQuery table.
//!
//! One invocation performs one full pass: authenticate, read the whole range,
//! normalize it into a typed columnar table, make sure the destination dataset
//! and table exist, then append every row through a load job. Scheduling and
//! retries live outside this crate; the binary just exits non-zero on failure.

pub mod auth;
pub mod bq;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sheets;
pub mod table;

pub use error::{PipelineError, Result};
