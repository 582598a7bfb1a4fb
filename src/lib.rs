//! Client library for the Treeherder CI reporting service.
//!
//! ```no_run
//! # async fn run() -> lumberjack::Result<()> {
//! use lumberjack::client::{JobQuery, TreeherderClient, DEFAULT_SERVER_URL};
//!
//! let client = TreeherderClient::new(DEFAULT_SERVER_URL)?;
//! let jobs = client.jobs("mozilla-central", &JobQuery::for_push(1_234_567)).await?;
//! println!("{} jobs", jobs.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod filters;
pub mod log_search;
pub mod models;
pub mod snapshot;

pub use client::TreeherderClient;
pub use error::{Result, TreeherderError};
