//! Typed access to the Treeherder REST API.
//!
//! Every resource is exposed twice: an `async` method for callers running on
//! a Tokio runtime and a `_blocking` twin for plain synchronous code. Both
//! share URL construction, pagination state and response decoding.

mod core;
mod diagnostics;
mod failures;
mod jobs;
pub mod pagination;
mod performance;
mod pushes;
mod repositories;

pub use self::core::{TreeherderClient, DEFAULT_SERVER_URL};
pub use failures::{FailureQuery, DEFAULT_FAILURE_DAYS};
pub use jobs::{JobQuery, DEFAULT_JOB_COUNT};
pub use pagination::{clamp_count, MAX_COUNT};
pub use performance::{AlertSummaryQuery, DEFAULT_ALERT_LIMIT};
pub use pushes::{PushQuery, DEFAULT_PUSH_COUNT};
