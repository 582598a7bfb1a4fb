//! Records mirroring Treeherder's JSON responses.
//!
//! Every record tolerates fields it does not know about, so new server-side
//! fields never break decoding. Fields the tool cannot work without are
//! required; everything else falls back to a default.

mod failure;
mod job;
mod page;
mod performance;
mod push;
mod repository;

pub use failure::{
    BugMatch, BugSuggestion, BugSuggestionBugs, FailureByBug, FailureClassification, TextLogError,
};
pub use job::{Job, JobLogUrl, JobResult, JobState, SimilarJob};
pub use page::{CursorPage, PageMeta, ResultsPage};
pub use performance::{
    PerformanceAlert, PerformanceAlertSummary, PerformanceFramework, PerformanceSignature,
};
pub use push::{Push, Revision};
pub use repository::{DvcsType, Repository, RepositoryGroup};
