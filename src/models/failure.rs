use serde::{Deserialize, Serialize};

/// An error line extracted from a job's log by Treeherder's log parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLogError {
    pub id: u64,
    pub line: String,
    pub line_number: u64,
    #[serde(default)]
    pub job: Option<u64>,
}

/// A Bugzilla bug that matched an error line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugMatch {
    pub id: u64,
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub dupe_of: Option<u64>,
    #[serde(default)]
    pub crash_signature: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub whiteboard: String,
    #[serde(default)]
    pub occurrences: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugSuggestionBugs {
    #[serde(default)]
    pub open_recent: Vec<BugMatch>,
    #[serde(default)]
    pub all_others: Vec<BugMatch>,
}

/// Candidate bugs for one failure line of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugSuggestion {
    /// The failure line that was searched for
    pub search: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub bugs: BugSuggestionBugs,
    #[serde(default)]
    pub line_number: Option<u64>,
    #[serde(default)]
    pub path_end: Option<String>,
    #[serde(default)]
    pub failure_new_in_rev: bool,
}

impl BugSuggestion {
    /// Open recent matches first, then everything else.
    pub fn all_bugs(&self) -> impl Iterator<Item = &BugMatch> {
        self.bugs.open_recent.iter().chain(self.bugs.all_others.iter())
    }
}

/// One classified failure occurrence for a bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureByBug {
    pub job_id: u64,
    pub bug_id: u64,
    #[serde(default)]
    pub push_time: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub test_suite: String,
    #[serde(default)]
    pub tree: String,
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// How a failure was classified, e.g. "intermittent" or "fixed by commit".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureClassification {
    pub id: u64,
    pub name: String,
}
