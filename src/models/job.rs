use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling state of a job.
///
/// The set is closed: a state outside it is a decode error. `unscheduled`
/// is rarely documented but is sent for jobs that have not been given a
/// schedule yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Unscheduled,
    Pending,
    Running,
    Completed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unscheduled" => Ok(Self::Unscheduled),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unknown job state '{other}', expected unscheduled, pending, running or completed"
            )),
        }
    }
}

/// Outcome of a job. Results the tool does not know yet are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobResult {
    Success,
    TestFailed,
    Busted,
    Exception,
    Retry,
    UserCancel,
    Superseded,
    #[default]
    Unknown,
    Other(String),
}

impl JobResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::TestFailed => "testfailed",
            Self::Busted => "busted",
            Self::Exception => "exception",
            Self::Retry => "retry",
            Self::UserCancel => "usercancel",
            Self::Superseded => "superseded",
            Self::Unknown => "unknown",
            Self::Other(other) => other,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TestFailed | Self::Busted | Self::Exception)
    }
}

impl From<String> for JobResult {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "testfailed" => Self::TestFailed,
            "busted" => Self::Busted,
            "exception" => Self::Exception,
            "retry" => Self::Retry,
            "usercancel" => Self::UserCancel,
            "superseded" => Self::Superseded,
            "unknown" => Self::Unknown,
            _ => Self::Other(value),
        }
    }
}

impl From<JobResult> for String {
    fn from(value: JobResult) -> Self {
        match value {
            JobResult::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives a duration from a start/end pair of Unix timestamps.
///
/// Treeherder reports `0` for timestamps that have not happened yet.
fn span_seconds(start: i64, end: i64) -> Option<u64> {
    if start <= 0 || end < start {
        return None;
    }
    u64::try_from(end - start).ok()
}

/// A job (task) run against a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub job_guid: String,
    pub push_id: u64,
    pub state: JobState,
    #[serde(default)]
    pub result: JobResult,
    #[serde(default)]
    pub tier: u8,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub platform_option: String,
    #[serde(default)]
    pub build_platform: String,
    #[serde(default)]
    pub job_group_name: String,
    #[serde(default)]
    pub job_group_symbol: String,
    #[serde(default)]
    pub job_type_name: String,
    #[serde(default)]
    pub job_type_symbol: String,
    #[serde(default)]
    pub submit_timestamp: i64,
    #[serde(default)]
    pub start_timestamp: i64,
    #[serde(default)]
    pub end_timestamp: i64,
    #[serde(default)]
    pub failure_classification_id: Option<u64>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub who: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub retry_id: u32,
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub option_collection_hash: String,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub ref_data_name: String,
}

impl Job {
    /// Wall-clock run time, available once the job has started and ended.
    pub fn duration_seconds(&self) -> Option<u64> {
        span_seconds(self.start_timestamp, self.end_timestamp)
    }

    /// Symbol as shown on Treeherder, e.g. `M(1)`.
    pub fn symbol(&self) -> String {
        if self.job_group_symbol.is_empty() || self.job_group_symbol == "?" {
            self.job_type_symbol.clone()
        } else {
            format!("{}({})", self.job_group_symbol, self.job_type_symbol)
        }
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        moment(self.submit_timestamp)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        moment(self.start_timestamp)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        moment(self.end_timestamp)
    }
}

/// Treeherder reports moments that have not happened yet as 0.
fn moment(timestamp: i64) -> Option<DateTime<Utc>> {
    (timestamp > 0)
        .then(|| DateTime::from_timestamp(timestamp, 0))
        .flatten()
}

/// Log attached to a job, e.g. `live_backing_log` or `errorsummary_json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogUrl {
    pub id: u64,
    pub job_id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub parse_status: String,
}

/// Earlier run of the same job type, as returned by `similar_jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarJob {
    pub id: u64,
    pub push_id: u64,
    #[serde(default)]
    pub result: JobResult,
    #[serde(default)]
    pub state: Option<JobState>,
    #[serde(default)]
    pub build_platform: String,
    #[serde(default)]
    pub job_type_name: String,
    #[serde(default)]
    pub submit_timestamp: i64,
    #[serde(default)]
    pub start_timestamp: i64,
    #[serde(default)]
    pub end_timestamp: i64,
    #[serde(default)]
    pub failure_classification_id: Option<u64>,
}

impl SimilarJob {
    pub fn duration_seconds(&self) -> Option<u64> {
        span_seconds(self.start_timestamp, self.end_timestamp)
    }
}
