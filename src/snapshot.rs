//! Point-in-time view of a push's jobs, and the difference between two views.

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{Job, JobResult, JobState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub id: u64,
    pub name: String,
    pub platform: String,
    pub state: JobState,
    pub result: JobResult,
}

impl From<&Job> for JobStatus {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            name: job.job_type_name.clone(),
            platform: job.platform.clone(),
            state: job.state,
            result: job.result.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub before: JobStatus,
    pub after: JobStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotDiff {
    pub added: Vec<JobStatus>,
    pub changed: Vec<StatusChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty()
    }
}

/// Jobs keyed by id, in the order the server listed them.
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
    jobs: IndexMap<u64, JobStatus>,
}

impl JobSnapshot {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        Self {
            jobs: jobs.iter().map(|job| (job.id, JobStatus::from(job))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// True once there is at least one job and every job has completed.
    pub fn is_complete(&self) -> bool {
        !self.jobs.is_empty()
            && self
                .jobs
                .values()
                .all(|status| status.state == JobState::Completed)
    }

    pub fn count_in_state(&self, state: JobState) -> usize {
        self.jobs.values().filter(|s| s.state == state).count()
    }

    pub fn count_failed(&self) -> usize {
        self.jobs.values().filter(|s| s.result.is_failure()).count()
    }

    /// Jobs that appeared in `next`, and jobs whose state or result moved.
    /// Jobs missing from `next` are not reported.
    pub fn diff(&self, next: &Self) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();

        for (id, after) in &next.jobs {
            match self.jobs.get(id) {
                None => diff.added.push(after.clone()),
                Some(before) if before.state != after.state || before.result != after.result => {
                    diff.changed.push(StatusChange {
                        before: before.clone(),
                        after: after.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        diff
    }
}
