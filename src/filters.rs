//! Client-side filtering the API cannot do on its own.

use regex::Regex;

use crate::models::{FailureByBug, Job};

/// Regex and duration filters applied to fetched jobs.
#[derive(Debug, Default)]
pub struct JobFilter {
    platform: Option<Regex>,
    job_name: Option<Regex>,
    min_duration: Option<u64>,
    max_duration: Option<u64>,
}

impl JobFilter {
    pub fn new(platform: Option<&str>, job_name: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            platform: platform.map(Regex::new).transpose()?,
            job_name: job_name.map(Regex::new).transpose()?,
            min_duration: None,
            max_duration: None,
        })
    }

    /// Bounds in seconds. Jobs without a known duration never match a bound.
    #[must_use]
    pub fn with_duration(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_duration = min;
        self.max_duration = max;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.platform.is_none()
            && self.job_name.is_none()
            && self.min_duration.is_none()
            && self.max_duration.is_none()
    }

    pub fn matches(&self, job: &Job) -> bool {
        if let Some(platform) = &self.platform {
            if !platform.is_match(&job.platform) && !platform.is_match(&job.build_platform) {
                return false;
            }
        }

        if let Some(name) = &self.job_name {
            if !name.is_match(&job.job_type_name) {
                return false;
            }
        }

        if self.min_duration.is_some() || self.max_duration.is_some() {
            let Some(duration) = job.duration_seconds() else {
                return false;
            };
            if self.min_duration.is_some_and(|min| duration < min) {
                return false;
            }
            if self.max_duration.is_some_and(|max| duration > max) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        if self.is_empty() {
            return jobs;
        }
        jobs.into_iter().filter(|job| self.matches(job)).collect()
    }
}

/// Regex filters for failures-by-bug records.
#[derive(Debug, Default)]
pub struct FailureFilter {
    platform: Option<Regex>,
    build_type: Option<Regex>,
}

impl FailureFilter {
    pub fn new(platform: Option<&str>, build_type: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            platform: platform.map(Regex::new).transpose()?,
            build_type: build_type.map(Regex::new).transpose()?,
        })
    }

    pub fn matches(&self, failure: &FailureByBug) -> bool {
        self.platform
            .as_ref()
            .map_or(true, |re| re.is_match(&failure.platform))
            && self
                .build_type
                .as_ref()
                .map_or(true, |re| re.is_match(&failure.build_type))
    }

    pub fn apply(&self, failures: Vec<FailureByBug>) -> Vec<FailureByBug> {
        failures.into_iter().filter(|f| self.matches(f)).collect()
    }
}
