use chrono::{Days, NaiveDate, Utc};
use url::Url;

use super::core::{with_params, Params, TreeherderClient};
use crate::error::{Result, TreeherderError};
use crate::models::FailureByBug;

pub const DEFAULT_FAILURE_DAYS: u64 = 7;

/// Classified failures for one bug over a range of days.
#[derive(Debug, Clone)]
pub struct FailureQuery {
    pub bug_id: u64,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    /// Repository name, or `all` / `trunk`
    pub tree: String,
}

impl FailureQuery {
    /// The `days` days up to and including today (UTC).
    pub fn last_days(bug_id: u64, days: u64) -> Result<Self> {
        Self::ending_on(bug_id, Utc::now().date_naive(), days)
    }

    /// The `days` days up to and including `end_day`. Fails when the range
    /// would start before the earliest representable date.
    pub fn ending_on(bug_id: u64, end_day: NaiveDate, days: u64) -> Result<Self> {
        let start_day = end_day.checked_sub_days(Days::new(days)).ok_or_else(|| {
            TreeherderError::Config(format!("Cannot go back {days} days from {end_day}"))
        })?;
        Ok(Self {
            bug_id,
            start_day,
            end_day,
            tree: "all".to_string(),
        })
    }

    fn params(&self) -> Params {
        vec![
            ("bug", self.bug_id.to_string()),
            ("startday", self.start_day.format("%Y-%m-%d").to_string()),
            ("endday", self.end_day.format("%Y-%m-%d").to_string()),
            ("tree", self.tree.clone()),
        ]
    }
}

impl TreeherderClient {
    fn failures_url(&self, query: &FailureQuery) -> Result<Url> {
        Ok(with_params(self.api_url("failuresbybug")?, &query.params()))
    }

    pub async fn failures_by_bug(&self, query: &FailureQuery) -> Result<Vec<FailureByBug>> {
        self.get_json(self.failures_url(query)?).await
    }

    pub fn failures_by_bug_blocking(&self, query: &FailureQuery) -> Result<Vec<FailureByBug>> {
        self.get_json_blocking(self.failures_url(query)?)
    }
}
