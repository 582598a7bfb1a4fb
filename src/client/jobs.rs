use log::info;
use url::Url;

use super::core::{with_params, Params, TreeherderClient};
use super::pagination::{clamp_count, OffsetPager, PageRequest, MAX_COUNT};
use crate::error::{Result, TreeherderError};
use crate::models::{Job, JobState, ResultsPage, SimilarJob};

pub const DEFAULT_JOB_COUNT: usize = 20;

/// Filters for the job list endpoint.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    /// `None` means "as many as makes sense": everything (up to
    /// [`MAX_COUNT`]) for a push, [`DEFAULT_JOB_COUNT`] otherwise.
    pub count: Option<usize>,
    pub push_id: Option<u64>,
    pub job_guid: Option<String>,
    pub result: Option<String>,
    pub state: Option<JobState>,
    pub tier: Option<u8>,
}

impl JobQuery {
    pub fn for_push(push_id: u64) -> Self {
        Self {
            push_id: Some(push_id),
            ..Self::default()
        }
    }

    pub fn effective_count(&self) -> usize {
        match (self.count, self.push_id) {
            (Some(count), _) => clamp_count(count),
            (None, Some(_)) => MAX_COUNT,
            (None, None) => DEFAULT_JOB_COUNT,
        }
    }

    fn params(&self, page: PageRequest) -> Params {
        let mut params = vec![
            ("count", page.count.to_string()),
            ("offset", page.offset.to_string()),
        ];
        if let Some(push_id) = self.push_id {
            params.push(("push_id", push_id.to_string()));
        }
        if let Some(guid) = &self.job_guid {
            params.push(("job_guid", guid.clone()));
        }
        if let Some(result) = &self.result {
            params.push(("result", result.clone()));
        }
        if let Some(state) = self.state {
            params.push(("state", state.as_str().to_string()));
        }
        if let Some(tier) = self.tier {
            params.push(("tier", tier.to_string()));
        }
        params
    }
}

impl TreeherderClient {
    fn jobs_page_url(&self, project: &str, query: &JobQuery, page: PageRequest) -> Result<Url> {
        Ok(with_params(
            self.project_url(project, "jobs")?,
            &query.params(page),
        ))
    }

    fn similar_jobs_page_url(&self, project: &str, job_id: u64, page: PageRequest) -> Result<Url> {
        Ok(with_params(
            self.project_url(project, &format!("jobs/{job_id}/similar_jobs"))?,
            &[
                ("count", page.count.to_string()),
                ("offset", page.offset.to_string()),
            ],
        ))
    }

    pub async fn jobs(&self, project: &str, query: &JobQuery) -> Result<Vec<Job>> {
        let mut pager = OffsetPager::new(query.effective_count(), self.page_size());
        while let Some(page) = pager.next_request() {
            let response: ResultsPage<Job> = self
                .get_json(self.jobs_page_url(project, query, page)?)
                .await?;
            pager.record(page, response.results);
        }

        let jobs = pager.finish();
        info!("Fetched {} jobs for {project}", jobs.len());
        Ok(jobs)
    }

    pub fn jobs_blocking(&self, project: &str, query: &JobQuery) -> Result<Vec<Job>> {
        let mut pager = OffsetPager::new(query.effective_count(), self.page_size());
        while let Some(page) = pager.next_request() {
            let response: ResultsPage<Job> =
                self.get_json_blocking(self.jobs_page_url(project, query, page)?)?;
            pager.record(page, response.results);
        }

        let jobs = pager.finish();
        info!("Fetched {} jobs for {project}", jobs.len());
        Ok(jobs)
    }

    pub async fn job(&self, project: &str, job_id: u64) -> Result<Job> {
        self.get_json(self.project_url(project, &format!("jobs/{job_id}"))?)
            .await
    }

    pub fn job_blocking(&self, project: &str, job_id: u64) -> Result<Job> {
        self.get_json_blocking(self.project_url(project, &format!("jobs/{job_id}"))?)
    }

    pub async fn job_by_guid(&self, project: &str, guid: &str) -> Result<Job> {
        let jobs = self.jobs(project, &guid_query(guid)).await?;
        first_or_not_found(jobs, guid)
    }

    pub fn job_by_guid_blocking(&self, project: &str, guid: &str) -> Result<Job> {
        let jobs = self.jobs_blocking(project, &guid_query(guid))?;
        first_or_not_found(jobs, guid)
    }

    /// Earlier runs of the same job type, newest first.
    pub async fn similar_jobs(
        &self,
        project: &str,
        job_id: u64,
        count: usize,
    ) -> Result<Vec<SimilarJob>> {
        let mut pager = OffsetPager::new(count, self.page_size());
        while let Some(page) = pager.next_request() {
            let response: ResultsPage<SimilarJob> = self
                .get_json(self.similar_jobs_page_url(project, job_id, page)?)
                .await?;
            pager.record(page, response.results);
        }
        Ok(pager.finish())
    }

    pub fn similar_jobs_blocking(
        &self,
        project: &str,
        job_id: u64,
        count: usize,
    ) -> Result<Vec<SimilarJob>> {
        let mut pager = OffsetPager::new(count, self.page_size());
        while let Some(page) = pager.next_request() {
            let response: ResultsPage<SimilarJob> =
                self.get_json_blocking(self.similar_jobs_page_url(project, job_id, page)?)?;
            pager.record(page, response.results);
        }
        Ok(pager.finish())
    }
}

fn guid_query(guid: &str) -> JobQuery {
    JobQuery {
        count: Some(1),
        job_guid: Some(guid.to_string()),
        ..JobQuery::default()
    }
}

fn first_or_not_found(jobs: Vec<Job>, guid: &str) -> Result<Job> {
    jobs.into_iter()
        .next()
        .ok_or_else(|| TreeherderError::NotFound {
            resource: "Job",
            id: guid.to_string(),
        })
}
