use url::Url;

use super::core::{with_params, TreeherderClient};
use crate::error::{Result, TreeherderError};
use crate::models::{BugSuggestion, JobLogUrl, TextLogError};

impl TreeherderClient {
    fn job_log_urls_url(&self, project: &str, job_id: u64) -> Result<Url> {
        Ok(with_params(
            self.project_url(project, "job-log-url")?,
            &[("job_id", job_id.to_string())],
        ))
    }

    pub async fn job_log_urls(&self, project: &str, job_id: u64) -> Result<Vec<JobLogUrl>> {
        self.get_json(self.job_log_urls_url(project, job_id)?).await
    }

    pub fn job_log_urls_blocking(&self, project: &str, job_id: u64) -> Result<Vec<JobLogUrl>> {
        self.get_json_blocking(self.job_log_urls_url(project, job_id)?)
    }

    pub async fn text_log_errors(&self, project: &str, job_id: u64) -> Result<Vec<TextLogError>> {
        self.get_json(self.project_url(project, &format!("jobs/{job_id}/text_log_errors"))?)
            .await
    }

    pub fn text_log_errors_blocking(
        &self,
        project: &str,
        job_id: u64,
    ) -> Result<Vec<TextLogError>> {
        self.get_json_blocking(
            self.project_url(project, &format!("jobs/{job_id}/text_log_errors"))?,
        )
    }

    pub async fn bug_suggestions(&self, project: &str, job_id: u64) -> Result<Vec<BugSuggestion>> {
        self.get_json(self.project_url(project, &format!("jobs/{job_id}/bug_suggestions"))?)
            .await
    }

    pub fn bug_suggestions_blocking(
        &self,
        project: &str,
        job_id: u64,
    ) -> Result<Vec<BugSuggestion>> {
        self.get_json_blocking(
            self.project_url(project, &format!("jobs/{job_id}/bug_suggestions"))?,
        )
    }

    /// Downloads a raw log. Logs usually live on a different host than the
    /// API, so this takes the absolute URL from a [`JobLogUrl`].
    pub async fn log_text(&self, log_url: &str) -> Result<String> {
        self.get_text(parse_log_url(log_url)?).await
    }

    pub fn log_text_blocking(&self, log_url: &str) -> Result<String> {
        self.get_text_blocking(parse_log_url(log_url)?)
    }
}

fn parse_log_url(log_url: &str) -> Result<Url> {
    Url::parse(log_url).map_err(|e| TreeherderError::Config(format!("Invalid log URL {log_url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_job_log_urls() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/project/autoland/job-log-url/")
            .match_query(Matcher::UrlEncoded("job_id".into(), "7".into()))
            .with_status(200)
            .with_body(
                json!([
                    {"id": 1, "job_id": 7, "name": "live_backing_log",
                     "url": "https://logs.example.com/live_backing.log", "parse_status": "parsed"},
                    {"id": 2, "job_id": 7, "name": "errorsummary_json",
                     "url": "https://logs.example.com/errorsummary.log"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let logs = client.job_log_urls("autoland", 7).await.unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].parse_status, "parsed");
        assert_eq!(logs[1].parse_status, "");
    }

    #[test]
    fn test_text_log_errors_and_suggestions_blocking() {
        let mut server = Server::new();
        let _errors = server
            .mock("GET", "/api/project/autoland/jobs/7/text_log_errors/")
            .with_status(200)
            .with_body(
                json!([{"id": 11, "line": "TEST-UNEXPECTED-FAIL | a.html | boom", "line_number": 301, "job": 7}])
                    .to_string(),
            )
            .create();
        let _suggestions = server
            .mock("GET", "/api/project/autoland/jobs/7/bug_suggestions/")
            .with_status(200)
            .with_body(
                json!([{"search": "TEST-UNEXPECTED-FAIL | a.html | boom",
                        "bugs": {"open_recent": [{"id": 123, "summary": "Intermittent a.html"}], "all_others": []}}])
                    .to_string(),
            )
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let errors = client.text_log_errors_blocking("autoland", 7).unwrap();
        let suggestions = client.bug_suggestions_blocking("autoland", 7).unwrap();

        assert_eq!(errors[0].line_number, 301);
        assert_eq!(suggestions[0].bugs.open_recent[0].id, 123);
    }

    #[tokio::test]
    async fn test_log_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/logs/live_backing.log")
            .with_status(200)
            .with_body("line one\nline two\n")
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let text = client
            .log_text(&format!("{}/logs/live_backing.log", server.url()))
            .await
            .unwrap();

        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_log_is_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/logs/gone.log")
            .with_status(410)
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let err = client
            .log_text(&format!("{}/logs/gone.log", server.url()))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(410));
    }

    #[test]
    fn test_job_log_urls_blocking() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/project/autoland/job-log-url/")
            .match_query(Matcher::UrlEncoded("job_id".into(), "7".into()))
            .with_status(200)
            .with_body(
                json!([{"id": 1, "job_id": 7, "name": "live_backing_log",
                        "url": "https://logs.example.com/live_backing.log"}])
                .to_string(),
            )
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let logs = client.job_log_urls_blocking("autoland", 7).unwrap();

        mock.assert();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].name, "live_backing_log");
    }

    #[test]
    fn test_log_text_blocking() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/logs/live_backing.log")
            .with_status(200)
            .with_body("[taskcluster] starting\nTEST-UNEXPECTED-FAIL\n")
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let text = client
            .log_text_blocking(&format!("{}/logs/live_backing.log", server.url()))
            .unwrap();

        assert!(text.contains("TEST-UNEXPECTED-FAIL"));
    }

    #[test]
    fn test_missing_log_blocking_is_http_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/logs/gone.log")
            .with_status(404)
            .with_body(r#"{"detail": "Not found."}"#)
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let err = client
            .log_text_blocking(&format!("{}/logs/gone.log", server.url()))
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Not found."));
    }

    #[test]
    fn test_log_text_blocking_rejects_relative_url() {
        let client = TreeherderClient::new("http://127.0.0.1:9").unwrap();
        let err = client.log_text_blocking("logs/live.log").unwrap_err();

        assert!(matches!(err, TreeherderError::Config(_)));
        assert!(!client.has_blocking_transport());
    }
}
