use log::info;
use url::Url;

use super::core::{with_params, Params, TreeherderClient};
use super::pagination::{clamp_count, CursorPager};
use crate::error::Result;
use crate::models::{CursorPage, PerformanceAlertSummary, PerformanceFramework};

pub const DEFAULT_ALERT_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct AlertSummaryQuery {
    pub repository: Option<String>,
    pub framework: Option<u64>,
    pub limit: usize,
}

impl Default for AlertSummaryQuery {
    fn default() -> Self {
        Self {
            repository: None,
            framework: None,
            limit: DEFAULT_ALERT_LIMIT,
        }
    }
}

impl AlertSummaryQuery {
    fn params(&self) -> Params {
        let mut params = vec![("limit", clamp_count(self.limit).to_string())];
        if let Some(repository) = &self.repository {
            params.push(("repository", repository.clone()));
        }
        if let Some(framework) = self.framework {
            params.push(("framework", framework.to_string()));
        }
        params
    }
}

impl TreeherderClient {
    fn alert_summaries_url(&self, query: &AlertSummaryQuery) -> Result<Url> {
        Ok(with_params(
            self.api_url("performance/alertsummary")?,
            &query.params(),
        ))
    }

    /// Newest summaries first, following `next` links until `limit` is met.
    pub async fn performance_alert_summaries(
        &self,
        query: &AlertSummaryQuery,
    ) -> Result<Vec<PerformanceAlertSummary>> {
        let mut pager = CursorPager::new(self.alert_summaries_url(query)?, query.limit);
        while let Some(url) = pager.next_url() {
            let page: CursorPage<PerformanceAlertSummary> = self.get_json(url).await?;
            pager.record(page);
        }

        let summaries = pager.finish();
        info!("Fetched {} performance alert summaries", summaries.len());
        Ok(summaries)
    }

    pub fn performance_alert_summaries_blocking(
        &self,
        query: &AlertSummaryQuery,
    ) -> Result<Vec<PerformanceAlertSummary>> {
        let mut pager = CursorPager::new(self.alert_summaries_url(query)?, query.limit);
        while let Some(url) = pager.next_url() {
            let page: CursorPage<PerformanceAlertSummary> = self.get_json_blocking(url)?;
            pager.record(page);
        }

        let summaries = pager.finish();
        info!("Fetched {} performance alert summaries", summaries.len());
        Ok(summaries)
    }

    pub async fn performance_frameworks(&self) -> Result<Vec<PerformanceFramework>> {
        self.get_json(self.api_url("performance/framework")?).await
    }

    pub fn performance_frameworks_blocking(&self) -> Result<Vec<PerformanceFramework>> {
        self.get_json_blocking(self.api_url("performance/framework")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};

    fn summary(id: u64) -> Value {
        json!({
            "id": id,
            "repository": "autoland",
            "framework": 1,
            "created": "2024-01-15T10:23:45.123456",
            "push_id": 1000 + id,
            "original_revision": "0123456789abcdef0123",
            "alerts": [{"id": id * 10, "is_regression": true}]
        })
    }

    #[tokio::test]
    async fn test_alert_summaries_follow_next_link() {
        let mut server = Server::new_async().await;
        let next = format!("{}/api/performance/alertsummary/?page=2", server.url());

        let first = server
            .mock("GET", "/api/performance/alertsummary/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "3".into()),
                Matcher::UrlEncoded("repository".into(), "autoland".into()),
            ]))
            .with_status(200)
            .with_body(json!({"count": 10, "next": next, "results": [summary(1), summary(2)]}).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/performance/alertsummary/")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(
                json!({"count": 10, "next": null, "results": [summary(3), summary(4)]}).to_string(),
            )
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let summaries = client
            .performance_alert_summaries(&AlertSummaryQuery {
                repository: Some("autoland".to_string()),
                framework: None,
                limit: 3,
            })
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(summaries.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(summaries[0].regression_count(), 1);
    }

    #[test]
    fn test_alert_summaries_blocking_follow_next_link() {
        let mut server = Server::new();
        let next = format!("{}/api/performance/alertsummary/?page=2", server.url());

        let first = server
            .mock("GET", "/api/performance/alertsummary/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "3".into()),
                Matcher::UrlEncoded("framework".into(), "13".into()),
            ]))
            .with_status(200)
            .with_body(json!({"count": 10, "next": next, "results": [summary(1), summary(2)]}).to_string())
            .create();
        let second = server
            .mock("GET", "/api/performance/alertsummary/")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(
                json!({"count": 10, "next": null, "results": [summary(3), summary(4)]}).to_string(),
            )
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let summaries = client
            .performance_alert_summaries_blocking(&AlertSummaryQuery {
                repository: None,
                framework: Some(13),
                limit: 3,
            })
            .unwrap();

        first.assert();
        second.assert();
        assert_eq!(summaries.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_frameworks_blocking() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api/performance/framework/")
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "talos"}, {"id": 13, "name": "browsertime"}]"#)
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let frameworks = client.performance_frameworks_blocking().unwrap();

        assert_eq!(frameworks.len(), 2);
        assert_eq!(frameworks[1].name, "browsertime");
    }
}
