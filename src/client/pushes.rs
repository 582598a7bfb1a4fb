use chrono::NaiveDate;
use log::info;
use url::Url;

use super::core::{with_params, Params, TreeherderClient};
use super::pagination::clamp_count;
use crate::error::{Result, TreeherderError};
use crate::models::{Push, ResultsPage};

pub const DEFAULT_PUSH_COUNT: usize = 10;

/// Filters for the push list endpoint.
#[derive(Debug, Clone, Default)]
pub struct PushQuery {
    pub count: Option<usize>,
    pub revision: Option<String>,
    pub author: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PushQuery {
    pub fn with_count(count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn for_revision(revision: &str) -> Self {
        Self {
            count: Some(1),
            revision: Some(revision.to_string()),
            ..Self::default()
        }
    }

    pub fn effective_count(&self) -> usize {
        clamp_count(self.count.unwrap_or(DEFAULT_PUSH_COUNT))
    }

    fn params(&self) -> Params {
        let mut params = vec![("count", self.effective_count().to_string())];
        if let Some(revision) = &self.revision {
            params.push(("revision", revision.clone()));
        }
        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        if let Some(start) = self.start_date {
            params.push(("startdate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("enddate", end.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

impl TreeherderClient {
    fn pushes_url(&self, project: &str, query: &PushQuery) -> Result<Url> {
        Ok(with_params(self.project_url(project, "push")?, &query.params()))
    }

    /// Most recent pushes first, in the order the server returns them.
    pub async fn pushes(&self, project: &str, query: &PushQuery) -> Result<Vec<Push>> {
        let page: ResultsPage<Push> = self.get_json(self.pushes_url(project, query)?).await?;
        Ok(bounded(project, page.results, query.effective_count()))
    }

    pub fn pushes_blocking(&self, project: &str, query: &PushQuery) -> Result<Vec<Push>> {
        let page: ResultsPage<Push> = self.get_json_blocking(self.pushes_url(project, query)?)?;
        Ok(bounded(project, page.results, query.effective_count()))
    }

    pub async fn push_by_revision(&self, project: &str, revision: &str) -> Result<Push> {
        let pushes = self
            .pushes(project, &PushQuery::for_revision(revision))
            .await?;
        first_or_not_found(pushes, revision)
    }

    pub fn push_by_revision_blocking(&self, project: &str, revision: &str) -> Result<Push> {
        let pushes = self.pushes_blocking(project, &PushQuery::for_revision(revision))?;
        first_or_not_found(pushes, revision)
    }
}

fn bounded(project: &str, mut pushes: Vec<Push>, count: usize) -> Vec<Push> {
    pushes.truncate(count);
    info!("Fetched {} pushes for {project}", pushes.len());
    pushes
}

fn first_or_not_found(pushes: Vec<Push>, revision: &str) -> Result<Push> {
    pushes
        .into_iter()
        .next()
        .ok_or_else(|| TreeherderError::NotFound {
            resource: "Push",
            id: revision.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures;
    use crate::client::MAX_COUNT;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_push_query_params() {
        let query = PushQuery {
            count: Some(5),
            author: Some("dev@example.com".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..PushQuery::default()
        };

        assert_eq!(
            query.params(),
            vec![
                ("count", "5".to_string()),
                ("author", "dev@example.com".to_string()),
                ("startdate", "2024-01-02".to_string()),
            ]
        );
    }

    #[test]
    fn test_push_count_is_clamped() {
        assert_eq!(PushQuery::default().effective_count(), DEFAULT_PUSH_COUNT);
        assert_eq!(PushQuery::with_count(50_000).effective_count(), MAX_COUNT);
    }

    #[tokio::test]
    async fn test_get_pushes_for_mozilla_central() {
        let ids = [105_u64, 104, 103, 102, 101];
        let body = json!({
            "meta": {"count": 5, "repository": "mozilla-central"},
            "results": ids.iter().map(|id| fixtures::push(*id)).collect::<Vec<_>>(),
        });

        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/project/mozilla-central/push/")
            .match_query(Matcher::UrlEncoded("count".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let pushes = client
            .pushes("mozilla-central", &PushQuery::with_count(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pushes.len(), 5);
        assert_eq!(pushes.iter().map(|p| p.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_get_pushes_blocking_with_filters() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/project/autoland/push/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("count".into(), "1".into()),
                Matcher::UrlEncoded("revision".into(), "abc123def456".into()),
            ]))
            .with_status(200)
            .with_body(json!({"results": [fixtures::push(12345)]}).to_string())
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let push = client
            .push_by_revision_blocking("autoland", "abc123def456")
            .unwrap();

        mock.assert();
        assert_eq!(push.id, 12345);
    }

    #[tokio::test]
    async fn test_push_by_revision_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/project/autoland/push/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let err = client
            .push_by_revision("autoland", "deadbeef")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TreeherderError::NotFound { resource: "Push", .. }
        ));
    }

    #[tokio::test]
    async fn test_server_returning_too_many_pushes_is_truncated() {
        let body = json!({"results": (1..=8).map(fixtures::push).collect::<Vec<_>>()});

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/project/try/push/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let pushes = client.pushes("try", &PushQuery::with_count(3)).await.unwrap();

        assert_eq!(pushes.len(), 3);
        assert_eq!(pushes[0].id, 1);
    }
}
