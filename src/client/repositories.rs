use super::core::TreeherderClient;
use crate::error::Result;
use crate::models::{FailureClassification, Repository};

impl TreeherderClient {
    /// All repositories known to the server, active or not.
    pub async fn repositories(&self) -> Result<Vec<Repository>> {
        self.get_json(self.api_url("repository")?).await
    }

    pub fn repositories_blocking(&self) -> Result<Vec<Repository>> {
        self.get_json_blocking(self.api_url("repository")?)
    }

    pub async fn failure_classifications(&self) -> Result<Vec<FailureClassification>> {
        self.get_json(self.api_url("failureclassification")?).await
    }

    pub fn failure_classifications_blocking(&self) -> Result<Vec<FailureClassification>> {
        self.get_json_blocking(self.api_url("failureclassification")?)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::TreeherderClient;
    use crate::models::DvcsType;
    use mockito::Server;
    use serde_json::json;

    fn repositories_body() -> String {
        json!([
            {
                "id": 1,
                "repository_group": {"name": "development", "description": "Dev repos"},
                "name": "mozilla-central",
                "dvcs_type": "hg",
                "url": "https://hg.mozilla.org/mozilla-central",
                "branch": null,
                "codebase": "gecko",
                "description": "Main development",
                "active_status": "active",
                "life_cycle_order": 1,
                "performance_alerts_enabled": true,
                "expire_performance_data": false,
                "is_try_repo": false,
                "tc_root_url": "https://firefox-ci-tc.services.mozilla.com"
            },
            {
                "id": 77,
                "repository_group": {"name": "try", "description": ""},
                "name": "try",
                "dvcs_type": "hg",
                "active_status": "onhold",
                "is_try_repo": true
            }
        ])
        .to_string()
    }

    #[test]
    fn test_get_repositories_blocking() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/repository/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(repositories_body())
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let repos = client.repositories_blocking().unwrap();

        mock.assert();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "mozilla-central");
        assert_eq!(repos[0].dvcs_type, DvcsType::Hg);
        assert!(!repos[0].is_try_repo);
        assert!(repos[0].is_active());
        assert!(repos[1].is_try_repo);
        assert!(!repos[1].is_active());
    }

    #[tokio::test]
    async fn test_get_repositories_async() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/repository/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(repositories_body())
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let repos = client.repositories().await.unwrap();

        mock.assert_async().await;
        assert_eq!(repos[0].repository_group.name, "development");
    }

    #[tokio::test]
    async fn test_get_failure_classifications() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/failureclassification/")
            .with_status(200)
            .with_body(r#"[{"id": 1, "name": "not classified"}, {"id": 4, "name": "intermittent"}]"#)
            .create_async()
            .await;

        let client = TreeherderClient::new(&server.url()).unwrap();
        let classifications = client.failure_classifications().await.unwrap();

        assert_eq!(classifications.len(), 2);
        assert_eq!(classifications[1].name, "intermittent");
    }

    #[test]
    fn test_get_failure_classifications_blocking() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/failureclassification/")
            .with_status(200)
            .with_body(r#"[{"id": 2, "name": "fixed by commit"}, {"id": 4, "name": "intermittent"}]"#)
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let classifications = client.failure_classifications_blocking().unwrap();

        mock.assert();
        assert_eq!(classifications[0].id, 2);
        assert_eq!(classifications[0].name, "fixed by commit");
    }

    #[test]
    fn test_failure_classifications_blocking_server_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api/failureclassification/")
            .with_status(503)
            .with_body("upstream unavailable")
            .create();

        let client = TreeherderClient::new(&server.url()).unwrap();
        let err = client.failure_classifications_blocking().unwrap_err();

        assert_eq!(err.status(), Some(503));
    }
}
