use std::sync::OnceLock;
use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::pagination::MAX_COUNT;
use crate::error::{Result, TreeherderError};

pub const DEFAULT_SERVER_URL: &str = "https://treeherder.mozilla.org";
const MAX_ERROR_MESSAGE_LEN: usize = 200;

pub(super) type Params = Vec<(&'static str, String)>;

/// Client for a single Treeherder server.
///
/// HTTP transports are created on first use and reused for every later
/// call. The async and blocking transports are independent: each can be
/// released with [`close`](Self::close) / [`close_blocking`](Self::close_blocking),
/// and dropping the client releases whatever is still open.
#[derive(Debug)]
pub struct TreeherderClient {
    server_url: String,
    api_url: Url,
    user_agent: String,
    timeout: Option<Duration>,
    page_size: usize,
    async_transport: OnceLock<reqwest::Client>,
    blocking_transport: OnceLock<reqwest::blocking::Client>,
}

impl TreeherderClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let server_url = server_url.trim_end_matches('/').to_string();

        let api_url = Url::parse(&format!("{server_url}/api/"))
            .map_err(|e| TreeherderError::Config(format!("Invalid server URL: {e}")))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(TreeherderError::Config(format!(
                "Unsupported URL scheme: {}",
                api_url.scheme()
            )));
        }

        Ok(Self {
            server_url,
            api_url,
            user_agent: format!("lumberjack/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            page_size: MAX_COUNT,
            async_transport: OnceLock::new(),
            blocking_transport: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Number of records asked for per request when paging.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_COUNT);
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub(super) fn page_size(&self) -> usize {
        self.page_size
    }

    /// `{server}/api/{path}/`
    pub fn api_url(&self, path: &str) -> Result<Url> {
        self.endpoint_url(path.split('/').filter(|s| !s.is_empty()))
    }

    /// `{server}/api/project/{project}/{path}/`
    pub fn project_url(&self, project: &str, path: &str) -> Result<Url> {
        self.endpoint_url(
            ["project", project]
                .into_iter()
                .chain(path.split('/').filter(|s| !s.is_empty())),
        )
    }

    fn endpoint_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| TreeherderError::Config(format!("Invalid API URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    pub fn has_async_transport(&self) -> bool {
        self.async_transport.get().is_some()
    }

    pub fn has_blocking_transport(&self) -> bool {
        self.blocking_transport.get().is_some()
    }

    /// Releases the async transport. The next async call opens a new one.
    pub fn close(&mut self) {
        if self.async_transport.take().is_some() {
            debug!("Closed async transport for {}", self.server_url);
        }
    }

    /// Releases the blocking transport. The next `_blocking` call opens a new
    /// one. Like every `_blocking` method, the transport must not be used from
    /// within an async runtime.
    pub fn close_blocking(&mut self) {
        if self.blocking_transport.take().is_some() {
            debug!("Closed blocking transport for {}", self.server_url);
        }
    }

    fn transport(&self) -> Result<&reqwest::Client> {
        if let Some(client) = self.async_transport.get() {
            return Ok(client);
        }

        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TreeherderError::Config(format!("Failed to create HTTP client: {e}")))?;

        debug!("Opened async transport for {}", self.server_url);
        Ok(self.async_transport.get_or_init(|| client))
    }

    fn blocking_transport(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.blocking_transport.get() {
            return Ok(client);
        }

        let mut builder =
            reqwest::blocking::Client::builder().user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TreeherderError::Config(format!("Failed to create HTTP client: {e}")))?;

        debug!("Opened blocking transport for {}", self.server_url);
        Ok(self.blocking_transport.get_or_init(|| client))
    }

    pub(super) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let endpoint = url.path().to_string();
        let (status, body) = self.fetch(url).await?;
        decode_response(&endpoint, status, &body)
    }

    pub(super) fn get_json_blocking<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let endpoint = url.path().to_string();
        let (status, body) = self.fetch_blocking(url)?;
        decode_response(&endpoint, status, &body)
    }

    pub(super) async fn get_text(&self, url: Url) -> Result<String> {
        let endpoint = url.path().to_string();
        let (status, body) = self.fetch(url).await?;
        check_status(&endpoint, status, &body)?;
        Ok(body)
    }

    pub(super) fn get_text_blocking(&self, url: Url) -> Result<String> {
        let endpoint = url.path().to_string();
        let (status, body) = self.fetch_blocking(url)?;
        check_status(&endpoint, status, &body)?;
        Ok(body)
    }

    async fn fetch(&self, url: Url) -> Result<(StatusCode, String)> {
        let endpoint = url.path().to_string();
        debug!("GET {url}");

        let connection_error = |source| TreeherderError::Connection {
            endpoint: endpoint.clone(),
            source,
        };

        let response = self
            .transport()?
            .get(url)
            .send()
            .await
            .map_err(connection_error)?;
        let status = response.status();
        let body = response.text().await.map_err(connection_error)?;

        debug!("{endpoint} -> {status} ({} bytes)", body.len());
        Ok((status, body))
    }

    fn fetch_blocking(&self, url: Url) -> Result<(StatusCode, String)> {
        let endpoint = url.path().to_string();
        debug!("GET {url} (blocking)");

        let connection_error = |source| TreeherderError::Connection {
            endpoint: endpoint.clone(),
            source,
        };

        let response = self
            .blocking_transport()?
            .get(url)
            .send()
            .map_err(connection_error)?;
        let status = response.status();
        let body = response.text().map_err(connection_error)?;

        debug!("{endpoint} -> {status} ({} bytes)", body.len());
        Ok((status, body))
    }
}

pub(super) fn with_params(mut url: Url, params: &[(&'static str, String)]) -> Url {
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    }
    url
}

fn check_status(endpoint: &str, status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    Err(TreeherderError::Http {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message: error_message(status, body),
    })
}

fn decode_response<T: DeserializeOwned>(endpoint: &str, status: StatusCode, body: &str) -> Result<T> {
    check_status(endpoint, status, body)?;

    serde_json::from_str(body).map_err(|source| TreeherderError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Prefers Django REST framework's `{"detail": "..."}` over the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_string));

    if let Some(detail) = detail {
        return detail;
    }

    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }

    match body.char_indices().nth(MAX_ERROR_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
