//! Client for the GitHub issue search endpoint.
//!
//! Search has its own quota of 30 requests per minute, tracked locally so a
//! short poll interval cannot trip the tracker's secondary limits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::GitHubConfig;

use super::models::GitHubSearchResponse;

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Results requested per search page; the search API caps this at 100.
const SEARCH_PAGE_SIZE: &str = "100";

/// Search requests allowed per window for an authenticated caller.
const SEARCH_REQUESTS_PER_WINDOW: u32 = 30;

const SEARCH_WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window budget for search requests.
#[derive(Debug)]
pub struct SearchQuota {
    limit: u32,
    remaining: u32,
    window: Duration,
    window_start: Instant,
}

impl SearchQuota {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            window,
            window_start: Instant::now(),
        }
    }

    /// Spend one request at `now`, or report how long until the window resets.
    fn try_take(&mut self, now: Instant) -> Result<(), Duration> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            self.remaining = self.limit;
            self.window_start = now;
        }

        if self.remaining == 0 {
            return Err(self.window.saturating_sub(elapsed));
        }
        self.remaining -= 1;
        Ok(())
    }

    /// Wait until a request fits in the budget, then spend it.
    pub async fn acquire(&mut self) {
        while let Err(wait) = self.try_take(Instant::now()) {
            tracing::warn!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "GitHub search quota spent, waiting for the next window"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// HTTP client for the GitHub search API.
///
/// Non-success statuses, transport failures and undecodable bodies all map
/// to [`DomainError::Remote`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    /// Personal access token; anonymous requests when `None`.
    token: Option<String>,
    quota: Arc<Mutex<SearchQuota>>,
}

impl GitHubClient {
    /// Create a client against the public API.
    pub fn new(token: Option<String>) -> DomainResult<Self> {
        Self::with_base_url(GITHUB_API_BASE, token, Duration::from_secs(30))
    }

    /// Create a client from the `github` config section.
    pub fn from_config(config: &GitHubConfig) -> DomainResult<Self> {
        Self::with_base_url(
            &config.api_base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a client against an arbitrary base URL (GitHub Enterprise, tests).
    pub fn with_base_url(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("issue-herald/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DomainError::Configuration(format!("failed to build GitHub HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            quota: Arc::new(Mutex::new(SearchQuota::new(
                SEARCH_REQUESTS_PER_WINDOW,
                SEARCH_WINDOW,
            ))),
        })
    }

    /// Whether requests carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Wait for search quota and build a request with the API headers.
    async fn rate_limited_request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> reqwest::RequestBuilder {
        self.quota.lock().await.acquire().await;
        let request = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Run one issue search with the given query string.
    pub async fn search_issues(&self, query: &str) -> DomainResult<GitHubSearchResponse> {
        let url = format!("{}/search/issues", self.base_url);

        let resp = self
            .rate_limited_request(reqwest::Method::GET, &url)
            .await
            .query(&[("q", query), ("per_page", SEARCH_PAGE_SIZE)])
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("GitHub search request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Remote(format!(
                "GitHub search returned {status}: {body}"
            )));
        }

        resp.json::<GitHubSearchResponse>()
            .await
            .map_err(|e| DomainError::Remote(format!("GitHub search parse failed: {e}")))
    }
}
