//! GitHub API client creation and request handling.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;

use super::types::{Credential, JSON_MEDIA_TYPE, UserProfile};
use crate::error::{Result, StargazeError};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpRequest, HttpResponse, HttpTransport};
use crate::rate_limit::ApiRateLimiter;
use crate::retry::{RequestState, RetryPolicy, cooldown_from_reset, run_request};

/// Public GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("stargaze/", env!("CARGO_PKG_VERSION"));

/// Constructor-injected client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL. Only overridden by tests and GitHub API proxies.
    pub api_base: String,
    /// Token sent as `Authorization: token ...`; `None` for anonymous access.
    pub credential: Option<Credential>,
    /// Retry and cooldown behavior for every request.
    pub retry: RetryPolicy,
    /// Proactive pacing; `None` disables it.
    pub requests_per_second: Option<u32>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_URL.to_string(),
            credential: None,
            retry: RetryPolicy::default(),
            requests_per_second: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the given token.
    pub fn with_credential(token: &str) -> Self {
        Self {
            credential: Credential::new(token),
            ..Self::default()
        }
    }
}

/// GitHub API client.
///
/// Cheap to clone: the transport and the optional pacing limiter are shared.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    credential: Option<Credential>,
    retry: RetryPolicy,
    rate_limiter: Option<ApiRateLimiter>,
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| StargazeError::Internal(e.to_string()))?;

        Ok(Self::new_with_transport(config, Arc::new(transport)))
    }

    pub fn new_with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credential: config.credential,
            retry: config.retry,
            rate_limiter: config.requests_per_second.map(ApiRateLimiter::new),
        }
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether requests are authenticated.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn headers(&self, accept: &str) -> HttpHeaders {
        let mut headers = vec![
            ("Accept".to_string(), accept.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(credential) = &self.credential {
            headers.push(("Authorization".to_string(), credential.authorization()));
        }
        headers
    }

    /// GET `path` and decode the JSON body, applying the retry policy.
    ///
    /// 403 responses are treated as quota exhaustion: the request cools down
    /// (using `X-RateLimit-Reset` when present) and is retried without
    /// consuming an attempt. Other non-2xx statuses fail immediately;
    /// network and decoding errors are retried up to the attempt budget.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, accept: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);

        run_request(&self.retry, path, || self.attempt(&url, accept)).await
    }

    /// Fetch a user's public profile.
    pub async fn get_user_profile(&self, login: &str) -> Result<UserProfile> {
        self.get_json(&format!("/users/{login}"), JSON_MEDIA_TYPE)
            .await
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &str, accept: &str) -> RequestState<T> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let request = HttpRequest {
            url: url.to_string(),
            headers: self.headers(accept),
        };

        tracing::debug!(url = %url, "GET");

        let response: HttpResponse = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => return RequestState::FailedTransient(e.to_string()),
        };

        match response.status {
            403 => RequestState::Cooling(cooldown_from_reset(
                response.header("x-ratelimit-reset"),
                Utc::now(),
                self.retry.rate_limit_cooldown,
            )),
            _ if response.is_success() => match serde_json::from_slice(&response.body) {
                Ok(data) => RequestState::Succeeded(data),
                Err(e) => RequestState::FailedTransient(format!("malformed response body: {e}")),
            },
            status => RequestState::FailedPermanent {
                status,
                message: error_message(&response.body),
            },
        }
    }
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// raw text.
fn error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
