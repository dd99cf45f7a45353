//! HTTP utilities for Frontegg REST API calls

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Header carrying the per-call correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// POST creates a remote object and must not be repeated once the server
/// may have processed it
fn is_idempotent(method: &Method) -> bool {
    *method != Method::POST
}

/// Status codes that are worth another attempt for `method`.
/// 429 means the request was refused unprocessed and is retried for
/// every method; gateway errors only for idempotent ones.
fn is_retryable(method: &Method, status: StatusCode) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            is_idempotent(method)
        }
        _ => false,
    }
}

/// Transport failures that are worth another attempt for `method`.
/// A connect failure means nothing reached the server.
fn is_retryable_transport(method: &Method, err: &reqwest::Error) -> bool {
    err.is_connect() || (err.is_timeout() && is_idempotent(method))
}

/// Decode a response body, treating an empty body as JSON `null`
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(body)?)
}

/// Transport tuning shared by every call
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            user_agent: format!("frontegg-provider/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientSettings {
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// HTTP client wrapper for Frontegg API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    settings: ClientSettings,
}

impl HttpClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    /// The underlying reqwest client, shared with the token exchange
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send one logical request and return the raw success body.
    ///
    /// Connect failures and 429 are retried up to `max_retries` times with
    /// exponential backoff. Timeouts and 502/503/504 are retried only for
    /// methods other than POST. Any other non-2xx status becomes
    /// [`Error::Api`]. A cancelled `ctx` aborts both the in-flight request
    /// and any pending backoff.
    pub async fn send<B>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let payload = body.map(serde_json::to_vec).transpose()?;
        let request_id = Uuid::new_v4().to_string();
        let mut attempt = 0;

        loop {
            tracing::debug!(request_id = %request_id, attempt, "{} {}", method, url);

            let mut request = self
                .client
                .request(method.clone(), url)
                .bearer_auth(token)
                .header(REQUEST_ID_HEADER, request_id.as_str());
            if let Some(bytes) = &payload {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }

            let outcome = tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::Cancelled),
                outcome = exchange(request) => outcome,
            };

            match outcome {
                Ok((status, text)) if status.is_success() => return Ok(text),
                Ok((status, _))
                    if is_retryable(&method, status) && attempt < self.settings.max_retries =>
                {
                    tracing::warn!(request_id = %request_id, "{} {} returned {}, retrying", method, url, status);
                }
                Ok((status, text)) => {
                    // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
                    tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
                    return Err(Error::Api {
                        status,
                        url: url.to_string(),
                        body: text,
                    });
                }
                Err(err)
                    if is_retryable_transport(&method, &err)
                        && attempt < self.settings.max_retries =>
                {
                    tracing::warn!(request_id = %request_id, "{} {} failed: {}, retrying", method, url, err);
                }
                Err(err) => return Err(Error::Transport(err)),
            }

            let delay = self.settings.backoff_for(attempt);
            tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

async fn exchange(request: RequestBuilder) -> reqwest::Result<(StatusCode, String)> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}
