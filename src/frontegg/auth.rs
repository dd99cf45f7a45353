//! Frontegg Authentication
//!
//! Exchanges vendor credentials (client ID + secret key) for a bearer token
//! and caches it until shortly before it expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Path of the vendor token endpoint, relative to the API base URL
const VENDOR_AUTH_PATH: &str = "/auth/vendor";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL when the auth response carries no `expiresIn`
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VendorAuthRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorAuthResponse {
    token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

enum TokenSource {
    Vendor {
        http: Client,
        auth_url: String,
        client_id: String,
        secret_key: String,
    },
    Static(String),
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Frontegg credentials holder with token caching
#[derive(Clone)]
pub struct Credentials {
    source: Arc<TokenSource>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl Credentials {
    /// Credentials backed by the vendor token endpoint under `api_url`
    pub fn vendor(http: Client, api_url: &str, client_id: &str, secret_key: &str) -> Result<Self> {
        let auth_url = format!("{}{}", api_url.trim_end_matches('/'), VENDOR_AUTH_PATH);
        url::Url::parse(&auth_url)?;

        Ok(Self {
            source: Arc::new(TokenSource::Vendor {
                http,
                auth_url,
                client_id: client_id.to_string(),
                secret_key: secret_key.to_string(),
            }),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials that always present the given token
    pub fn static_token(token: impl Into<String>) -> Self {
        Self {
            source: Arc::new(TokenSource::Static(token.into())),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Whether a rejected token can be exchanged for a fresh one
    pub fn can_refresh(&self) -> bool {
        matches!(*self.source, TokenSource::Vendor { .. })
    }

    /// Get an access token for API calls
    pub async fn get_token(&self, ctx: &CancellationToken) -> Result<String> {
        let (http, auth_url, client_id, secret_key) = match &*self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Vendor {
                http,
                auth_url,
                client_id,
                secret_key,
            } => (http, auth_url, client_id, secret_key),
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        tracing::debug!("POST {}", auth_url);
        let request = http.post(auth_url.as_str()).json(&VendorAuthRequest {
            client_id: client_id.as_str(),
            secret: secret_key.as_str(),
        });

        let body = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(Error::Cancelled),
            body = request_token(request) => body?,
        };

        if body.token.is_empty() {
            return Err(Error::Auth("vendor token response carried no token".to_string()));
        }

        let ttl = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: body.token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{}s",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs()
        );

        Ok(body.token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self, ctx: &CancellationToken) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token(ctx).await
    }
}

/// Send the token request and decode its body
async fn request_token(request: RequestBuilder) -> Result<VendorAuthResponse> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        tracing::error!("Vendor authentication rejected: {}", status);
        return Err(Error::Auth(format!(
            "vendor token request returned {}",
            status
        )));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token_is_returned_verbatim() {
        let credentials = Credentials::static_token("abc");
        let token = tokio_test::block_on(credentials.get_token(&CancellationToken::new()));
        assert_eq!(token.unwrap(), "abc");
        assert!(!credentials.can_refresh());
    }

    #[test]
    fn test_vendor_rejects_malformed_api_url() {
        let result = Credentials::vendor(Client::new(), "not a url", "id", "secret");
        assert!(matches!(result, Err(Error::Url(_))));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let cached = CachedToken {
            token: "t".to_string(),
            expires_at: Instant::now(),
        };
        assert!(!cached.is_valid());
    }
}
