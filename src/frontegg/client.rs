//! Frontegg Client
//!
//! Main client for interacting with the Frontegg APIs, combining
//! authentication and HTTP functionality.

use std::fmt;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::auth::Credentials;
use super::http::{self, ClientSettings, HttpClient};
use crate::error::Result;

pub const DEFAULT_API_URL: &str = "https://api.frontegg.com";
pub const DEFAULT_PORTAL_URL: &str = "https://portal.frontegg.com";

/// Everything needed to build a [`FronteggClient`] from vendor credentials
#[derive(Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub secret_key: String,
    /// Base URL of the authentication API
    pub api_url: String,
    /// Base URL the webhook collection lives under
    pub portal_url: String,
    pub settings: ClientSettings,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("secret_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("portal_url", &self.portal_url)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Main Frontegg client
#[derive(Clone)]
pub struct FronteggClient {
    pub credentials: Credentials,
    pub http: HttpClient,
    portal_url: String,
}

impl FronteggClient {
    /// Create a client that authenticates with vendor credentials
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(config.settings)?;
        let credentials = Credentials::vendor(
            http.inner().clone(),
            &config.api_url,
            &config.client_id,
            &config.secret_key,
        )?;

        Self::from_parts(credentials, http, &config.portal_url)
    }

    /// Create a client that presents a pre-issued bearer token
    pub fn with_token(portal_url: &str, token: &str, settings: ClientSettings) -> Result<Self> {
        let http = HttpClient::new(settings)?;
        Self::from_parts(Credentials::static_token(token), http, portal_url)
    }

    fn from_parts(credentials: Credentials, http: HttpClient, portal_url: &str) -> Result<Self> {
        url::Url::parse(portal_url)?;
        Ok(Self {
            credentials,
            http,
            portal_url: portal_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a POST request to a Frontegg API
    pub async fn post<B, T>(&self, ctx: &CancellationToken, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.call(ctx, Method::POST, url, body).await?;
        http::decode(&text)
    }

    /// Make a PATCH request to a Frontegg API
    pub async fn patch<B, T>(&self, ctx: &CancellationToken, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.call(ctx, Method::PATCH, url, body).await?;
        http::decode(&text)
    }

    /// Make a DELETE request to a Frontegg API, discarding any response body
    pub async fn delete<B>(&self, ctx: &CancellationToken, url: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.call(ctx, Method::DELETE, url, body).await?;
        Ok(())
    }

    /// Issue a call, refreshing the token once if the API rejects it
    async fn call<B>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let token = self.credentials.get_token(ctx).await?;
        match self.http.send(ctx, method.clone(), url, &token, body).await {
            Err(err)
                if err.status() == Some(StatusCode::UNAUTHORIZED)
                    && self.credentials.can_refresh() =>
            {
                tracing::warn!("Token rejected by {}, refreshing", url);
                let token = self.credentials.refresh_token(ctx).await?;
                self.http.send(ctx, method, url, &token, body).await
            }
            other => other,
        }
    }

    // =========================================================================
    // Webhook API helpers
    // =========================================================================

    /// Build the webhook collection URL
    pub fn webhook_url(&self) -> String {
        format!("{}/frontegg/webhook", self.portal_url)
    }

    /// Collection endpoint new custom webhooks are posted to
    pub fn webhook_custom_url(&self) -> String {
        format!("{}/custom", self.webhook_url())
    }

    /// URL of a single webhook, with the identifier percent-encoded
    pub fn webhook_item_url(&self, id: &str) -> String {
        format!("{}/{}", self.webhook_url(), urlencoding::encode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url_strips_trailing_slash() {
        let client =
            FronteggClient::with_token("https://portal.example.com/", "t", ClientSettings::default())
                .unwrap();
        assert_eq!(
            client.webhook_url(),
            "https://portal.example.com/frontegg/webhook"
        );
    }

    #[test]
    fn test_webhook_item_url_escapes_identifier() {
        let client =
            FronteggClient::with_token("https://portal.example.com", "t", ClientSettings::default())
                .unwrap();
        assert_eq!(
            client.webhook_custom_url(),
            "https://portal.example.com/frontegg/webhook/custom"
        );
        assert_eq!(
            client.webhook_item_url("a/b c"),
            "https://portal.example.com/frontegg/webhook/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_invalid_portal_url() {
        let result = FronteggClient::with_token("portal", "t", ClientSettings::default());
        assert!(result.is_err());
    }
}
