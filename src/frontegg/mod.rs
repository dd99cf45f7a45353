//! Frontegg API interaction module
//!
//! This module provides the REST client the resource handlers talk to:
//! vendor authentication, the HTTP transport, and the combined client.
//!
//! # Module Structure
//!
//! - [`auth`] - Vendor token exchange and caching
//! - [`client`] - Main Frontegg client for making API requests
//! - [`http`] - HTTP transport with retries and cancellation
//!
//! # Example
//!
//! ```ignore
//! use frontegg_provider::frontegg::{ClientSettings, FronteggClient};
//! use frontegg_provider::CancellationToken;
//!
//! async fn example() -> frontegg_provider::Result<()> {
//!     let client = FronteggClient::with_token(
//!         "https://portal.frontegg.com",
//!         "token",
//!         ClientSettings::default(),
//!     )?;
//!     let ctx = CancellationToken::new();
//!     let url = client.webhook_item_url("some-id");
//!     let webhook: serde_json::Value = client.patch::<(), _>(&ctx, &url, None).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use auth::Credentials;
pub use client::{ClientConfig, FronteggClient, DEFAULT_API_URL, DEFAULT_PORTAL_URL};
pub use http::{ClientSettings, HttpClient};
