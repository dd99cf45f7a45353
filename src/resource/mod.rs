//! Resource abstraction layer
//!
//! Resource schemas are loaded from JSON files at compile time; each
//! resource type then supplies its own serializer and CRUD handlers.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource schemas from embedded JSON and validates configuration
//! - [`data`] - The schema-checked per-instance handle
//! - [`lifecycle`] - Lifecycle states, transitions and planned API calls
//! - [`webhook`] - The `frontegg_webhook` resource
//! - [`dispatch`] - Routes operations to the right resource handlers
//!
//! # Example
//!
//! ```ignore
//! use frontegg_provider::resource::{Provider, ResourceData};
//! use frontegg_provider::CancellationToken;
//!
//! async fn create(provider: &Provider, config: serde_json::Value) -> frontegg_provider::Result<String> {
//!     let mut data = Provider::validate("frontegg_webhook", &config)?;
//!     provider.create(&CancellationToken::new(), &mut data).await?;
//!     Ok(data.id().to_string())
//! }
//! ```

pub mod data;
pub mod dispatch;
pub mod lifecycle;
pub mod registry;
pub mod webhook;

pub use data::ResourceData;
pub use dispatch::Provider;
pub use lifecycle::{Action, LifecycleState};
pub use registry::{get_all_resource_types, get_registry, get_resource, ProviderSchema};
