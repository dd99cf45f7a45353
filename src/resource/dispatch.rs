//! Provider Dispatch
//!
//! Routes orchestrator calls to the handlers of the matching resource type.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::data::ResourceData;
use super::registry::{get_registry, get_resource, ProviderSchema};
use super::webhook;
use crate::error::{Error, Result};
use crate::frontegg::FronteggClient;

/// Provider-level handle; holds the REST client every handler shares.
///
/// Handlers keep no state of their own, so one `Provider` may serve
/// concurrent operations on different resource instances.
#[derive(Clone)]
pub struct Provider {
    client: FronteggClient,
}

impl Provider {
    pub fn new(client: FronteggClient) -> Self {
        Self { client }
    }

    pub fn schema() -> &'static ProviderSchema {
        get_registry()
    }

    /// Validate a configuration block without touching the network
    pub fn validate(resource_type: &str, config: &Value) -> Result<ResourceData> {
        ResourceData::from_config(resource_type, config)
    }

    pub async fn create(&self, ctx: &CancellationToken, data: &mut ResourceData) -> Result<()> {
        tracing::info!("create: type={}", data.resource_type());
        match data.resource_type() {
            webhook::RESOURCE_TYPE => webhook::create(ctx, data, &self.client).await,
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }

    pub async fn read(&self, ctx: &CancellationToken, data: &mut ResourceData) -> Result<()> {
        tracing::info!("read: type={}, id={}", data.resource_type(), data.id());
        match data.resource_type() {
            webhook::RESOURCE_TYPE => webhook::read(ctx, data, &self.client).await,
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }

    pub async fn update(&self, ctx: &CancellationToken, data: &mut ResourceData) -> Result<()> {
        tracing::info!("update: type={}, id={}", data.resource_type(), data.id());
        match data.resource_type() {
            webhook::RESOURCE_TYPE => webhook::update(ctx, data, &self.client).await,
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }

    pub async fn delete(&self, ctx: &CancellationToken, data: &mut ResourceData) -> Result<()> {
        tracing::info!("delete: type={}, id={}", data.resource_type(), data.id());
        match data.resource_type() {
            webhook::RESOURCE_TYPE => webhook::delete(ctx, data, &self.client).await,
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }

    pub async fn import(
        &self,
        ctx: &CancellationToken,
        resource_type: &str,
        id: &str,
    ) -> Result<ResourceData> {
        tracing::info!("import: type={}, id={}", resource_type, id);
        let importable = get_resource(resource_type).is_some_and(|def| def.importable);
        match resource_type {
            webhook::RESOURCE_TYPE if importable => webhook::import(ctx, id, &self.client).await,
            other => Err(Error::UnknownResource(other.to_string())),
        }
    }
}
