//! Frontegg webhook resource
//!
//! Maps the `frontegg_webhook` schema onto the webhook collection of the
//! Frontegg API:
//!
//! | Operation | Method | Path            | Body    |
//! |-----------|--------|-----------------|---------|
//! | Create    | POST   | `{base}/custom` | webhook |
//! | Read      | PATCH  | `{base}/{id}`   | none    |
//! | Update    | PATCH  | `{base}/{id}`   | webhook |
//! | Delete    | DELETE | `{base}/{id}`   | none    |
//!
//! Reads go through PATCH with no body because that is how the API exposes
//! fetch-by-id for custom webhooks.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::data::ResourceData;
use super::lifecycle::{transition, Action, ApiCall, ApiMethod, LifecycleState, Plan};
use crate::error::{Error, FieldError, Result};
use crate::frontegg::FronteggClient;

pub const RESOURCE_TYPE: &str = "frontegg_webhook";

/// Webhook type assigned by the server to webhooks created here
pub const CUSTOM_WEBHOOK_TYPE: &str = "custom";

/// Wire representation of a webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_keys: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_at: String,
}

/// Build the request body from the user-settable attributes.
/// Server-assigned fields stay empty and are omitted on the wire.
pub fn serialize(data: &ResourceData) -> Webhook {
    Webhook {
        is_active: data.get_bool("enabled"),
        display_name: data.get_string("name"),
        description: data.get_string("description"),
        url: data.get_string("url"),
        secret: data.get_string("secret"),
        event_keys: data.get_string_set("events"),
        ..Default::default()
    }
}

/// Copy a server response into the handle.
///
/// Stops at the first attribute that fails to be written. Attributes
/// assigned before that point keep their new values.
pub fn deserialize(data: &mut ResourceData, webhook: Webhook) -> Result<()> {
    data.set_id(webhook.id);
    data.set("enabled", webhook.is_active)?;
    data.set("name", webhook.display_name)?;
    data.set("description", webhook.description)?;
    data.set("url", webhook.url)?;
    data.set("secret", webhook.secret)?;
    data.set("events", webhook.event_keys)?;
    data.set("type", webhook.kind)?;
    data.set("tenant_id", webhook.tenant_id)?;
    data.set("vendor_id", webhook.vendor_id)?;
    data.set("created_at", webhook.created_at)?;
    Ok(())
}

pub fn plan_create(data: &ResourceData, client: &FronteggClient) -> Result<Plan<Webhook>> {
    let transition = transition(LifecycleState::observe(data), Action::Create)?;
    Ok(Plan {
        transition,
        calls: vec![ApiCall {
            method: ApiMethod::Post,
            url: client.webhook_custom_url(),
            body: Some(serialize(data)),
        }],
    })
}

pub fn plan_read(data: &ResourceData, client: &FronteggClient) -> Result<Plan<Webhook>> {
    let transition = transition(LifecycleState::observe(data), Action::Read)?;
    Ok(Plan {
        transition,
        calls: vec![ApiCall {
            method: ApiMethod::Patch,
            url: client.webhook_item_url(data.id()),
            body: None,
        }],
    })
}

pub fn plan_update(data: &ResourceData, client: &FronteggClient) -> Result<Plan<Webhook>> {
    let transition = transition(LifecycleState::observe(data), Action::Update)?;
    Ok(Plan {
        transition,
        calls: vec![ApiCall {
            method: ApiMethod::Patch,
            url: client.webhook_item_url(data.id()),
            body: Some(serialize(data)),
        }],
    })
}

pub fn plan_delete(data: &ResourceData, client: &FronteggClient) -> Result<Plan<Webhook>> {
    let transition = transition(LifecycleState::observe(data), Action::Delete)?;
    Ok(Plan {
        transition,
        calls: vec![ApiCall {
            method: ApiMethod::Delete,
            url: client.webhook_item_url(data.id()),
            body: None,
        }],
    })
}

/// Deserialize a create or read response, refusing one without an identifier.
/// The handle is left untouched when the identifier is missing.
fn adopt(data: &mut ResourceData, webhook: Option<Webhook>, action: Action) -> Result<()> {
    let webhook = webhook.unwrap_or_default();
    if webhook.id.is_empty() {
        tracing::error!("{} response carried no webhook identifier", action.as_str());
        return Err(Error::MissingId {
            action: action.as_str().to_string(),
        });
    }
    deserialize(data, webhook)
}

/// Issue the planned calls in order and return the last response body
async fn run(
    ctx: &CancellationToken,
    client: &FronteggClient,
    plan: &Plan<Webhook>,
) -> Result<Option<Webhook>> {
    if let Some(pending) = plan.transition.pending {
        tracing::debug!("{} -> {}", plan.transition.from, pending);
    }

    let mut last = None;
    for call in &plan.calls {
        tracing::debug!("{} {}", call.method.as_str(), call.url);
        let body = call.body.as_ref();
        last = match call.method {
            ApiMethod::Post => Some(client.post(ctx, &call.url, body).await?),
            ApiMethod::Patch => Some(client.patch(ctx, &call.url, body).await?),
            ApiMethod::Delete => {
                client.delete(ctx, &call.url, body).await?;
                None
            }
        };
    }
    Ok(last)
}

pub async fn create(
    ctx: &CancellationToken,
    data: &mut ResourceData,
    client: &FronteggClient,
) -> Result<()> {
    let plan = plan_create(data, client)?;
    let webhook = run(ctx, client, &plan).await?;
    adopt(data, webhook, Action::Create)?;
    tracing::info!(id = data.id(), "Created webhook");
    Ok(())
}

/// Refresh the handle from the server.
///
/// A webhook that no longer exists (404) is not an error: the identifier is
/// cleared so the caller drops it from state.
pub async fn read(
    ctx: &CancellationToken,
    data: &mut ResourceData,
    client: &FronteggClient,
) -> Result<()> {
    match fetch(ctx, data, client).await {
        Err(err) if err.is_not_found() => {
            tracing::warn!(id = data.id(), "Webhook not found, removing from state");
            data.clear_id();
            Ok(())
        }
        other => other,
    }
}

async fn fetch(
    ctx: &CancellationToken,
    data: &mut ResourceData,
    client: &FronteggClient,
) -> Result<()> {
    let plan = plan_read(data, client)?;
    let webhook = run(ctx, client, &plan).await?;
    adopt(data, webhook, Action::Read)
}

pub async fn update(
    ctx: &CancellationToken,
    data: &mut ResourceData,
    client: &FronteggClient,
) -> Result<()> {
    let plan = plan_update(data, client)?;
    if let Some(webhook) = run(ctx, client, &plan).await? {
        deserialize(data, webhook)?;
    }
    tracing::info!(id = data.id(), "Updated webhook");
    Ok(())
}

/// Delete the webhook. The identifier is left in place; removing the handle
/// from state is up to the caller.
pub async fn delete(
    ctx: &CancellationToken,
    data: &mut ResourceData,
    client: &FronteggClient,
) -> Result<()> {
    let plan = plan_delete(data, client)?;
    run(ctx, client, &plan).await?;
    tracing::info!(id = data.id(), "Deleted webhook");
    Ok(())
}

/// Passthrough import: adopt `id` as the identifier, then read.
/// Unlike [`read`], a missing webhook is reported as an error.
pub async fn import(
    ctx: &CancellationToken,
    id: &str,
    client: &FronteggClient,
) -> Result<ResourceData> {
    if id.trim().is_empty() {
        return Err(Error::Validation(vec![FieldError::new(
            "id",
            "import identifier must not be empty",
        )]));
    }
    transition(LifecycleState::NoResource, Action::Import)?;
    let mut data = ResourceData::with_id(RESOURCE_TYPE, id)?;
    fetch(ctx, &mut data, client).await?;
    tracing::info!(id = data.id(), "Imported webhook");
    Ok(data)
}
