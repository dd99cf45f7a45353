//! Property-based tests using proptest
//!
//! These tests check the serializer/deserializer pair and configuration
//! validation of the webhook resource over randomized inputs.

use std::collections::BTreeSet;

use frontegg_provider::resource::get_resource;
use frontegg_provider::resource::webhook::{self, Webhook, RESOURCE_TYPE};
use frontegg_provider::{Error, Provider, ResourceData};
use proptest::prelude::*;
use serde_json::{json, Value};

fn allowed_events() -> Vec<String> {
    get_resource(RESOURCE_TYPE)
        .and_then(|def| def.attribute("events"))
        .and_then(|events| events.allowed_values.clone())
        .expect("events allow-list should exist")
}

/// Generate a subset of the allow-list, in arbitrary order, with duplicates
fn arb_events() -> impl Strategy<Value = Vec<String>> {
    let events = allowed_events();
    prop::collection::vec(prop::sample::select(events), 0..20)
}

/// Generate a valid webhook configuration block
fn arb_config() -> impl Strategy<Value = Value> {
    (
        any::<bool>(),
        "[A-Za-z0-9 ]{1,40}",
        ".{0,80}",
        "https://[a-z]{1,12}\\.example\\.com/[a-z0-9/]{0,20}",
        "[ -~]{1,40}",
        arb_events(),
    )
        .prop_map(|(enabled, name, description, url, secret, events)| {
            json!({
                "enabled": enabled,
                "name": name,
                "description": description,
                "url": url,
                "secret": secret,
                "events": events,
            })
        })
}

/// Event names that are not on the allow-list
fn arb_bogus_event() -> impl Strategy<Value = String> {
    "[a-zA-Z.]{1,40}".prop_filter("must be outside the allow-list", |name| {
        !allowed_events().contains(name)
    })
}

/// What the server would echo back for a request body
fn echo(body: Webhook) -> Webhook {
    Webhook {
        id: "wh-echo".to_string(),
        kind: "custom".to_string(),
        tenant_id: "tenant".to_string(),
        vendor_id: "vendor".to_string(),
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        ..body
    }
}

proptest! {
    /// deserialize(serialize(config)) restores every user-settable field
    #[test]
    fn round_trip_preserves_user_fields(config in arb_config()) {
        let original = Provider::validate(RESOURCE_TYPE, &config).unwrap();

        let mut restored = ResourceData::new(RESOURCE_TYPE).unwrap();
        webhook::deserialize(&mut restored, echo(webhook::serialize(&original))).unwrap();

        for name in ["name", "description", "url", "secret"] {
            prop_assert_eq!(restored.get_string(name), original.get_string(name));
        }
        prop_assert_eq!(restored.get_bool("enabled"), original.get_bool("enabled"));

        let before: BTreeSet<String> = original.get_string_set("events").into_iter().collect();
        let after: BTreeSet<String> = restored.get_string_set("events").into_iter().collect();
        prop_assert_eq!(after, before);
    }

    /// The request body never carries server-assigned fields
    #[test]
    fn serialized_body_has_no_computed_fields(config in arb_config()) {
        let data = Provider::validate(RESOURCE_TYPE, &config).unwrap();
        let body = serde_json::to_value(webhook::serialize(&data)).unwrap();
        let object = body.as_object().unwrap();

        for key in ["_id", "type", "tenantId", "vendorId", "createdAt"] {
            prop_assert!(!object.contains_key(key), "{} must not be sent", key);
        }
        prop_assert!(object.contains_key("isActive"));
    }

    /// Any event outside the allow-list fails validation on `events`
    #[test]
    fn unknown_event_is_rejected(
        config in arb_config(),
        bogus in arb_bogus_event(),
    ) {
        let mut config = config;
        config["events"].as_array_mut().unwrap().push(Value::String(bogus.clone()));

        let err = Provider::validate(RESOURCE_TYPE, &config).unwrap_err();
        prop_assert!(matches!(err, Error::Validation(_)));
        let fields = err.field_errors();
        prop_assert!(fields.iter().all(|f| f.path == "events"));
        prop_assert!(fields.iter().any(|f| f.message.contains(&bogus)));
    }

    /// Events come out of a handle sorted and free of duplicates
    #[test]
    fn events_are_a_set(events in arb_events()) {
        let mut data = ResourceData::new(RESOURCE_TYPE).unwrap();
        data.set("events", events.clone()).unwrap();

        let expected: Vec<String> = events.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(data.get_string_set("events"), expected);
    }
}
