//! Schema-data handle
//!
//! [`ResourceData`] is the per-instance record handed to every operation. It
//! carries both the desired configuration and the last observed values, and
//! every write is checked against the resource schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::registry::{get_resource, ResourceDef};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    resource_type: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    /// An empty handle for a known resource type
    pub fn new(resource_type: &str) -> Result<Self> {
        lookup(resource_type)?;
        Ok(Self {
            resource_type: resource_type.to_string(),
            id: String::new(),
            attributes: BTreeMap::new(),
        })
    }

    /// A handle that knows only its identifier, as produced by import
    pub fn with_id(resource_type: &str, id: &str) -> Result<Self> {
        let mut data = Self::new(resource_type)?;
        data.set_id(id);
        Ok(data)
    }

    /// Build a handle from a configuration block.
    ///
    /// The whole block is validated first; on any problem the returned
    /// [`Error::Validation`] lists every offending attribute.
    pub fn from_config(resource_type: &str, config: &Value) -> Result<Self> {
        let schema = lookup(resource_type)?;
        let errors = schema.validate(config);
        if !errors.is_empty() {
            tracing::debug!("{} configuration rejected: {} problem(s)", resource_type, errors.len());
            return Err(Error::Validation(errors));
        }

        let mut data = Self::new(resource_type)?;
        if let Some(block) = config.as_object() {
            for (name, value) in block {
                data.set(name, value.clone())?;
            }
        }
        Ok(data)
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn schema(&self) -> Result<&'static ResourceDef> {
        lookup(&self.resource_type)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Write an attribute. Unknown names and type mismatches are rejected;
    /// `null` unsets the attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let schema = self.schema()?;
        let Some(def) = schema.attribute(name) else {
            return Err(Error::attribute(name, "not part of the schema"));
        };

        let value = value.into();
        if value.is_null() {
            self.attributes.remove(name);
            return Ok(());
        }

        let normalized = def
            .kind
            .normalize(&value)
            .map_err(|message| Error::attribute(name, message))?;
        self.attributes.insert(name.to_string(), normalized);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Boolean attribute, `false` if unset
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or_default()
    }

    /// String attribute, empty if unset
    pub fn get_string(&self, name: &str) -> String {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// String-set attribute in set order, empty if unset
    pub fn get_string_set(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn lookup(resource_type: &str) -> Result<&'static ResourceDef> {
    get_resource(resource_type).ok_or_else(|| Error::UnknownResource(resource_type.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WEBHOOK: &str = "frontegg_webhook";

    #[test]
    fn test_new_rejects_unknown_type() {
        assert!(matches!(
            ResourceData::new("frontegg_user"),
            Err(Error::UnknownResource(_))
        ));
    }

    #[test]
    fn test_set_unknown_attribute_fails() {
        let mut data = ResourceData::new(WEBHOOK).unwrap();
        let err = data.set("colour", "blue").unwrap_err();
        assert!(matches!(err, Error::Attribute { ref name, .. } if name == "colour"));
    }

    #[test]
    fn test_set_type_mismatch_fails() {
        let mut data = ResourceData::new(WEBHOOK).unwrap();
        assert!(data.set("enabled", "true").is_err());
        assert!(data.get("enabled").is_none());
    }

    #[test]
    fn test_getters_default_when_unset() {
        let data = ResourceData::new(WEBHOOK).unwrap();
        assert!(!data.get_bool("enabled"));
        assert_eq!(data.get_string("name"), "");
        assert!(data.get_string_set("events").is_empty());
    }

    #[test]
    fn test_set_null_unsets() {
        let mut data = ResourceData::new(WEBHOOK).unwrap();
        data.set("name", "Audit").unwrap();
        data.set("name", Value::Null).unwrap();
        assert!(data.get("name").is_none());
    }

    #[test]
    fn test_string_set_is_normalized() {
        let mut data = ResourceData::new(WEBHOOK).unwrap();
        data.set(
            "events",
            json!(["frontegg.user.deleted", "frontegg.user.created", "frontegg.user.deleted"]),
        )
        .unwrap();
        assert_eq!(
            data.get_string_set("events"),
            vec!["frontegg.user.created", "frontegg.user.deleted"]
        );
    }

    #[test]
    fn test_from_config_rejects_bogus_event() {
        let err = ResourceData::from_config(
            WEBHOOK,
            &json!({
                "enabled": true,
                "name": "Audit",
                "description": "audit sink",
                "url": "https://example.com/hook",
                "secret": "s3cr3t",
                "events": ["frontegg.user.bogus"]
            }),
        )
        .unwrap_err();

        let fields = err.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].path, "events");
        assert!(fields[0].message.contains("frontegg.user.bogus"));
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut data = ResourceData::with_id(WEBHOOK, "wh-1").unwrap();
        data.set("enabled", true).unwrap();
        let text = serde_json::to_string(&data).unwrap();
        let back: ResourceData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.id(), "wh-1");
    }
}
