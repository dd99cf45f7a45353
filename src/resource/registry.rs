//! Resource Registry - Load resource schemas from JSON
//!
//! This module loads all resource schemas from embedded JSON files and
//! provides lookup functions plus configuration validation against them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::error::FieldError;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/frontegg_webhook.json")];

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Bool,
    String,
    StringSet,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::String => "String",
            Self::StringSet => "Set of String",
        }
    }

    /// Check a value against this kind and return its canonical form.
    /// String sets come back deduplicated and sorted.
    pub fn normalize(&self, value: &Value) -> Result<Value, String> {
        match self {
            Self::Bool => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| format!("expected a bool, got {}", describe(value))),
            Self::String => value
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| format!("expected a string, got {}", describe(value))),
            Self::StringSet => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("expected a set of strings, got {}", describe(value)))?;
                let mut members = BTreeSet::new();
                for item in items {
                    let member = item.as_str().ok_or_else(|| {
                        format!("expected set members to be strings, got {}", describe(item))
                    })?;
                    members.insert(member.to_string());
                }
                Ok(Value::Array(members.into_iter().map(Value::String).collect()))
            }
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Populated only from server responses
    #[serde(default)]
    pub computed: bool,
    /// Closed set of accepted values (per member for sets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

impl AttributeDef {
    pub fn is_user_settable(&self) -> bool {
        !self.computed || self.required
    }

    /// Members of a normalized value that fall outside `allowed_values`
    fn disallowed<'a>(&self, normalized: &'a Value) -> Vec<&'a str> {
        let Some(allowed) = &self.allowed_values else {
            return Vec::new();
        };
        let members: Vec<&str> = match normalized {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        members
            .into_iter()
            .filter(|m| !allowed.iter().any(|a| a.as_str() == *m))
            .collect()
    }
}

/// Resource definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    pub description: String,
    #[serde(default)]
    pub importable: bool,
    pub attributes: BTreeMap<String, AttributeDef>,
}

impl ResourceDef {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Attributes the configuration supplies
    pub fn user_attributes(&self) -> impl Iterator<Item = (&str, &AttributeDef)> {
        self.attributes
            .iter()
            .filter(|(_, def)| def.is_user_settable())
            .map(|(name, def)| (name.as_str(), def))
    }

    /// Attributes only the server populates
    pub fn computed_attributes(&self) -> impl Iterator<Item = (&str, &AttributeDef)> {
        self.attributes
            .iter()
            .filter(|(_, def)| !def.is_user_settable())
            .map(|(name, def)| (name.as_str(), def))
    }

    /// Validate a configuration block, collecting every problem found.
    pub fn validate(&self, config: &Value) -> Vec<FieldError> {
        let Some(block) = config.as_object() else {
            return vec![FieldError::new(
                "",
                format!("expected a configuration object, got {}", describe(config)),
            )];
        };

        let mut errors = Vec::new();

        for key in block.keys() {
            if !self.attributes.contains_key(key) {
                errors.push(FieldError::new(key, "unsupported argument"));
            }
        }

        for (name, def) in &self.attributes {
            let value = block.get(name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if def.required {
                    errors.push(FieldError::new(name, "required attribute is missing"));
                }
                continue;
            };

            if !def.is_user_settable() {
                errors.push(FieldError::new(
                    name,
                    "attribute is computed and cannot be configured",
                ));
                continue;
            }

            let normalized = match def.kind.normalize(value) {
                Ok(normalized) => normalized,
                Err(message) => {
                    errors.push(FieldError::new(name, message));
                    continue;
                }
            };

            if let Some(allowed) = &def.allowed_values {
                for member in def.disallowed(&normalized) {
                    errors.push(FieldError::new(
                        name,
                        format!("expected {} to be one of {:?}, got {}", name, allowed, member),
                    ));
                }
            }
        }

        errors
    }

    /// Render reference documentation for this resource as markdown
    pub fn render_markdown(&self, resource_type: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {} (Resource)\n", resource_type);
        let _ = writeln!(out, "{}\n", self.description);
        let _ = writeln!(out, "## Schema\n");

        let required: Vec<_> = self.user_attributes().filter(|(_, d)| d.required).collect();
        let optional: Vec<_> = self.user_attributes().filter(|(_, d)| !d.required).collect();
        let computed: Vec<_> = self.computed_attributes().collect();

        for (heading, attributes) in [("Required", required), ("Optional", optional)] {
            if attributes.is_empty() {
                continue;
            }
            let _ = writeln!(out, "### {}\n", heading);
            for (name, def) in attributes {
                render_attribute(&mut out, name, def);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "### Read-Only\n");
        let _ = writeln!(out, "- `id` (String) The ID of this resource.");
        for (name, def) in computed {
            render_attribute(&mut out, name, def);
        }

        if self.importable {
            let _ = writeln!(out, "\n## Import\n");
            let _ = writeln!(
                out,
                "Import is supported by passing the remote identifier of an existing {}.",
                resource_type
            );
        }

        out
    }
}

fn render_attribute(out: &mut String, name: &str, def: &AttributeDef) {
    let _ = write!(out, "- `{}` ({}) {}", name, def.kind.as_str(), def.description);
    if let Some(allowed) = &def.allowed_values {
        let values: Vec<String> = allowed.iter().map(|v| format!("`{}`", v)).collect();
        let _ = write!(out, " Allowed values: {}.", values.join(", "));
    }
    out.push('\n');
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ProviderSchema> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ProviderSchema {
    REGISTRY.get_or_init(|| {
        let mut final_schema = ProviderSchema::default();

        for content in RESOURCE_FILES {
            let partial: ProviderSchema = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_schema.resources.extend(partial.resources);
        }

        final_schema
    })
}

/// Get a resource definition by type name
pub fn get_resource(resource_type: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(resource_type)
}

/// Get all resource type names
pub fn get_all_resource_types() -> Vec<&'static str> {
    get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook() -> &'static ResourceDef {
        get_resource("frontegg_webhook").expect("webhook resource should exist")
    }

    #[test]
    fn test_registry_loads_successfully() {
        let registry = get_registry();
        assert!(
            !registry.resources.is_empty(),
            "Registry should have resources"
        );
        assert!(get_all_resource_types().contains(&"frontegg_webhook"));
    }

    #[test]
    fn test_webhook_schema_shape() {
        let def = webhook();
        assert_eq!(def.attributes.len(), 10);
        assert!(def.importable);

        let user: Vec<_> = def.user_attributes().map(|(n, _)| n).collect();
        assert_eq!(
            user,
            vec!["description", "enabled", "events", "name", "secret", "url"]
        );

        let computed: Vec<_> = def.computed_attributes().map(|(n, _)| n).collect();
        assert_eq!(computed, vec!["created_at", "tenant_id", "type", "vendor_id"]);
    }

    #[test]
    fn test_events_allow_list_has_thirteen_entries() {
        let events = webhook().attribute("events").unwrap();
        assert_eq!(events.kind, AttributeKind::StringSet);
        assert_eq!(events.allowed_values.as_ref().unwrap().len(), 13);
    }

    #[test]
    fn test_normalize_string_set_dedupes_and_sorts() {
        let value = AttributeKind::StringSet
            .normalize(&json!(["b", "a", "b"]))
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[test]
    fn test_normalize_rejects_wrong_type() {
        assert!(AttributeKind::Bool.normalize(&json!("true")).is_err());
        assert!(AttributeKind::String.normalize(&json!(1)).is_err());
        assert!(AttributeKind::StringSet.normalize(&json!([1])).is_err());
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let errors = webhook().validate(&json!({
            "enabled": "yes",
            "events": ["frontegg.user.bogus"],
            "tenant_id": "t-1",
            "colour": "blue"
        }));

        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"colour"));
        assert!(paths.contains(&"enabled"));
        assert!(paths.contains(&"events"));
        assert!(paths.contains(&"tenant_id"));
        for missing in ["name", "description", "url", "secret"] {
            assert!(paths.contains(&missing), "{} should be reported missing", missing);
        }
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let errors = webhook().validate(&json!([]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_render_markdown_lists_sections() {
        let doc = webhook().render_markdown("frontegg_webhook");
        assert!(doc.starts_with("# frontegg_webhook (Resource)"));
        assert!(doc.contains("### Required"));
        assert!(doc.contains("### Read-Only"));
        assert!(doc.contains("`frontegg.user.signedUp`"));
        assert!(doc.contains("## Import"));
        assert!(!doc.contains("### Optional"));
    }
}
