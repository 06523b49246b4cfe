// crates/cluster-config/src/schema.rs
// ============================================================================
// Module: Resource Schemas
// Description: JSON schema templates and composition for versioned resources.
// Purpose: Provide the structural contract consulted before unmarshaling.
// Dependencies: cluster-config-core, serde_json
// ============================================================================

//! ## Overview
//! Every resource kind/version pair maps to exactly one spec schema template.
//! The effective document is the v2 envelope: `kind` and `version` are pinned
//! with `const`, optional `metadata` uses the shared metadata schema, and
//! `spec` uses the per-kind template. All objects declare `additionalProperties: false`.
//!
//! Templates accept an optional [`SchemaExtension`]. Extension properties are
//! spliced into the spec property set as declared properties; the
//! additional-property policy is never relaxed. Composition is pure and
//! infallible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::OnceLock;

use cluster_config_core::KIND_CLUSTER_AUTH_PREFERENCE;
use cluster_config_core::V2;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON Schema dialect declared by every resource schema.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

// ============================================================================
// SECTION: Extensions
// ============================================================================

/// Schema extension parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaExtensionError {
    /// The fragment is not a JSON object body.
    #[error("invalid schema extension: {0}")]
    Invalid(String),
}

/// Caller-supplied property definitions spliced into a spec schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaExtension {
    /// Property name to property schema.
    properties: Map<String, Value>,
}

impl SchemaExtension {
    /// Creates an empty extension.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property definition.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Parses a textual fragment such as `"extra":{"type":"string"}`.
    ///
    /// A blank fragment yields an empty extension.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaExtensionError`] when the fragment is not the body of
    /// a JSON object whose values are schemas.
    pub fn parse(fragment: &str) -> Result<Self, SchemaExtensionError> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(&format!("{{{trimmed}}}"))
            .map_err(|err| SchemaExtensionError::Invalid(err.to_string()))?;
        let Value::Object(properties) = value else {
            return Err(SchemaExtensionError::Invalid(
                "fragment must describe object properties".to_string(),
            ));
        };
        for (name, schema) in &properties {
            if !schema.is_object() && !schema.is_boolean() {
                return Err(SchemaExtensionError::Invalid(format!(
                    "property {name} must map to a schema object"
                )));
            }
        }
        Ok(Self {
            properties,
        })
    }

    /// Returns true when no properties are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the declared property definitions.
    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

// ============================================================================
// SECTION: Shared Schemas
// ============================================================================

/// Schema for the shared resource metadata block.
#[must_use]
pub fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["name"],
        "properties": {
            "name": { "type": "string" },
            "namespace": { "type": "string", "default": "default" },
            "description": { "type": "string" },
            "labels": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            }
        }
    })
}

/// Wraps a spec schema in the v2 resource envelope.
#[must_use]
pub fn v2_envelope_schema(kind: &str, version: &str, spec_schema: Value) -> Value {
    json!({
        "$schema": SCHEMA_DIALECT,
        "type": "object",
        "additionalProperties": false,
        "required": ["kind", "version", "spec"],
        "properties": {
            "kind": { "type": "string", "const": kind },
            "version": { "type": "string", "const": version },
            "metadata": metadata_schema(),
            "spec": spec_schema
        }
    })
}

/// Splices extension properties into an object schema's property set.
///
/// Base definitions win over extension entries with the same name, so an
/// extension can only add properties.
fn splice_extension(mut schema: Value, extension: Option<&SchemaExtension>) -> Value {
    let Some(extension) = extension else {
        return schema;
    };
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        for (name, definition) in extension.properties() {
            properties.entry(name.clone()).or_insert_with(|| definition.clone());
        }
    }
    schema
}

// ============================================================================
// SECTION: Cluster Auth Preference
// ============================================================================

/// Spec schema template for the v2 cluster authentication preference.
#[must_use]
pub fn cluster_auth_preference_spec_schema(extension: Option<&SchemaExtension>) -> Value {
    let base = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "type": { "type": "string" },
            "second_factor": { "type": "string" },
            "oidc": { "type": "string" },
            "u2f": { "type": "string" },
            "ldap": { "type": "string" }
        }
    });
    splice_extension(base, extension)
}

/// Returns the effective schema for the v2 cluster authentication preference.
#[must_use]
pub fn cluster_auth_preference_schema(extension: Option<&SchemaExtension>) -> Value {
    v2_envelope_schema(
        KIND_CLUSTER_AUTH_PREFERENCE,
        V2,
        cluster_auth_preference_spec_schema(extension),
    )
}

/// Returns the base cluster authentication preference schema.
///
/// Computed once per process and shared read-only afterwards.
#[must_use]
pub fn base_cluster_auth_preference_schema() -> &'static Value {
    static BASE: OnceLock<Value> = OnceLock::new();
    BASE.get_or_init(|| cluster_auth_preference_schema(None))
}

/// Renders a schema document as stable, pretty-printed JSON.
#[must_use]
pub fn schema_text(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_default()
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Spec schema template for one resource kind/version.
pub type SpecSchemaTemplate = fn(Option<&SchemaExtension>) -> Value;

/// Registry of spec schema templates keyed by kind and version.
///
/// # Invariants
/// - A kind/version pair maps to at most one template.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Templates keyed by `(kind, version)`.
    templates: BTreeMap<(String, String), SpecSchemaTemplate>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in resource template.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            KIND_CLUSTER_AUTH_PREFERENCE,
            V2,
            cluster_auth_preference_spec_schema,
        );
        registry
    }

    /// Registers a template, returning the template it replaced.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        version: impl Into<String>,
        template: SpecSchemaTemplate,
    ) -> Option<SpecSchemaTemplate> {
        self.templates.insert((kind.into(), version.into()), template)
    }

    /// Returns true when a template exists for the pair.
    #[must_use]
    pub fn contains(&self, kind: &str, version: &str) -> bool {
        self.templates.contains_key(&(kind.to_string(), version.to_string()))
    }

    /// Returns the effective envelope schema for a kind/version pair.
    ///
    /// An empty or absent extension yields the base template unchanged.
    #[must_use]
    pub fn schema_for(
        &self,
        kind: &str,
        version: &str,
        extension: Option<&SchemaExtension>,
    ) -> Option<Value> {
        self.templates
            .get(&(kind.to_string(), version.to_string()))
            .map(|template| v2_envelope_schema(kind, version, template(extension)))
    }

    /// Returns the registered kind/version pairs in sorted order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.templates.keys().map(|(kind, version)| (kind.as_str(), version.as_str())).collect()
    }
}
