// crates/cluster-config-core/src/metadata.rs
// ============================================================================
// Module: Resource Metadata
// Description: Name, namespace, and descriptive labels for resources.
// Purpose: Shared metadata block embedded in every versioned resource.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Metadata is assigned at construction time and not mutated afterwards.
//! Optional fields are omitted from the wire form when unset so that
//! marshaling round-trips are exact.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::DEFAULT_NAMESPACE;

/// Resource metadata.
///
/// # Invariants
/// - `namespace` defaults to [`DEFAULT_NAMESPACE`] when absent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form string labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Metadata {
    /// Creates metadata in the default namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: default_namespace(),
            description: None,
            labels: BTreeMap::new(),
        }
    }
}

/// Returns the default namespace for serde defaults.
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
