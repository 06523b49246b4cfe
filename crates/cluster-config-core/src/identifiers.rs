// crates/cluster-config-core/src/identifiers.rs
// ============================================================================
// Module: Resource Identifiers
// Description: Kind, version, and well-known name constants for resources.
// Purpose: Keep wire tags stable and shared across marshaling and checks.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Resource kinds and versions are plain strings on the wire. The constants
//! here are the only values the canonical model emits; anything else is
//! rejected by the schema envelope or by semantic checks.

/// Kind tag for the cluster authentication preference resource.
pub const KIND_CLUSTER_AUTH_PREFERENCE: &str = "cluster_auth_preference";

/// Schema revision tag for v2 resources.
pub const V2: &str = "v2";

/// Well-known name of the singleton cluster authentication preference.
pub const META_NAME_CLUSTER_AUTH_PREFERENCE: &str = "cluster-auth-preference";

/// Namespace assigned to resources when none is given.
pub const DEFAULT_NAMESPACE: &str = "default";
