// crates/cluster-config-core/src/lib.rs
// ============================================================================
// Module: Cluster Config Core Library
// Description: Public API surface for canonical configuration resources.
// Purpose: Expose resource identifiers, metadata, and semantic checks.
// Dependencies: crate::{identifiers, metadata, resource, auth_preference}
// ============================================================================

//! ## Overview
//! Cluster config core defines the canonical, versioned shape of cluster
//! configuration resources. Every resource carries a kind/version tag,
//! metadata, and a resource-specific spec. Shape validation lives in the
//! `cluster-config` crate; this crate owns the typed model and the semantic
//! [`SemanticCheck`] extension point.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth_preference;
pub mod identifiers;
pub mod metadata;
pub mod resource;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth_preference::AuthPreferenceRules;
pub use auth_preference::AuthType;
pub use auth_preference::ClusterAuthPreferenceSpecV2;
pub use auth_preference::ClusterAuthPreferenceV2;
pub use auth_preference::SecondFactor;
pub use identifiers::*;
pub use metadata::Metadata;
pub use resource::AcceptAll;
pub use resource::CheckError;
pub use resource::CheckFn;
pub use resource::Resource;
pub use resource::ResourceError;
pub use resource::SemanticCheck;
