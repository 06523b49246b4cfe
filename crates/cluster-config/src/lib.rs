// crates/cluster-config/src/lib.rs
// ============================================================================
// Module: Cluster Config Library
// Description: Schema registry, validated marshaling, and legacy ingestion.
// Purpose: Single gateway from serialized configuration to checked resources.
// Dependencies: cluster-config-core, jsonschema, serde, toml
// ============================================================================

//! ## Overview
//! `cluster-config` turns untrusted serialized configuration into canonical,
//! checked resources. The [`SchemaRegistry`] holds one schema per resource
//! kind/version, the [`ValidatedMarshaler`] enforces it on every unmarshal,
//! and the [`ConfigLoader`] dispatches between canonical documents and legacy
//! file layouts.
//!
//! Security posture: configuration inputs are untrusted and every stage
//! fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod legacy;
pub mod loader;
pub mod marshal;
pub mod schema;
pub mod settings;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ConfigAuditEvent;
pub use audit::ConfigAuditSink;
pub use audit::FileAuditSink;
pub use audit::LoadOutcome;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use legacy::FileConfig;
pub use legacy::LegacyError;
pub use legacy::LegacyOidcConnector;
pub use legacy::LegacyTranslation;
pub use legacy::LegacyU2f;
pub use loader::ConfigLoader;
pub use loader::ConfigShape;
pub use loader::LoadError;
pub use loader::LoadedAuthPreference;
pub use loader::detect_shape;
pub use marshal::MarshalError;
pub use marshal::MarshalOption;
pub use marshal::ResourceMarshaler;
pub use marshal::ValidatedMarshaler;
pub use schema::SchemaExtension;
pub use schema::SchemaExtensionError;
pub use schema::SchemaRegistry;
pub use schema::cluster_auth_preference_schema;
pub use settings::LoaderSettings;
pub use settings::SettingsError;
