// crates/cluster-config/src/loader.rs
// ============================================================================
// Module: Configuration Loader
// Description: Shape detection and dispatch for auth preference inputs.
// Purpose: Route canonical and legacy layouts to the right parser.
// Dependencies: base64, cluster-config-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The loader is the boundary where canonical resources and legacy file
//! layouts meet. It sniffs the input shape, sends canonical documents through
//! the injected [`ResourceMarshaler`] and legacy documents through the legacy
//! parser, then runs the injected [`SemanticCheck`] on the result. Legacy
//! documents are never validated against the canonical schema.
//!
//! Inputs larger than every configured limit are rejected before the shape
//! is sniffed. Every attempt emits one audit event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cluster_config_core::AuthPreferenceRules;
use cluster_config_core::ClusterAuthPreferenceV2;
use cluster_config_core::KIND_CLUSTER_AUTH_PREFERENCE;
use cluster_config_core::ResourceError;
use cluster_config_core::SemanticCheck;
use cluster_config_core::V2;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::audit::ConfigAuditEvent;
use crate::audit::ConfigAuditEventParams;
use crate::audit::ConfigAuditSink;
use crate::audit::LoadOutcome;
use crate::audit::NoopAuditSink;
use crate::legacy;
use crate::legacy::AUTH_SERVICE_KEY;
use crate::legacy::LegacyError;
use crate::legacy::LegacyOidcConnector;
use crate::marshal::MarshalError;
use crate::marshal::ResourceMarshaler;
use crate::marshal::ValidatedMarshaler;
use crate::marshal::parse_document;
use crate::settings::LoaderSettings;
use crate::settings::SettingsError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Detected input layout.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigShape {
    /// Versioned resource document.
    Canonical,
    /// Plain-text file configuration.
    Legacy,
    /// Base64-encoded file configuration.
    EncodedLegacy,
}

impl ConfigShape {
    /// Returns true for either legacy layout.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy | Self::EncodedLegacy)
    }
}

/// Loader errors.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Zero-length input.
    #[error("missing configuration data")]
    EmptyInput,
    /// Canonical document rejected by the marshaler.
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    /// Legacy document could not be decoded or parsed.
    #[error(transparent)]
    Legacy(#[from] LegacyError),
    /// Resource failed its semantic check.
    #[error("semantic check failed: {0}")]
    SemanticInvalid(String),
    /// Input exceeds every configured size limit and was not inspected.
    #[error("configuration data exceeds size limit ({actual} > {limit} bytes)")]
    InputTooLarge {
        /// Input size in bytes.
        actual: usize,
        /// Largest configured limit in bytes.
        limit: usize,
    },
    /// Legacy layout supplied while legacy ingestion is disabled.
    #[error("legacy configuration layouts are disabled")]
    LegacyDisabled,
    /// Legacy payload exceeds the configured size limit.
    #[error("legacy configuration exceeds size limit ({actual} > {limit} bytes)")]
    LegacyTooLarge {
        /// Input size in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}

impl LoadError {
    /// Returns a stable label for audit classification.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::Marshal(err) => err.kind_label(),
            Self::Legacy(err) => err.kind_label(),
            Self::SemanticInvalid(_) => "semantic_invalid",
            Self::InputTooLarge {
                ..
            } => "input_too_large",
            Self::LegacyDisabled => "legacy_disabled",
            Self::LegacyTooLarge {
                ..
            } => "legacy_too_large",
        }
    }
}

impl From<ResourceError> for LoadError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::SemanticInvalid(check) => Self::SemanticInvalid(check.to_string()),
        }
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAuthPreference {
    /// Checked, normalized resource.
    pub preference: ClusterAuthPreferenceV2,
    /// Layout the resource was read from.
    pub shape: ConfigShape,
    /// Legacy connectors to register separately (legacy layouts only).
    pub legacy_connectors: Vec<LegacyOidcConnector>,
}

// ============================================================================
// SECTION: Shape Detection
// ============================================================================

/// Sniffs the layout of a configuration payload.
///
/// Mappings with an `auth_service` key are the legacy file layout; any other
/// mapping is treated as canonical and left to the schema. A bare string that
/// is standard base64 of UTF-8 text is an encoded legacy file. Every other
/// scalar (booleans, numbers, plain words) is canonical and fails the schema.
#[must_use]
pub fn detect_shape(bytes: &[u8]) -> ConfigShape {
    match parse_document(bytes) {
        Ok(Value::Object(map)) => {
            if map.contains_key(AUTH_SERVICE_KEY) {
                ConfigShape::Legacy
            } else {
                ConfigShape::Canonical
            }
        }
        Ok(Value::String(_)) | Err(_) if decodes_to_text(bytes) => ConfigShape::EncodedLegacy,
        _ => ConfigShape::Canonical,
    }
}

/// Returns true when the payload is standard base64 of UTF-8 text.
fn decodes_to_text(bytes: &[u8]) -> bool {
    let compact: Vec<u8> =
        bytes.iter().copied().filter(|byte| !byte.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return false;
    }
    STANDARD.decode(&compact).is_ok_and(|decoded| std::str::from_utf8(&decoded).is_ok())
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loads the cluster authentication preference from canonical or legacy
/// layouts.
pub struct ConfigLoader {
    /// Marshaler for canonical documents.
    marshaler: Arc<dyn ResourceMarshaler<ClusterAuthPreferenceV2>>,
    /// Semantic rules applied to every loaded resource.
    check: Arc<dyn SemanticCheck<ClusterAuthPreferenceV2>>,
    /// Loader settings.
    settings: LoaderSettings,
    /// Audit sink for load attempts.
    audit: Arc<dyn ConfigAuditSink>,
}

impl ConfigLoader {
    /// Creates a loader with built-in semantic rules and no audit output.
    #[must_use]
    pub fn new(
        marshaler: Arc<dyn ResourceMarshaler<ClusterAuthPreferenceV2>>,
        settings: LoaderSettings,
    ) -> Self {
        Self {
            marshaler,
            check: Arc::new(AuthPreferenceRules),
            settings,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Creates a loader wired entirely from settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when settings are invalid or the audit sink
    /// cannot be opened.
    pub fn from_settings(settings: LoaderSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let marshaler = ValidatedMarshaler::<ClusterAuthPreferenceV2>::with_default_registry()
            .with_max_document_bytes(settings.limits.max_document_bytes);
        let audit = settings.audit_sink()?;
        Ok(Self::new(Arc::new(marshaler), settings).with_audit_sink(audit))
    }

    /// Replaces the semantic check strategy.
    #[must_use]
    pub fn with_check(mut self, check: Arc<dyn SemanticCheck<ClusterAuthPreferenceV2>>) -> Self {
        self.check = check;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn ConfigAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the marshaler used for canonical documents.
    #[must_use]
    pub fn marshaler(&self) -> &dyn ResourceMarshaler<ClusterAuthPreferenceV2> {
        self.marshaler.as_ref()
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Loads and checks the authentication preference from a payload.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the payload is empty, malformed, rejected
    /// by the schema, fails semantic checks, or uses a disabled layout.
    pub fn load(&self, bytes: &[u8]) -> Result<LoadedAuthPreference, LoadError> {
        let (shape, result) = self.dispatch(bytes);
        let (outcome, error_kind, legacy_connectors) = match &result {
            Ok(loaded) => (LoadOutcome::Ok, None, loaded.legacy_connectors.len()),
            Err(err) => (LoadOutcome::Error, Some(err.kind_label()), 0),
        };
        self.audit.record(&ConfigAuditEvent::new(ConfigAuditEventParams {
            kind: KIND_CLUSTER_AUTH_PREFERENCE,
            version: V2,
            shape,
            outcome,
            error_kind,
            input_bytes: bytes.len(),
            legacy_connectors,
        }));
        result
    }

    /// Detects the shape and runs the matching load path.
    fn dispatch(
        &self,
        bytes: &[u8],
    ) -> (Option<ConfigShape>, Result<LoadedAuthPreference, LoadError>) {
        if bytes.is_empty() {
            return (None, Err(LoadError::EmptyInput));
        }
        let limit = self.input_limit();
        if bytes.len() > limit {
            return (
                None,
                Err(LoadError::InputTooLarge {
                    actual: bytes.len(),
                    limit,
                }),
            );
        }
        let shape = detect_shape(bytes);
        let result = match shape {
            ConfigShape::Canonical => self.load_canonical(bytes),
            ConfigShape::Legacy | ConfigShape::EncodedLegacy => self.load_legacy(bytes, shape),
        };
        (Some(shape), result)
    }

    /// Largest input any load path accepts; nothing bigger is inspected.
    fn input_limit(&self) -> usize {
        let settings = &self.settings;
        if settings.legacy.enabled {
            settings.limits.max_document_bytes.max(settings.legacy.max_encoded_bytes)
        } else {
            settings.limits.max_document_bytes
        }
    }

    /// Loads a canonical resource document.
    fn load_canonical(&self, bytes: &[u8]) -> Result<LoadedAuthPreference, LoadError> {
        let mut preference = self.marshaler.unmarshal(bytes)?;
        preference.normalize();
        self.check
            .check(&preference)
            .map_err(|err| LoadError::SemanticInvalid(err.to_string()))?;
        Ok(LoadedAuthPreference {
            preference,
            shape: ConfigShape::Canonical,
            legacy_connectors: Vec::new(),
        })
    }

    /// Loads a legacy file configuration, plain or encoded.
    fn load_legacy(
        &self,
        bytes: &[u8],
        shape: ConfigShape,
    ) -> Result<LoadedAuthPreference, LoadError> {
        if !self.settings.legacy.enabled {
            return Err(LoadError::LegacyDisabled);
        }
        let limit = self.settings.legacy.max_encoded_bytes;
        if bytes.len() > limit {
            return Err(LoadError::LegacyTooLarge {
                actual: bytes.len(),
                limit,
            });
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|_| LegacyError::Decode("legacy config must be utf-8".to_string()))?;
        let file = if shape == ConfigShape::EncodedLegacy {
            legacy::decode(text)?
        } else {
            legacy::parse(text)?
        };
        let translation = legacy::translate(&file);
        let preference =
            ClusterAuthPreferenceV2::new_with_check(translation.spec, self.check.as_ref())?;
        Ok(LoadedAuthPreference {
            preference,
            shape,
            legacy_connectors: translation.connectors,
        })
    }
}
