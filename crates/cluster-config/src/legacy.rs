// crates/cluster-config/src/legacy.rs
// ============================================================================
// Module: Legacy Authentication Configuration
// Description: Parsing of deprecated file-config authentication sections.
// Purpose: Keep older OIDC connector and U2F layouts loadable.
// Dependencies: base64, cluster-config-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! Older configuration files declared OIDC connectors and U2F settings
//! directly under `auth_service`. That layout is structurally unrelated to
//! the canonical resource, so it is parsed on its own terms and never run
//! through the resource schema.
//!
//! Parsing is a faithful read: connector fields are plain strings, the U2F
//! `enabled` flag is kept verbatim, and facet order and duplicates are
//! preserved. Interpretation happens only in [`translate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cluster_config_core::ClusterAuthPreferenceSpecV2;
use cluster_config_core::SecondFactor;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Top-level key holding the legacy authentication section.
pub(crate) const AUTH_SERVICE_KEY: &str = "auth_service";
/// Top-level keys that only belong to canonical resource documents.
const CANONICAL_RESOURCE_KEYS: [&str; 3] = ["kind", "version", "spec"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Legacy configuration errors.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyError {
    /// Transport encoding is malformed.
    #[error("legacy config decode error: {0}")]
    Decode(String),
    /// Structured document is malformed.
    #[error("legacy config parse error: {0}")]
    Parse(String),
}

impl LegacyError {
    /// Returns a stable label for audit classification.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Parse(_) => "parse_error",
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// File configuration document, reduced to the sections read here.
///
/// Unrelated top-level sections of the broader file are ignored, but the
/// `auth_service` section itself is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Authentication service section.
    pub auth_service: AuthServiceSection,
}

/// `auth_service` section of the file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthServiceSection {
    /// Newer in-file authentication block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationSection>,
    /// Deprecated OIDC connector declarations.
    #[serde(default)]
    pub oidc_connectors: Vec<LegacyOidcConnector>,
    /// Deprecated U2F block.
    #[serde(default)]
    pub u2f: LegacyU2f,
}

/// In-file authentication block mirroring the canonical spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthenticationSection {
    /// Primary authentication mechanism.
    #[serde(rename = "type", default)]
    pub auth_type: String,
    /// Second factor mode.
    #[serde(default)]
    pub second_factor: String,
    /// OIDC connector reference.
    #[serde(default)]
    pub oidc: String,
    /// U2F configuration reference.
    #[serde(default)]
    pub u2f: String,
    /// LDAP connector reference.
    #[serde(default)]
    pub ldap: String,
}

/// Deprecated OIDC connector declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyOidcConnector {
    /// Connector identifier.
    #[serde(default)]
    pub id: String,
    /// OAuth redirect URL.
    #[serde(default)]
    pub redirect_url: String,
    /// OAuth client identifier.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Identity provider issuer URL.
    #[serde(default)]
    pub issuer_url: String,
}

/// Deprecated U2F block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyU2f {
    /// Enabled flag, kept exactly as written.
    #[serde(rename = "enabled", default, deserialize_with = "deserialize_flag")]
    pub enabled_flag: String,
    /// U2F application identifier.
    #[serde(default)]
    pub app_id: String,
    /// Trusted facet origins, in declaration order.
    #[serde(default)]
    pub facets: Vec<String>,
}

impl LegacyU2f {
    /// Returns true when the flag reads as an affirmative value.
    #[must_use]
    pub fn enabled(&self) -> bool {
        flag_enabled(&self.enabled_flag)
    }
}

// ============================================================================
// SECTION: Decode / Parse
// ============================================================================

/// Decodes a base64-encoded file configuration.
///
/// ASCII whitespace anywhere in the encoded text is ignored, so wrapped
/// encodings are accepted.
///
/// # Errors
///
/// Returns [`LegacyError::Decode`] for malformed base64 or a non-UTF-8
/// payload, and [`LegacyError::Parse`] for a malformed document.
pub fn decode(encoded: &str) -> Result<FileConfig, LegacyError> {
    let compact: String = encoded.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(LegacyError::Decode("encoded config is empty".to_string()));
    }
    let bytes =
        STANDARD.decode(compact.as_bytes()).map_err(|err| LegacyError::Decode(err.to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| LegacyError::Decode("decoded config must be utf-8".to_string()))?;
    parse(&text)
}

/// Parses a plain-text file configuration.
///
/// # Errors
///
/// Returns [`LegacyError::Parse`] when the document is malformed, is not a
/// mapping, lacks an `auth_service` mapping, carries canonical resource
/// keys, or a section has the wrong structure.
pub fn parse(text: &str) -> Result<FileConfig, LegacyError> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| LegacyError::Parse(err.to_string()))?;
    let serde_yaml::Value::Mapping(root) = &document else {
        return Err(LegacyError::Parse("legacy config must be a mapping".to_string()));
    };
    if let Some(key) = CANONICAL_RESOURCE_KEYS.iter().find(|key| root.contains_key(**key)) {
        return Err(LegacyError::Parse(format!(
            "legacy config must not carry canonical resource key '{key}'"
        )));
    }
    match root.get(AUTH_SERVICE_KEY) {
        Some(serde_yaml::Value::Mapping(_)) => {}
        Some(_) => {
            return Err(LegacyError::Parse("auth_service must be a mapping".to_string()));
        }
        None => {
            return Err(LegacyError::Parse("legacy config requires auth_service".to_string()));
        }
    }
    serde_yaml::from_value(document).map_err(|err| LegacyError::Parse(err.to_string()))
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Canonical view of a file configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTranslation {
    /// Canonical spec, not yet normalized or checked.
    pub spec: ClusterAuthPreferenceSpecV2,
    /// Legacy connectors, in input order, for separate registration.
    pub connectors: Vec<LegacyOidcConnector>,
}

/// Maps a file configuration onto canonical spec fields.
///
/// Legacy connectors stay separate resources; the resource spec references
/// the first one by id. Explicit values from the `authentication` block
/// always win.
#[must_use]
pub fn translate(config: &FileConfig) -> LegacyTranslation {
    let section = &config.auth_service;
    let explicit = section.authentication.clone().unwrap_or_default();

    let mut spec = ClusterAuthPreferenceSpecV2 {
        auth_type: explicit.auth_type,
        second_factor: explicit.second_factor,
        oidc: explicit.oidc,
        u2f: explicit.u2f,
        ldap: explicit.ldap,
    };
    if spec.auth_type.trim().is_empty() {
        spec.auth_type = "local".to_string();
    }
    if spec.oidc.trim().is_empty()
        && let Some(first) = section.oidc_connectors.first()
    {
        spec.oidc.clone_from(&first.id);
    }
    if section.u2f.enabled() && spec.second_factor.trim().is_empty() {
        spec.second_factor = SecondFactor::U2f.as_str().to_string();
        if spec.u2f.trim().is_empty() {
            spec.u2f.clone_from(&section.u2f.app_id);
        }
    }

    LegacyTranslation {
        spec,
        connectors: section.oidc_connectors.clone(),
    }
}

/// Returns true for affirmative flag spellings (`yes`, `true`, `on`, `1`).
#[must_use]
pub fn flag_enabled(flag: &str) -> bool {
    matches!(flag.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "on" | "1")
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Raw flag value as written in YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    /// Quoted or bare string.
    Text(String),
    /// YAML boolean.
    Bool(bool),
    /// YAML integer.
    Int(i64),
}

/// Deserializes a flag into its textual form without interpreting it.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawFlag>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawFlag::Text(text)) => text,
        Some(RawFlag::Bool(value)) => value.to_string(),
        Some(RawFlag::Int(value)) => value.to_string(),
        None => String::new(),
    })
}
