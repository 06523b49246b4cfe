// crates/cluster-config/src/settings.rs
// ============================================================================
// Module: Loader Settings
// Description: TOML settings for configuration loading and audit routing.
// Purpose: Provide strict, fail-closed settings parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Loader settings bound input sizes, toggle legacy ingestion, and select
//! the audit sink. Settings are parsed from TOML with unknown keys rejected
//! and are validated before use.
//! Security posture: settings inputs are untrusted; oversized or malformed
//! files fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::audit::ConfigAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::marshal::DEFAULT_MAX_DOCUMENT_BYTES;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum settings file size in bytes.
pub(crate) const MAX_SETTINGS_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for any configurable input size limit.
pub(crate) const MAX_INPUT_LIMIT_BYTES: usize = 16 * 1024 * 1024;
/// Default maximum encoded legacy payload size in bytes.
pub(crate) const DEFAULT_MAX_ENCODED_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O failure while reading settings.
    #[error("settings io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("settings parse error: {0}")]
    Parse(String),
    /// Invalid settings data.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Settings Types
// ============================================================================

/// Configuration loader settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderSettings {
    /// Input size limits.
    #[serde(default)]
    pub limits: LimitSettings,
    /// Legacy layout ingestion.
    #[serde(default)]
    pub legacy: LegacySettings,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditSettings,
}

impl LoaderSettings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when reading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| SettingsError::Io(err.to_string()))?;
        if bytes.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::Invalid("settings file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| SettingsError::Invalid("settings file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(content).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when settings are invalid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.limits.validate()?;
        self.legacy.validate()?;
        self.audit.validate()
    }

    /// Builds the audit sink selected by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn ConfigAuditSink>, SettingsError> {
        match self.audit.sink {
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::Disabled => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    SettingsError::Invalid("audit.path is required for file sink".to_string())
                })?;
                let sink = FileAuditSink::new(Path::new(path))
                    .map_err(|err| SettingsError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

/// Input size limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitSettings {
    /// Maximum canonical document size in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl LimitSettings {
    /// Validates limit settings.
    fn validate(&self) -> Result<(), SettingsError> {
        validate_limit("limits.max_document_bytes", self.max_document_bytes)
    }
}

/// Legacy layout ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacySettings {
    /// Whether legacy layouts are accepted.
    #[serde(default = "default_legacy_enabled")]
    pub enabled: bool,
    /// Maximum legacy payload size in bytes, encoded or plain.
    #[serde(default = "default_max_encoded_bytes")]
    pub max_encoded_bytes: usize,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self {
            enabled: default_legacy_enabled(),
            max_encoded_bytes: default_max_encoded_bytes(),
        }
    }
}

impl LegacySettings {
    /// Validates legacy settings.
    fn validate(&self) -> Result<(), SettingsError> {
        validate_limit("legacy.max_encoded_bytes", self.max_encoded_bytes)
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    #[serde(rename = "none")]
    Disabled,
}

/// Audit sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSettings {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path (file sink only).
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditSettings {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), SettingsError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(SettingsError::Invalid("audit.path is required for file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(SettingsError::Invalid("audit.path is only valid for file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default canonical document limit.
pub(crate) const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

/// Legacy ingestion is on by default.
pub(crate) const fn default_legacy_enabled() -> bool {
    true
}

/// Default legacy payload limit.
pub(crate) const fn default_max_encoded_bytes() -> usize {
    DEFAULT_MAX_ENCODED_BYTES
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a byte limit against the hard bounds.
fn validate_limit(field: &str, value: usize) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::Invalid(format!("{field} must be greater than zero")));
    }
    if value > MAX_INPUT_LIMIT_BYTES {
        return Err(SettingsError::Invalid(format!(
            "{field} exceeds maximum of {MAX_INPUT_LIMIT_BYTES}"
        )));
    }
    Ok(())
}

/// Validates a settings path against length limits.
fn validate_path(path: &Path) -> Result<(), SettingsError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SettingsError::Invalid("settings path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SettingsError::Invalid("settings path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), SettingsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SettingsError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SettingsError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SettingsError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
