// crates/cluster-config/src/marshal.rs
// ============================================================================
// Module: Validated Marshaling
// Description: Schema-gated conversion between bytes and canonical resources.
// Purpose: Ensure no resource is built from input the schema rejects.
// Dependencies: cluster-config-core, jsonschema, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! [`ValidatedMarshaler`] is the single gateway from untrusted bytes to a
//! canonical resource. Unmarshaling validates the whole document against the
//! registered envelope schema before deserializing; any structural violation
//! is returned as [`MarshalError::SchemaViolation`] and nothing is built.
//!
//! Metadata is never taken from the wire; every unmarshaled resource carries
//! the canonical metadata of its kind.
//!
//! Semantic checks are not run here. Callers that need semantic guarantees
//! run a [`cluster_config_core::SemanticCheck`] on the result or go through
//! the configuration loader.
//!
//! Security posture: inputs are untrusted and size-limited; validation fails
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::OnceLock;

use cluster_config_core::Resource;
use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::schema::SchemaExtension;
use crate::schema::SchemaRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum serialized resource size in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Marshaling errors.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// Zero-length input.
    #[error("missing resource data")]
    EmptyInput,
    /// Input exceeds the configured size limit.
    #[error("resource data exceeds size limit ({actual} > {limit} bytes)")]
    InputTooLarge {
        /// Input size in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Document is malformed or does not match the schema.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    /// No schema is registered for the resource kind/version, or the
    /// registered schema does not compile.
    #[error("schema unavailable: {0}")]
    Schema(String),
    /// Requested output version does not match the resource.
    #[error("unsupported version {requested} (resource is {actual})")]
    UnsupportedVersion {
        /// Version requested by the caller.
        requested: String,
        /// Version carried by the resource.
        actual: String,
    },
    /// Serialization failed.
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl MarshalError {
    /// Returns a stable label for audit classification.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::InputTooLarge {
                ..
            } => "input_too_large",
            Self::SchemaViolation(_) => "schema_violation",
            Self::Schema(_) => "schema_unavailable",
            Self::UnsupportedVersion {
                ..
            } => "unsupported_version",
            Self::Serialize(_) => "serialize",
        }
    }
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Options altering marshaled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalOption {
    /// Pretty-print JSON output.
    Indent,
    /// Emit YAML instead of JSON.
    Yaml,
    /// Require the resource to carry this version.
    WithVersion(String),
}

/// Output encoding selected from marshal options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Compact JSON.
    Json,
    /// Pretty JSON.
    PrettyJson,
    /// YAML.
    Yaml,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Conversion between serialized bytes and a canonical resource.
pub trait ResourceMarshaler<R>: Send + Sync {
    /// Validates and deserializes a resource.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] when input is empty, oversized, malformed, or
    /// rejected by the schema.
    fn unmarshal(&self, bytes: &[u8]) -> Result<R, MarshalError>;

    /// Serializes a resource without re-validating it.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] when an option cannot be honored or
    /// serialization fails.
    fn marshal(&self, resource: &R, options: &[MarshalOption]) -> Result<Vec<u8>, MarshalError>;
}

// ============================================================================
// SECTION: Validated Marshaler
// ============================================================================

/// Schema-validating marshaler for one resource type.
///
/// # Invariants
/// - The compiled validator is built at most once and never mutated.
pub struct ValidatedMarshaler<R> {
    /// Registry providing the resource schema.
    registry: Arc<SchemaRegistry>,
    /// Optional extension spliced into the spec schema.
    extension: Option<SchemaExtension>,
    /// Maximum accepted input size in bytes.
    max_document_bytes: usize,
    /// Lazily compiled validator (or compilation failure).
    validator: OnceLock<Result<Validator, String>>,
    /// Resource type marker.
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ValidatedMarshaler<R> {
    /// Creates a marshaler backed by the given registry.
    #[must_use]
    pub const fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            extension: None,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            validator: OnceLock::new(),
            resource: PhantomData,
        }
    }

    /// Creates a marshaler backed by the built-in registry.
    #[must_use]
    pub fn with_default_registry() -> Self {
        Self::new(Arc::new(SchemaRegistry::with_defaults()))
    }

    /// Validates against the base schema extended with `extension`.
    #[must_use]
    pub fn with_extension(mut self, extension: SchemaExtension) -> Self {
        self.extension = Some(extension);
        self.validator = OnceLock::new();
        self
    }

    /// Sets the maximum accepted input size in bytes.
    #[must_use]
    pub fn with_max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = limit;
        self
    }

    /// Returns the effective schema document used for validation.
    #[must_use]
    pub fn schema(&self) -> Option<Value> {
        self.registry.schema_for(R::KIND, R::VERSION, self.extension.as_ref())
    }

    /// Returns the compiled validator, compiling it on first use.
    fn validator(&self) -> Result<&Validator, MarshalError> {
        let compiled = self.validator.get_or_init(|| {
            let schema = self
                .schema()
                .ok_or_else(|| format!("no schema registered for {} {}", R::KIND, R::VERSION))?;
            compile_schema(&schema)
        });
        compiled.as_ref().map_err(|err| MarshalError::Schema(err.clone()))
    }
}

impl<R: Resource> ResourceMarshaler<R> for ValidatedMarshaler<R> {
    fn unmarshal(&self, bytes: &[u8]) -> Result<R, MarshalError> {
        if bytes.is_empty() {
            return Err(MarshalError::EmptyInput);
        }
        if bytes.len() > self.max_document_bytes {
            return Err(MarshalError::InputTooLarge {
                actual: bytes.len(),
                limit: self.max_document_bytes,
            });
        }
        let document = parse_document(bytes)?;
        let validator = self.validator()?;
        let messages: Vec<String> =
            validator.iter_errors(&document).map(|err| err.to_string()).collect();
        if !messages.is_empty() {
            return Err(MarshalError::SchemaViolation(messages.join("; ")));
        }
        let mut resource: R = serde_json::from_value(document)
            .map_err(|err| MarshalError::SchemaViolation(err.to_string()))?;
        resource.set_metadata(R::canonical_metadata());
        Ok(resource)
    }

    fn marshal(&self, resource: &R, options: &[MarshalOption]) -> Result<Vec<u8>, MarshalError> {
        let mut format = OutputFormat::Json;
        for option in options {
            match option {
                MarshalOption::Indent => {
                    if format == OutputFormat::Json {
                        format = OutputFormat::PrettyJson;
                    }
                }
                MarshalOption::Yaml => format = OutputFormat::Yaml,
                MarshalOption::WithVersion(requested) => {
                    if requested != resource.version() {
                        return Err(MarshalError::UnsupportedVersion {
                            requested: requested.clone(),
                            actual: resource.version().to_string(),
                        });
                    }
                }
            }
        }
        match format {
            OutputFormat::Json => serde_json::to_vec(resource)
                .map_err(|err| MarshalError::Serialize(err.to_string())),
            OutputFormat::PrettyJson => serde_json::to_vec_pretty(resource)
                .map_err(|err| MarshalError::Serialize(err.to_string())),
            OutputFormat::Yaml => serde_yaml::to_string(resource)
                .map(String::into_bytes)
                .map_err(|err| MarshalError::Serialize(err.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses JSON or YAML bytes into a JSON document.
///
/// JSON is attempted first for precise error positions; YAML is the
/// fallback since every JSON document is also YAML.
pub(crate) fn parse_document(bytes: &[u8]) -> Result<Value, MarshalError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| MarshalError::SchemaViolation("document must be utf-8".to_string()))?;
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }
    serde_yaml::from_str::<Value>(text)
        .map_err(|err| MarshalError::SchemaViolation(format!("malformed document: {err}")))
}

/// Compiles a JSON schema for validation.
fn compile_schema(schema: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| format!("invalid schema: {err}"))
}
