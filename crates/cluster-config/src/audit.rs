// crates/cluster-config/src/audit.rs
// ============================================================================
// Module: Config Audit Logging
// Description: Structured audit events for configuration load attempts.
// Purpose: Emit payload-free audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every configuration load attempt produces one [`ConfigAuditEvent`]. Events
//! carry sizes, shapes, and error classifications only; raw documents and
//! connector secrets are never logged. Sinks are pluggable so deployments
//! can route events to their preferred logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::loader::ConfigShape;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Load attempt outcome classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A checked resource was produced.
    Ok,
    /// The attempt failed.
    Error,
}

/// Configuration load audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Resource kind the loader targets.
    pub kind: &'static str,
    /// Resource version the loader targets.
    pub version: &'static str,
    /// Detected input shape, when detection ran.
    pub shape: Option<ConfigShape>,
    /// Attempt outcome.
    pub outcome: LoadOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Input size in bytes.
    pub input_bytes: usize,
    /// Number of legacy connectors surfaced by the attempt.
    pub legacy_connectors: usize,
}

/// Inputs required to construct a config audit event.
pub struct ConfigAuditEventParams {
    /// Resource kind the loader targets.
    pub kind: &'static str,
    /// Resource version the loader targets.
    pub version: &'static str,
    /// Detected input shape, when detection ran.
    pub shape: Option<ConfigShape>,
    /// Attempt outcome.
    pub outcome: LoadOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Input size in bytes.
    pub input_bytes: usize,
    /// Number of legacy connectors surfaced by the attempt.
    pub legacy_connectors: usize,
}

impl ConfigAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ConfigAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "config_load",
            timestamp_ms,
            kind: params.kind,
            version: params.version,
            shape: params.shape,
            outcome: params.outcome,
            error_kind: params.error_kind,
            input_bytes: params.input_bytes,
            legacy_connectors: params.legacy_connectors,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for configuration load events.
pub trait ConfigAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ConfigAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ConfigAuditSink for StderrAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ConfigAuditSink for FileAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ConfigAuditSink for NoopAuditSink {
    fn record(&self, _event: &ConfigAuditEvent) {}
}
