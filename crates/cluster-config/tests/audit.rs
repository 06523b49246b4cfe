//! Audit sink tests for cluster-config.
// crates/cluster-config/tests/audit.rs
// =============================================================================
// Module: Audit Sink Tests
// Description: JSON-line encoding and file sink behavior.
// Purpose: Ensure load attempts are logged as stable, payload-free records.
// =============================================================================

use std::fs;
use std::sync::Arc;

use cluster_config::ConfigLoader;
use cluster_config::FileAuditSink;
use cluster_config::LoaderSettings;
use cluster_config::NoopAuditSink;
use cluster_config::ValidatedMarshaler;
use cluster_config_core::ClusterAuthPreferenceV2;
use serde_json::Value;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn read_lines(path: &std::path::Path) -> Result<Vec<Value>, String> {
    let content = fs::read_to_string(path).map_err(|err| err.to_string())?;
    content
        .lines()
        .map(|line| serde_json::from_str(line).map_err(|err| err.to_string()))
        .collect()
}

#[test]
fn file_sink_appends_one_line_per_attempt() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let log = dir.path().join("audit.jsonl");
    let sink = FileAuditSink::new(&log).map_err(|err| err.to_string())?;
    let marshaler = ValidatedMarshaler::<ClusterAuthPreferenceV2>::with_default_registry();
    let loader = ConfigLoader::new(Arc::new(marshaler), LoaderSettings::default())
        .with_audit_sink(Arc::new(sink));

    let _ = loader.load(b"");
    let _ = loader.load(b"auth_service:\n  u2f: {}\n");

    let events = read_lines(&log)?;
    if events.len() != 2 {
        return Err(format!("expected 2 lines, got {}", events.len()));
    }
    let first = &events[0];
    if first["event"] != "config_load"
        || first["kind"] != "cluster_auth_preference"
        || first["version"] != "v2"
        || first["outcome"] != "error"
        || first["error_kind"] != "empty_input"
        || !first["shape"].is_null()
    {
        return Err(format!("unexpected first event {first}"));
    }
    let second = &events[1];
    if second["outcome"] != "ok" || second["shape"] != "legacy" || !second["error_kind"].is_null()
    {
        return Err(format!("unexpected second event {second}"));
    }
    if !second["timestamp_ms"].is_u64() {
        return Err("timestamp missing".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_appends_to_existing_log() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let log = dir.path().join("audit.jsonl");
    fs::write(&log, "{\"event\":\"earlier\"}\n").map_err(|err| err.to_string())?;
    let sink = FileAuditSink::new(&log).map_err(|err| err.to_string())?;
    let marshaler = ValidatedMarshaler::<ClusterAuthPreferenceV2>::with_default_registry();
    let loader = ConfigLoader::new(Arc::new(marshaler), LoaderSettings::default())
        .with_audit_sink(Arc::new(sink));
    let _ = loader.load(b"");
    let events = read_lines(&log)?;
    if events.len() != 2 || events[0]["event"] != "earlier" {
        return Err("existing log content was not preserved".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_rejects_unopenable_path() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    if FileAuditSink::new(&dir.path().join("missing").join("audit.jsonl")).is_ok() {
        return Err("expected open failure for missing directory".to_string());
    }
    Ok(())
}

#[test]
fn noop_sink_accepts_events() -> TestResult {
    let marshaler = ValidatedMarshaler::<ClusterAuthPreferenceV2>::with_default_registry();
    let loader = ConfigLoader::new(Arc::new(marshaler), LoaderSettings::default())
        .with_audit_sink(Arc::new(NoopAuditSink));
    if loader.load(b"").is_ok() {
        return Err("empty input should fail".to_string());
    }
    Ok(())
}
