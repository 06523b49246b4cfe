//! Loader settings tests for cluster-config.
// crates/cluster-config/tests/settings.rs
// =============================================================================
// Module: Loader Settings Tests
// Description: TOML parsing, defaults, limits, and audit sink selection.
// Purpose: Ensure settings fail closed on malformed or unsafe input.
// =============================================================================

use std::fs;

use cluster_config::LoaderSettings;
use cluster_config::SettingsError;
use cluster_config::settings::AuditSinkKind;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn expect_invalid(result: Result<LoaderSettings, SettingsError>, needle: &str) -> TestResult {
    match result {
        Err(SettingsError::Invalid(message)) if message.contains(needle) => Ok(()),
        Err(other) => Err(format!("expected invalid settings mentioning '{needle}', got {other}")),
        Ok(_) => Err("expected invalid settings".to_string()),
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn empty_document_uses_defaults() -> TestResult {
    let settings = LoaderSettings::from_toml_str("").map_err(|err| err.to_string())?;
    if settings != LoaderSettings::default() {
        return Err("empty settings should equal defaults".to_string());
    }
    if settings.limits.max_document_bytes != 1024 * 1024
        || !settings.legacy.enabled
        || settings.legacy.max_encoded_bytes != 1024 * 1024
        || settings.audit.sink != AuditSinkKind::Stderr
    {
        return Err("unexpected default values".to_string());
    }
    Ok(())
}

#[test]
fn full_document_parses() -> TestResult {
    let settings = LoaderSettings::from_toml_str(
        r#"
[limits]
max_document_bytes = 4096

[legacy]
enabled = false
max_encoded_bytes = 2048

[audit]
sink = "file"
path = "audit.jsonl"
"#,
    )
    .map_err(|err| err.to_string())?;
    if settings.limits.max_document_bytes != 4096
        || settings.legacy.enabled
        || settings.legacy.max_encoded_bytes != 2048
        || settings.audit.sink != AuditSinkKind::File
        || settings.audit.path.as_deref() != Some("audit.jsonl")
    {
        return Err("settings values not applied".to_string());
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    match LoaderSettings::from_toml_str("[limits]\nmax_bytes = 10\n") {
        Err(SettingsError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn unknown_sink_is_rejected() -> TestResult {
    match LoaderSettings::from_toml_str("[audit]\nsink = \"syslog\"\n") {
        Err(SettingsError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn zero_limits_are_rejected() -> TestResult {
    expect_invalid(
        LoaderSettings::from_toml_str("[limits]\nmax_document_bytes = 0\n"),
        "limits.max_document_bytes must be greater than zero",
    )?;
    expect_invalid(
        LoaderSettings::from_toml_str("[legacy]\nmax_encoded_bytes = 0\n"),
        "legacy.max_encoded_bytes must be greater than zero",
    )
}

#[test]
fn oversized_limits_are_rejected() -> TestResult {
    expect_invalid(
        LoaderSettings::from_toml_str("[limits]\nmax_document_bytes = 16777217\n"),
        "exceeds maximum",
    )
}

#[test]
fn file_sink_requires_path() -> TestResult {
    expect_invalid(
        LoaderSettings::from_toml_str("[audit]\nsink = \"file\"\n"),
        "audit.path is required",
    )?;
    expect_invalid(
        LoaderSettings::from_toml_str("[audit]\nsink = \"file\"\npath = \"  \"\n"),
        "audit.path must be non-empty",
    )
}

#[test]
fn path_without_file_sink_is_rejected() -> TestResult {
    expect_invalid(
        LoaderSettings::from_toml_str("[audit]\nsink = \"none\"\npath = \"audit.jsonl\"\n"),
        "only valid for file sink",
    )
}

// ============================================================================
// SECTION: Files
// ============================================================================

#[test]
fn load_reads_settings_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("loader.toml");
    fs::write(&path, "[legacy]\nenabled = false\n").map_err(|err| err.to_string())?;
    let settings = LoaderSettings::load(&path).map_err(|err| err.to_string())?;
    if settings.legacy.enabled {
        return Err("file settings not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    match LoaderSettings::load(&dir.path().join("missing.toml")) {
        Err(SettingsError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("large.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    expect_invalid(LoaderSettings::load(&path), "exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    expect_invalid(LoaderSettings::load(&path), "must be utf-8")
}

#[test]
fn load_rejects_long_path_component() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("a".repeat(300));
    expect_invalid(LoaderSettings::load(&path), "component too long")
}

#[test]
fn audit_sink_opens_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let log = dir.path().join("audit.jsonl");
    let settings = LoaderSettings::from_toml_str(&format!(
        "[audit]\nsink = \"file\"\npath = \"{}\"\n",
        log.display()
    ))
    .map_err(|err| err.to_string())?;
    settings.audit_sink().map_err(|err| err.to_string())?;
    if !log.exists() {
        return Err("file sink did not create the log".to_string());
    }
    Ok(())
}
