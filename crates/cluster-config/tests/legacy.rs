//! Legacy authentication section tests for cluster-config.
// crates/cluster-config/tests/legacy.rs
// =============================================================================
// Module: Legacy Section Tests
// Description: Decode, parse, and translation of deprecated auth sections.
// Purpose: Keep older connector and U2F layouts loading with full fidelity.
// =============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cluster_config::LegacyError;
use cluster_config::legacy;
use cluster_config::legacy::FileConfig;

type TestResult = Result<(), String>;

const LEGACY_SECTION: &str = r"
auth_service:
  oidc_connectors:
    - id: google
      redirect_url: https://localhost:3080/v1/webapi/oidc/callback
      client_id: id-from-google.apps.googleusercontent.com
      client_secret: secret-key-from-google
      issuer_url: https://accounts.google.com
  u2f:
    enabled: yes
    app_id: https://graviton:3080
    facets:
      - https://graviton:3080
";

fn encoded(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

fn decode_fixture() -> Result<FileConfig, String> {
    legacy::decode(&encoded(LEGACY_SECTION)).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Decode Fidelity
// ============================================================================

#[test]
fn decode_reads_connector_fields_verbatim() -> TestResult {
    let config = decode_fixture()?;
    let connectors = &config.auth_service.oidc_connectors;
    if connectors.len() != 1 {
        return Err(format!("expected 1 connector, got {}", connectors.len()));
    }
    let connector = &connectors[0];
    let expected = [
        (connector.id.as_str(), "google"),
        (connector.redirect_url.as_str(), "https://localhost:3080/v1/webapi/oidc/callback"),
        (connector.client_id.as_str(), "id-from-google.apps.googleusercontent.com"),
        (connector.client_secret.as_str(), "secret-key-from-google"),
        (connector.issuer_url.as_str(), "https://accounts.google.com"),
    ];
    for (actual, wanted) in expected {
        if actual != wanted {
            return Err(format!("expected '{wanted}', got '{actual}'"));
        }
    }
    Ok(())
}

#[test]
fn decode_keeps_u2f_flag_as_written() -> TestResult {
    let config = decode_fixture()?;
    let u2f = &config.auth_service.u2f;
    if u2f.enabled_flag != "yes" {
        return Err(format!("expected flag 'yes', got '{}'", u2f.enabled_flag));
    }
    if !u2f.enabled() {
        return Err("flag 'yes' should read as enabled".to_string());
    }
    if u2f.app_id != "https://graviton:3080" {
        return Err(format!("unexpected app_id {}", u2f.app_id));
    }
    if u2f.facets != vec!["https://graviton:3080".to_string()] {
        return Err(format!("unexpected facets {}", u2f.facets.join(",")));
    }
    Ok(())
}

#[test]
fn decode_accepts_wrapped_encoding() -> TestResult {
    let text = encoded(LEGACY_SECTION);
    let wrapped: String = text
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    let config = legacy::decode(&format!("  {wrapped}\n")).map_err(|err| err.to_string())?;
    if config != decode_fixture()? {
        return Err("wrapped encoding decoded differently".to_string());
    }
    Ok(())
}

#[test]
fn parse_matches_decode() -> TestResult {
    let parsed = legacy::parse(LEGACY_SECTION).map_err(|err| err.to_string())?;
    if parsed != decode_fixture()? {
        return Err("plain and encoded layouts disagree".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Edge Cases
// ============================================================================

#[test]
fn facets_keep_order_and_duplicates() -> TestResult {
    let text = r"
auth_service:
  u2f:
    enabled: 'no'
    app_id: https://a
    facets: [https://b, https://a, https://b]
";
    let config = legacy::parse(text).map_err(|err| err.to_string())?;
    let facets = &config.auth_service.u2f.facets;
    if facets != &["https://b", "https://a", "https://b"] {
        return Err(format!("unexpected facets {}", facets.join(",")));
    }
    if config.auth_service.u2f.enabled() {
        return Err("flag 'no' should read as disabled".to_string());
    }
    Ok(())
}

#[test]
fn zero_connectors_is_valid() -> TestResult {
    let config = legacy::parse("auth_service:\n  oidc_connectors: []\n")
        .map_err(|err| err.to_string())?;
    if !config.auth_service.oidc_connectors.is_empty() {
        return Err("expected no connectors".to_string());
    }
    Ok(())
}

#[test]
fn boolean_flag_is_rendered_as_text() -> TestResult {
    let config = legacy::parse("auth_service:\n  u2f:\n    enabled: true\n")
        .map_err(|err| err.to_string())?;
    if config.auth_service.u2f.enabled_flag != "true" || !config.auth_service.u2f.enabled() {
        return Err(format!("unexpected flag '{}'", config.auth_service.u2f.enabled_flag));
    }
    Ok(())
}

#[test]
fn unrelated_sections_are_ignored() -> TestResult {
    let config = legacy::parse("teleport:\n  nodename: alpha\nauth_service:\n  u2f: {}\n")
        .map_err(|err| err.to_string())?;
    if config != FileConfig::default() {
        return Err("unrelated sections should not change the parse".to_string());
    }
    Ok(())
}

#[test]
fn flag_spellings() -> TestResult {
    for flag in ["yes", "YES", " true ", "on", "1"] {
        if !legacy::flag_enabled(flag) {
            return Err(format!("'{flag}' should be enabled"));
        }
    }
    for flag in ["", "no", "false", "off", "0", "enabled"] {
        if legacy::flag_enabled(flag) {
            return Err(format!("'{flag}' should be disabled"));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

#[test]
fn malformed_base64_is_decode_error() -> TestResult {
    match legacy::decode("not*base64!") {
        Err(LegacyError::Decode(_)) => Ok(()),
        Err(other) => Err(format!("expected decode error, got {other}")),
        Ok(_) => Err("expected decode error".to_string()),
    }
}

#[test]
fn empty_encoding_is_decode_error() -> TestResult {
    match legacy::decode(" \n ") {
        Err(LegacyError::Decode(_)) => Ok(()),
        Err(other) => Err(format!("expected decode error, got {other}")),
        Ok(_) => Err("expected decode error".to_string()),
    }
}

#[test]
fn non_utf8_payload_is_decode_error() -> TestResult {
    let text = STANDARD.encode([0xff_u8, 0xfe, 0xfd]);
    match legacy::decode(&text) {
        Err(LegacyError::Decode(message)) if message.contains("utf-8") => Ok(()),
        Err(other) => Err(format!("expected utf-8 decode error, got {other}")),
        Ok(_) => Err("expected decode error".to_string()),
    }
}

#[test]
fn wrong_structure_is_parse_error() -> TestResult {
    let text = encoded("auth_service:\n  oidc_connectors: google\n");
    match legacy::decode(&text) {
        Err(err @ LegacyError::Parse(_)) if err.kind_label() == "parse_error" => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn malformed_yaml_is_parse_error() -> TestResult {
    match legacy::parse("auth_service: [unclosed") {
        Err(LegacyError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn missing_auth_service_is_parse_error() -> TestResult {
    for text in ["garbage_key: 1\n", "teleport:\n  nodename: alpha\n", "{}"] {
        match legacy::parse(text) {
            Err(LegacyError::Parse(message)) if message.contains("auth_service") => {}
            Err(other) => return Err(format!("expected parse error for {text}, got {other}")),
            Ok(_) => return Err(format!("'{text}' parsed without auth_service")),
        }
    }
    Ok(())
}

#[test]
fn non_mapping_sections_are_parse_errors() -> TestResult {
    let cases =
        ["auth_service: 5\n", "auth_service:\n", "auth_service: [a]\n", "- auth_service\n"];
    for text in cases {
        match legacy::parse(text) {
            Err(LegacyError::Parse(_)) => {}
            Err(other) => return Err(format!("expected parse error for {text}, got {other}")),
            Ok(_) => return Err(format!("'{text}' should not parse")),
        }
    }
    Ok(())
}

#[test]
fn canonical_keys_are_parse_errors() -> TestResult {
    let mixed = "kind: cluster_auth_preference\nauth_service:\n  u2f: {}\n";
    let canonical = "kind: cluster_auth_preference\nversion: v2\nspec:\n  type: oidc\n";
    for text in [mixed, canonical, "spec: {}\nauth_service: {}\n"] {
        match legacy::decode(&encoded(text)) {
            Err(LegacyError::Parse(message)) if message.contains("canonical") => {}
            Err(other) => return Err(format!("expected parse error, got {other}")),
            Ok(_) => return Err(format!("'{text}' should not parse as legacy")),
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

#[test]
fn translate_fixture() -> TestResult {
    let translation = legacy::translate(&decode_fixture()?);
    let spec = &translation.spec;
    if spec.auth_type != "local" {
        return Err(format!("expected local type, got {}", spec.auth_type));
    }
    if spec.oidc != "google" {
        return Err(format!("expected oidc reference google, got {}", spec.oidc));
    }
    if spec.second_factor != "u2f" || spec.u2f != "https://graviton:3080" {
        return Err(format!("unexpected second factor {}/{}", spec.second_factor, spec.u2f));
    }
    if translation.connectors.len() != 1 || translation.connectors[0].id != "google" {
        return Err("connectors should be carried through".to_string());
    }
    Ok(())
}

#[test]
fn translate_prefers_explicit_authentication_block() -> TestResult {
    let text = r"
auth_service:
  authentication:
    type: oidc
    second_factor: otp
    oidc: corp
  oidc_connectors:
    - id: google
  u2f:
    enabled: yes
    app_id: https://graviton:3080
";
    let translation = legacy::translate(&legacy::parse(text).map_err(|err| err.to_string())?);
    let spec = &translation.spec;
    if spec.auth_type != "oidc" || spec.oidc != "corp" {
        return Err(format!("explicit values overridden: {}/{}", spec.auth_type, spec.oidc));
    }
    if spec.second_factor != "otp" || !spec.u2f.is_empty() {
        return Err(format!("u2f block overrode explicit second factor {}", spec.second_factor));
    }
    Ok(())
}

#[test]
fn translate_disabled_u2f_leaves_second_factor() -> TestResult {
    let text = "auth_service:\n  u2f:\n    enabled: maybe\n    app_id: https://a\n";
    let translation = legacy::translate(&legacy::parse(text).map_err(|err| err.to_string())?);
    if !translation.spec.second_factor.is_empty() || !translation.spec.u2f.is_empty() {
        return Err("unrecognized flag should not enable u2f".to_string());
    }
    Ok(())
}

#[test]
fn authentication_block_rejects_unknown_keys() -> TestResult {
    match legacy::parse("auth_service:\n  authentication:\n    typo: local\n") {
        Err(LegacyError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}
