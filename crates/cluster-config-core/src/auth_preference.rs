// crates/cluster-config-core/src/auth_preference.rs
// ============================================================================
// Module: Cluster Authentication Preference
// Description: Canonical v2 model for the cluster authentication preference.
// Purpose: Typed accessors plus the semantic rules for the singleton resource.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The cluster authentication preference selects the primary authentication
//! mechanism and an optional second factor, and references connector
//! configuration stored elsewhere by name. There is exactly one instance per
//! cluster, named [`META_NAME_CLUSTER_AUTH_PREFERENCE`].
//!
//! Setters only assign. Rules are enforced at commit points: construction
//! through [`ClusterAuthPreferenceV2::new`] or an explicit
//! [`ClusterAuthPreferenceV2::check`] after unmarshaling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::KIND_CLUSTER_AUTH_PREFERENCE;
use crate::identifiers::META_NAME_CLUSTER_AUTH_PREFERENCE;
use crate::identifiers::V2;
use crate::metadata::Metadata;
use crate::resource::CheckError;
use crate::resource::Resource;
use crate::resource::ResourceError;
use crate::resource::SemanticCheck;

// ============================================================================
// SECTION: Recognized Values
// ============================================================================

/// Supported primary authentication mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// Local users with passwords.
    Local,
    /// OpenID Connect identity provider.
    Oidc,
    /// SAML identity provider.
    Saml,
    /// GitHub OAuth.
    Github,
    /// LDAP directory.
    Ldap,
}

impl AuthType {
    /// Returns the wire label for the mechanism.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Oidc => "oidc",
            Self::Saml => "saml",
            Self::Github => "github",
            Self::Ldap => "ldap",
        }
    }

    /// Parses a normalized wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Self::Local),
            "oidc" => Some(Self::Oidc),
            "saml" => Some(Self::Saml),
            "github" => Some(Self::Github),
            "ldap" => Some(Self::Ldap),
            _ => None,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported second factor modes. An empty wire value means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecondFactor {
    /// Second factor disabled.
    Off,
    /// Time-based one-time passwords.
    Otp,
    /// Universal second factor hardware tokens.
    U2f,
}

impl SecondFactor {
    /// Returns the wire label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Otp => "otp",
            Self::U2f => "u2f",
        }
    }

    /// Parses a normalized wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(Self::Off),
            "otp" => Some(Self::Otp),
            "u2f" => Some(Self::U2f),
            _ => None,
        }
    }
}

impl fmt::Display for SecondFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Spec of the v2 cluster authentication preference.
///
/// # Invariants
/// - Empty optional fields are omitted on the wire.
/// - `type` is always emitted, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAuthPreferenceSpecV2 {
    /// Primary authentication mechanism.
    #[serde(rename = "type", default)]
    pub auth_type: String,
    /// Second factor mode.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub second_factor: String,
    /// Name of the OIDC connector configuration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oidc: String,
    /// Name of the U2F configuration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub u2f: String,
    /// Name of the LDAP connector configuration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ldap: String,
}

impl ClusterAuthPreferenceSpecV2 {
    /// Creates a spec with only the primary mechanism set.
    #[must_use]
    pub fn with_type(auth_type: impl Into<String>) -> Self {
        Self {
            auth_type: auth_type.into(),
            ..Self::default()
        }
    }

    /// Trims every field and lowercases the enumerated ones.
    pub fn normalize(&mut self) {
        self.auth_type = normalize_token(&self.auth_type);
        self.second_factor = normalize_token(&self.second_factor);
        self.oidc = self.oidc.trim().to_string();
        self.u2f = self.u2f.trim().to_string();
        self.ldap = self.ldap.trim().to_string();
    }
}

/// Cluster authentication preference, version 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAuthPreferenceV2 {
    /// Resource kind tag.
    pub kind: String,
    /// Resource version tag.
    pub version: String,
    /// Resource metadata.
    #[serde(default = "singleton_metadata")]
    pub metadata: Metadata,
    /// Resource spec.
    pub spec: ClusterAuthPreferenceSpecV2,
}

impl ClusterAuthPreferenceV2 {
    /// Builds the singleton resource from a spec and checks it.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SemanticInvalid`] when [`AuthPreferenceRules`]
    /// reject the normalized spec.
    pub fn new(spec: ClusterAuthPreferenceSpecV2) -> Result<Self, ResourceError> {
        Self::new_with_check(spec, &AuthPreferenceRules)
    }

    /// Builds the singleton resource and checks it with a caller strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::SemanticInvalid`] when `check` rejects the
    /// normalized resource.
    pub fn new_with_check(
        mut spec: ClusterAuthPreferenceSpecV2,
        check: &dyn SemanticCheck<Self>,
    ) -> Result<Self, ResourceError> {
        spec.normalize();
        let resource = Self {
            kind: KIND_CLUSTER_AUTH_PREFERENCE.to_string(),
            version: V2.to_string(),
            metadata: singleton_metadata(),
            spec,
        };
        check.check(&resource)?;
        Ok(resource)
    }

    /// Applies the built-in semantic rules.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] describing the first violated rule.
    pub fn check(&self) -> Result<(), CheckError> {
        AuthPreferenceRules.check(self)
    }

    /// Normalizes the spec in place.
    pub fn normalize(&mut self) {
        self.spec.normalize();
    }

    /// Returns the primary authentication mechanism.
    #[must_use]
    pub fn auth_type(&self) -> &str {
        &self.spec.auth_type
    }

    /// Sets the primary authentication mechanism.
    pub fn set_auth_type(&mut self, value: impl Into<String>) {
        self.spec.auth_type = value.into();
    }

    /// Returns the second factor mode.
    #[must_use]
    pub fn second_factor(&self) -> &str {
        &self.spec.second_factor
    }

    /// Sets the second factor mode.
    pub fn set_second_factor(&mut self, value: impl Into<String>) {
        self.spec.second_factor = value.into();
    }

    /// Returns the OIDC connector reference.
    #[must_use]
    pub fn oidc(&self) -> &str {
        &self.spec.oidc
    }

    /// Sets the OIDC connector reference.
    pub fn set_oidc(&mut self, value: impl Into<String>) {
        self.spec.oidc = value.into();
    }

    /// Returns the U2F configuration reference.
    #[must_use]
    pub fn u2f(&self) -> &str {
        &self.spec.u2f
    }

    /// Sets the U2F configuration reference.
    pub fn set_u2f(&mut self, value: impl Into<String>) {
        self.spec.u2f = value.into();
    }

    /// Returns the LDAP connector reference.
    #[must_use]
    pub fn ldap(&self) -> &str {
        &self.spec.ldap
    }

    /// Sets the LDAP connector reference.
    pub fn set_ldap(&mut self, value: impl Into<String>) {
        self.spec.ldap = value.into();
    }
}

impl Resource for ClusterAuthPreferenceV2 {
    const KIND: &'static str = KIND_CLUSTER_AUTH_PREFERENCE;
    const VERSION: &'static str = V2;

    fn kind(&self) -> &str {
        &self.kind
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn canonical_metadata() -> Metadata {
        singleton_metadata()
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
}

// ============================================================================
// SECTION: Semantic Rules
// ============================================================================

/// Built-in semantic rules for the cluster authentication preference.
///
/// Comparisons use normalized values, so a resource that was unmarshaled but
/// not yet normalized is judged the same as its normalized form.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPreferenceRules;

impl SemanticCheck<ClusterAuthPreferenceV2> for AuthPreferenceRules {
    fn check(&self, resource: &ClusterAuthPreferenceV2) -> Result<(), CheckError> {
        if resource.kind != KIND_CLUSTER_AUTH_PREFERENCE {
            return Err(CheckError::Invalid(format!(
                "kind '{}' is not {KIND_CLUSTER_AUTH_PREFERENCE}",
                resource.kind
            )));
        }
        if resource.version != V2 {
            return Err(CheckError::Invalid(format!(
                "version '{}' is not supported for {KIND_CLUSTER_AUTH_PREFERENCE}",
                resource.version
            )));
        }
        if resource.metadata.name.trim().is_empty() {
            return Err(CheckError::Invalid("metadata.name must be non-empty".to_string()));
        }

        let spec = &resource.spec;
        let auth_label = normalize_token(&spec.auth_type);
        if auth_label.is_empty() {
            return Err(CheckError::Invalid("spec.type must be non-empty".to_string()));
        }
        let auth_type = AuthType::parse(&auth_label).ok_or_else(|| {
            CheckError::Invalid(format!(
                "spec.type '{auth_label}' is not a supported authentication type"
            ))
        })?;

        let factor_label = normalize_token(&spec.second_factor);
        let second_factor = if factor_label.is_empty() {
            None
        } else {
            Some(SecondFactor::parse(&factor_label).ok_or_else(|| {
                CheckError::Invalid(format!(
                    "spec.second_factor '{factor_label}' is not a supported second factor"
                ))
            })?)
        };

        match auth_type {
            AuthType::Oidc if spec.oidc.trim().is_empty() => {
                return Err(CheckError::Invalid(
                    "spec.oidc is required when spec.type is oidc".to_string(),
                ));
            }
            AuthType::Ldap if spec.ldap.trim().is_empty() => {
                return Err(CheckError::Invalid(
                    "spec.ldap is required when spec.type is ldap".to_string(),
                ));
            }
            _ => {}
        }
        if second_factor == Some(SecondFactor::U2f) && spec.u2f.trim().is_empty() {
            return Err(CheckError::Invalid(
                "spec.u2f is required when spec.second_factor is u2f".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Metadata of the singleton auth preference resource.
fn singleton_metadata() -> Metadata {
    Metadata::new(META_NAME_CLUSTER_AUTH_PREFERENCE)
}

/// Trims and lowercases an enumerated wire value.
fn normalize_token(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
