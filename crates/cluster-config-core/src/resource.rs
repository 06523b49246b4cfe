// crates/cluster-config-core/src/resource.rs
// ============================================================================
// Module: Resource Interfaces
// Description: Versioned resource trait and semantic check strategies.
// Purpose: Decouple shape validation from per-kind business rules.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Resource`] is a versioned configuration object with a fixed
//! kind/version pair. Structural validation is performed by a schema before
//! a resource is constructed; semantic validation runs through a
//! [`SemanticCheck`] strategy supplied per resource kind. The default
//! strategy, [`AcceptAll`], accepts everything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::metadata::Metadata;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Semantic check failure.
///
/// # Invariants
/// - Messages name the offending field using its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Field combination rejected by a semantic rule.
    #[error("{0}")]
    Invalid(String),
}

/// Resource construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The resource failed its semantic check and was not constructed.
    #[error("semantic check failed: {0}")]
    SemanticInvalid(#[from] CheckError),
}

// ============================================================================
// SECTION: Resource Trait
// ============================================================================

/// Versioned configuration resource.
///
/// Implementations are plain owned data, so a constructed resource can be
/// shared across threads without locking.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind tag emitted on the wire.
    const KIND: &'static str;
    /// Version tag emitted on the wire.
    const VERSION: &'static str;

    /// Returns the kind tag carried by this instance.
    fn kind(&self) -> &str;

    /// Returns the version tag carried by this instance.
    fn version(&self) -> &str;

    /// Returns the metadata every instance of this kind is assigned.
    fn canonical_metadata() -> Metadata;

    /// Returns the resource metadata.
    fn metadata(&self) -> &Metadata;

    /// Replaces the resource metadata.
    fn set_metadata(&mut self, metadata: Metadata);
}

// ============================================================================
// SECTION: Semantic Checks
// ============================================================================

/// Semantic validation strategy for a resource kind.
pub trait SemanticCheck<R: ?Sized>: Send + Sync {
    /// Checks cross-field rules that a structural schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the resource violates a rule.
    fn check(&self, resource: &R) -> Result<(), CheckError>;
}

/// Check strategy that accepts every resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<R: ?Sized> SemanticCheck<R> for AcceptAll {
    fn check(&self, _resource: &R) -> Result<(), CheckError> {
        Ok(())
    }
}

/// Adapter turning a function or closure into a [`SemanticCheck`].
#[derive(Debug, Clone, Copy)]
pub struct CheckFn<F>(pub F);

impl<R, F> SemanticCheck<R> for CheckFn<F>
where
    R: ?Sized,
    F: Fn(&R) -> Result<(), CheckError> + Send + Sync,
{
    fn check(&self, resource: &R) -> Result<(), CheckError> {
        (self.0)(resource)
    }
}
