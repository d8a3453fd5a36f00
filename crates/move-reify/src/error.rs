// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types shared by every decode, encode and resolution path.

use thiserror::Error;

/// Errors produced by the reification core.
///
/// Every error is raised at the point of detection and returned to the
/// caller; nothing is retried or replaced by a default value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReifyError {
    /// A bare type name has no registry entry.
    #[error("Unknown type {0}")]
    UnknownType(String),

    /// A type name resolved but received the wrong number of type arguments.
    #[error("Type {name} expects {expected} type arguments, but got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A typed-fields node or JSON envelope declares a different type.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The byte buffer is too short or otherwise not a valid encoding.
    #[error("Malformed binary: {0}")]
    MalformedBinary(String),

    /// A field is present but has the wrong shape for its declared type.
    #[error("Malformed value: {0}")]
    MalformedValue(String),

    /// A type tag string could not be parsed.
    #[error("Malformed type tag {tag:?}: {reason}")]
    MalformedTypeTag { tag: String, reason: String },

    /// A struct definition is internally inconsistent.
    #[error("Invalid definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// The object source has no object under the requested identifier.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
}

impl ReifyError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn too_short(need: usize, have: usize) -> Self {
        Self::MalformedBinary(format!("need {} bytes, have {}", need, have))
    }

    pub(crate) fn bad_tag(tag: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTypeTag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_def(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReifyError>;
