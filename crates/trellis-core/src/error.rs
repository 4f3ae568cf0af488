//! Error types for the tag hierarchy and contact model

use thiserror::Error;

use crate::contact::ContactId;
use crate::tag::Tag;

/// Errors raised by the in-memory model.
///
/// Only structural violations and input errors are represented here. A broken
/// internal invariant is a bug and is reported through `debug_assert!`, never
/// through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid tag '{value}': {reason}")]
    InvalidTag { value: String, reason: String },

    #[error("Adding '{parent}' -> '{child}' would create a cyclic dependency")]
    CyclicDependency { parent: Tag, child: Tag },

    #[error("Contact not found: {0}")]
    ContactNotFound(ContactId),

    #[error("A contact named '{0}' already exists")]
    DuplicateContact(String),

    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    #[error("No contact ids left to assign")]
    ContactIdsExhausted,

    #[error("Corrupted snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Result type for model operations
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid tag error
    pub fn invalid_tag<V: Into<String>, R: Into<String>>(value: V, reason: R) -> Self {
        Self::InvalidTag {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupted snapshot error
    pub fn corrupt_snapshot<S: Into<String>>(msg: S) -> Self {
        Self::CorruptSnapshot(msg.into())
    }
}
