//! Error types for `kindred-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("unknown relationship type: {0:?}")]
  UnknownRelationshipType(String),

  #[error("email already in use: {0}")]
  EmailInUse(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  /// Deliberately says nothing about whether `target` exists.
  #[error("no relationship between {requester} and {target}")]
  NotRelated { target: Uuid, requester: Uuid },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The caller-facing error taxonomy. None of these classes are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// Bad input shape or enum value.
  Validation,
  /// Duplicate email or duplicate relationship pair.
  Conflict,
  /// Missing person or relation.
  NotFound,
  /// The underlying store failed; the whole operation was rolled back.
  Transaction,
}

/// Maps an error from any layer onto [`ErrorClass`].
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Validation(_)
      | Self::UnknownRelationshipType(_)
      | Self::Serialization(_) => ErrorClass::Validation,
      Self::EmailInUse(_) | Self::Conflict(_) => ErrorClass::Conflict,
      Self::PersonNotFound(_) | Self::NotRelated { .. } => {
        ErrorClass::NotFound
      }
    }
  }
}
