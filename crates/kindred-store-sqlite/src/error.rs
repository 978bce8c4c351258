//! Error type for `kindred-store-sqlite`.

use kindred_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] kindred_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE, CHECK or foreign-key constraint rejected the write.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unrecognised {column} value: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match e {
      rusqlite::Error::SqliteFailure(failure, msg)
        if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::Constraint(msg.unwrap_or_else(|| failure.to_string()))
      }
      other => Self::Database(tokio_rusqlite::Error::Rusqlite(other)),
    }
  }
}

/// Errors raised inside a `call` closure come back boxed in
/// [`tokio_rusqlite::Error::Other`]; unwrap them here.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(boxed) => match boxed.downcast::<Error>() {
        Ok(inner) => *inner,
        Err(boxed) => Self::Database(tokio_rusqlite::Error::Other(boxed)),
      },
      tokio_rusqlite::Error::Rusqlite(e) => e.into(),
      other => Self::Database(other),
    }
  }
}

impl From<Error> for tokio_rusqlite::Error {
  fn from(e: Error) -> Self { Self::Other(Box::new(e)) }
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Core(e) => e.class(),
      Self::Constraint(_) => ErrorClass::Conflict,
      _ => ErrorClass::Transaction,
    }
  }
}
