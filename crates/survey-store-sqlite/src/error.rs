//! Error type for `survey-store-sqlite`.

use rusqlite::ErrorCode;
use survey_core::{StorageErrorKind, StorageFault};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] survey_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl StorageFault for Error {
  fn kind(&self) -> StorageErrorKind {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => classify(e),
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        StorageErrorKind::Unavailable
      }
      _ => StorageErrorKind::Internal,
    }
  }
}

fn classify(e: &rusqlite::Error) -> StorageErrorKind {
  match e.sqlite_error_code() {
    Some(ErrorCode::ConstraintViolation) => StorageErrorKind::ConstraintViolation,
    Some(
      ErrorCode::DatabaseBusy
      | ErrorCode::DatabaseLocked
      | ErrorCode::CannotOpen
      | ErrorCode::SystemIoFailure
      | ErrorCode::DiskFull,
    ) => StorageErrorKind::Unavailable,
    _ => StorageErrorKind::Internal,
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use rusqlite::ffi;

  use super::*;

  fn sqlite_failure(code: std::os::raw::c_int) -> Error {
    Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      ffi::Error::new(code),
      None,
    )))
  }

  #[test]
  fn busy_locked_and_closed_are_unavailable() {
    assert_eq!(sqlite_failure(ffi::SQLITE_BUSY).kind(), StorageErrorKind::Unavailable);
    assert_eq!(sqlite_failure(ffi::SQLITE_LOCKED).kind(), StorageErrorKind::Unavailable);
    assert_eq!(
      Error::Database(tokio_rusqlite::Error::ConnectionClosed).kind(),
      StorageErrorKind::Unavailable
    );
  }

  #[test]
  fn constraint_and_other_failures() {
    assert_eq!(
      sqlite_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY).kind(),
      StorageErrorKind::ConstraintViolation
    );
    assert_eq!(sqlite_failure(ffi::SQLITE_CORRUPT).kind(), StorageErrorKind::Internal);
    assert_eq!(Error::DateParse("x".into()).kind(), StorageErrorKind::Internal);
  }
}
