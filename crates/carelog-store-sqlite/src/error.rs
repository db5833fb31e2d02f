//! Error type for `carelog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carelog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type accepts.
  #[error("cannot decode column {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  /// The row written a moment ago could not be read back.
  #[error("alert row vanished after write: {0}")]
  MissingRow(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
