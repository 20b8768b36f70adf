//! Error type for `whohas-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] whohas_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored value could not be decoded. This points at a bug in whatever
  /// wrote the row, so it is never retried.
  #[error("corrupt record: column {column} holds {value:?}")]
  CorruptRecord { column: &'static str, value: String },

  #[error("database schema version {found} is newer than supported version {latest}")]
  UnsupportedSchema { found: u32, latest: u32 },

  #[error("preferences error: {0}")]
  Preferences(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Failures of the backing storage or of a write's preconditions.
  pub fn is_storage(&self) -> bool {
    matches!(
      self,
      Self::Core(_)
        | Self::Database(_)
        | Self::UnsupportedSchema { .. }
        | Self::Preferences(_)
        | Self::Io(_)
    )
  }

  pub fn is_corrupt_record(&self) -> bool {
    matches!(self, Self::CorruptRecord { .. })
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Self::Database(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
