//! Error types for `whohas-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// A required field was absent or blank.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  /// A timestamp whose year does not fit in four digits.
  #[error("{0} is outside years 0000-9999")]
  DateOutOfRange(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
