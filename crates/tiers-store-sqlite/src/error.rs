//! Error type for `tiers-store-sqlite`.

use thiserror::Error;
use tiers_core::kind::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tiers_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("{kind} {id} not found")]
  NotFound { kind: EntityKind, id: i64 },
}

impl From<Error> for tiers_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::NotFound { kind, id } => tiers_core::Error::NotFound { kind, id },
      other => tiers_core::Error::Backend(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
