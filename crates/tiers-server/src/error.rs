//! Start-up error type for the server library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store error: {0}")]
  Store(#[from] tiers_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
