//! Error types for `tiers-core`.
//!
//! Backends convert their own error types into [`Error`] so that callers (the
//! HTTP layer in particular) can tell a missing row from a broken database.

use thiserror::Error;

use crate::kind::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name is required")]
  NameRequired,

  #[error("name must be at most {max} characters")]
  NameTooLong { max: usize },

  #[error("{kind} {id} not found")]
  NotFound { kind: EntityKind, id: i64 },

  #[error("invalid item type: {0:?}")]
  UnknownKind(String),

  #[error("store error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for errors caused by bad caller input rather than store state.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::NameRequired | Self::NameTooLong { .. } | Self::UnknownKind(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
