//! JSON REST API for Tiers.
//!
//! Exposes an axum [`Router`] backed by any [`tiers_core::store::HierarchyStore`].
//! Each request performs one store operation, which the store runs in a
//! single transaction. There is no session state between requests.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tiers_api::api_router(store.clone()))
//! ```

pub mod connections;
pub mod error;
pub mod hierarchy;
pub mod items;
pub mod reset;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Serialize;
use tiers_core::store::HierarchyStore;

pub use error::ApiError;

/// Body of delete and reset responses: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
  pub message: String,
}

impl MessageBody {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: HierarchyStore + 'static,
{
  Router::new()
    .route("/hierarchy", get(hierarchy::handler::<S>))
    .route("/connections", put(connections::handler::<S>))
    .route("/reset", post(reset::handler::<S>))
    // Entities
    .route("/{item_type}", post(items::create::<S>))
    .route(
      "/{item_type}/{id}",
      get(items::get_one::<S>)
        .put(items::update::<S>)
        .delete(items::delete::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
