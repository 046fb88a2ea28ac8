//! Handler for `POST /reset`.

use std::sync::Arc;

use axum::{Json, extract::State};
use tiers_core::store::HierarchyStore;

use crate::{
  MessageBody,
  error::{ApiError, store_err},
};

/// `POST /reset`: deletes every Metric, Goal and Value in one transaction.
pub async fn handler<S>(State(store): State<Arc<S>>) -> Result<Json<MessageBody>, ApiError>
where
  S: HierarchyStore,
{
  store.reset().await.map_err(store_err)?;
  tracing::warn!("all data reset");
  Ok(Json(MessageBody::new("All data reset successfully")))
}
