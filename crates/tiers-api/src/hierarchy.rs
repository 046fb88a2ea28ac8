//! Handler for `GET /hierarchy`.

use std::sync::Arc;

use axum::{Json, extract::State};
use tiers_core::{entity::Hierarchy, store::HierarchyStore};

use crate::error::{ApiError, store_err};

/// `GET /hierarchy`: `{values: [...], goals: [...], metrics: [...]}`.
pub async fn handler<S>(State(store): State<Arc<S>>) -> Result<Json<Hierarchy>, ApiError>
where
  S: HierarchyStore,
{
  let hierarchy = store.hierarchy().await.map_err(store_err)?;
  tracing::debug!(
    values = hierarchy.values.len(),
    goals = hierarchy.goals.len(),
    metrics = hierarchy.metrics.len(),
    "served hierarchy"
  );
  Ok(Json(hierarchy))
}
