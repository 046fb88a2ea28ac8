//! Handler for `PUT /connections`.
//!
//! Body: `{"item_type": "goal", "item_id": 3, "value_ids": [1, 2]}`. Only the
//! id lists that are present (and that the kind actually has) are replaced;
//! name and description are left untouched.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use tiers_core::{
  entity::{Connections, Entity},
  kind::EntityKind,
  store::HierarchyStore,
};

use crate::error::{ApiError, ApiJson, store_err};

#[derive(Debug, Deserialize)]
pub struct ConnectionsBody {
  pub item_type:   Option<String>,
  pub item_id:     Option<i64>,
  #[serde(flatten)]
  pub connections: Connections,
}

/// `PUT /connections`: returns the updated [`Entity`].
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  ApiJson(body): ApiJson<ConnectionsBody>,
) -> Result<Json<Entity>, ApiError>
where
  S: HierarchyStore,
{
  let (Some(item_type), Some(id)) = (body.item_type, body.item_id) else {
    return Err(ApiError::BadRequest(
      "item_type and item_id are required".to_owned(),
    ));
  };
  let kind = EntityKind::parse(&item_type)?;
  for other in body.connections.foreign_to(kind) {
    tracing::debug!(%kind, ignored = %other, "ignoring connection list the kind does not have");
  }

  let entity = store
    .set_connections(kind, id, body.connections)
    .await
    .map_err(store_err)?;
  tracing::info!(%kind, id, "connections replaced");
  Ok(Json(entity))
}
