//! Handlers for per-entity endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/{type}` | Body: [`CreateBody`]; returns 201 + entity dict |
//! | `GET`    | `/{type}/{id}` | 404 if not found |
//! | `PUT`    | `/{type}/{id}` | Body: [`UpdateBody`]; full replace of name, description and connections |
//! | `DELETE` | `/{type}/{id}` | Returns `{"message": ...}` |
//!
//! `{type}` is one of `value`, `goal`, `metric`; anything else is a 400.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tiers_core::{
  entity::{Connections, Entity, EntityUpdate, NewEntity},
  kind::EntityKind,
  store::HierarchyStore,
};

use crate::{
  MessageBody,
  error::{ApiError, ApiJson, store_err},
};

fn require_name(name: Option<String>) -> Result<String, ApiError> {
  name.ok_or_else(|| ApiError::BadRequest("name is required".to_owned()))
}

fn note_foreign(kind: EntityKind, connections: &Connections) {
  for other in connections.foreign_to(kind) {
    tracing::debug!(%kind, ignored = %other, "ignoring connection list the kind does not have");
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /{type}`.
///
/// Connection lists are read from `value_ids`, `goal_ids` and `metric_ids`;
/// lists for relations the kind does not have are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  #[serde(flatten)]
  pub connections: Connections,
}

/// `POST /{type}`: returns 201 + the stored [`Entity`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(item_type): Path<String>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HierarchyStore,
{
  let kind = EntityKind::parse(&item_type)?;
  note_foreign(kind, &body.connections);
  let input = NewEntity {
    kind,
    name: require_name(body.name)?,
    description: body.description,
    connections: body.connections,
  };

  let entity = store.create(input).await.map_err(store_err)?;
  tracing::info!(%kind, id = entity.id, name = %entity.name, "created");
  Ok((StatusCode::CREATED, Json(entity)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{type}/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((item_type, id)): Path<(String, i64)>,
) -> Result<Json<Entity>, ApiError>
where
  S: HierarchyStore,
{
  let kind = EntityKind::parse(&item_type)?;
  let entity = store
    .get(kind, id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("{kind} {id} not found")))?;
  Ok(Json(entity))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// The `connections` field of [`UpdateBody`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConnectionsField {
  /// A bare id list. Only accepted for kinds with a single relation.
  Ids(Vec<i64>),
  Keyed(Connections),
}

/// JSON body accepted by `PUT /{type}/{id}`.
///
/// Keyed lists may be given at the top level or inside `connections`; the
/// latter wins when both name the same relation. Every relation of the kind
/// is replaced, and one that is not mentioned at all is cleared.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub connections: Option<ConnectionsField>,
  #[serde(flatten)]
  pub keyed:       Connections,
}

impl UpdateBody {
  fn connections_for(&self, kind: EntityKind) -> Result<Connections, ApiError> {
    let base = self.keyed.clone();
    Ok(match &self.connections {
      Some(ConnectionsField::Ids(ids)) => {
        let Some(other) = kind.sole_neighbour() else {
          return Err(ApiError::BadRequest(format!(
            "a bare connections list is ambiguous for a {kind}; send \
             {{\"value_ids\": [...], \"metric_ids\": [...]}} instead"
          )));
        };
        base.with(other, ids.clone())
      }
      Some(ConnectionsField::Keyed(keyed)) => base.overlay(keyed.clone()),
      None => base,
    })
  }
}

/// `PUT /{type}/{id}`: returns the updated [`Entity`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path((item_type, id)): Path<(String, i64)>,
  ApiJson(body): ApiJson<UpdateBody>,
) -> Result<Json<Entity>, ApiError>
where
  S: HierarchyStore,
{
  let kind = EntityKind::parse(&item_type)?;
  let connections = body.connections_for(kind)?;
  note_foreign(kind, &connections);
  let update = EntityUpdate {
    name: require_name(body.name)?,
    description: body.description,
    connections,
  };

  let entity = store.update(kind, id, update).await.map_err(store_err)?;
  tracing::info!(%kind, id, "updated");
  Ok(Json(entity))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{type}/{id}`: `{"message": "<Kind> deleted successfully"}`.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path((item_type, id)): Path<(String, i64)>,
) -> Result<Json<MessageBody>, ApiError>
where
  S: HierarchyStore,
{
  let kind = EntityKind::parse(&item_type)?;
  store.delete(kind, id).await.map_err(store_err)?;
  tracing::info!(%kind, id, "deleted");
  Ok(Json(MessageBody::new(format!("{} deleted successfully", kind.label()))))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(body: &str) -> UpdateBody { serde_json::from_str(body).unwrap() }

  #[test]
  fn flat_connections_target_the_single_relation() {
    let body = parse(r#"{"name":"M","connections":[1,2]}"#);
    let c = body.connections_for(EntityKind::Metric).unwrap();
    assert_eq!(c.get(EntityKind::Goal), Some(&[1, 2][..]));
    assert_eq!(c.get(EntityKind::Value), None);

    let c = body.connections_for(EntityKind::Value).unwrap();
    assert_eq!(c.get(EntityKind::Goal), Some(&[1, 2][..]));
  }

  #[test]
  fn flat_connections_are_rejected_for_goal() {
    let body = parse(r#"{"name":"G","connections":[1,2]}"#);
    let err = body.connections_for(EntityKind::Goal).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(ref m) if m.contains("ambiguous")));
  }

  #[test]
  fn keyed_connections_override_top_level() {
    let body = parse(
      r#"{"name":"G","metric_ids":[4],"value_ids":[1],"connections":{"value_ids":[9]}}"#,
    );
    let c = body.connections_for(EntityKind::Goal).unwrap();
    assert_eq!(c.get(EntityKind::Value), Some(&[9][..]));
    assert_eq!(c.get(EntityKind::Metric), Some(&[4][..]));
  }

  #[test]
  fn absent_connections_stay_absent() {
    let body = parse(r#"{"name":"G","description":"d"}"#);
    assert_eq!(body.connections_for(EntityKind::Goal).unwrap(), Connections::default());
  }
}
