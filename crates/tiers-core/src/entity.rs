//! Entities, their one-hop connections, and write inputs.
//!
//! Association rows are the only record of a connection. An [`Entity`] read
//! from a store carries a snapshot of its direct neighbours taken in the same
//! transaction as the entity row itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use crate::{Error, Result, kind::EntityKind};

/// Longest accepted name, in characters.
pub const NAME_MAX_CHARS: usize = 100;

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Trim `raw` and reject it if nothing is left or it is too long.
pub fn normalize_name(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::NameRequired);
  }
  if trimmed.chars().count() > NAME_MAX_CHARS {
    return Err(Error::NameTooLong { max: NAME_MAX_CHARS });
  }
  Ok(trimmed.to_owned())
}

/// Trim `raw`; blank descriptions are stored as absent.
pub fn normalize_description(raw: Option<&str>) -> Option<String> {
  raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

// ─── Connection summaries ────────────────────────────────────────────────────

/// A direct neighbour of an entity: `{id, name}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
  #[serde(skip)]
  pub kind: EntityKind,
  pub id:   i64,
  pub name: String,
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A Value, Goal or Metric together with its one-hop connections.
///
/// Serialises to the entity dict consumed by the browser client:
///
/// ```json
/// { "id": 3, "name": "Ship v2", "description": null, "type": "goal",
///   "created_at": "...", "updated_at": "...",
///   "value_ids": [1], "values": [{"id": 1, "name": "Craft"}],
///   "metric_ids": [], "metrics": [] }
/// ```
#[derive(Debug, Clone)]
pub struct Entity {
  pub id:          i64,
  pub kind:        EntityKind,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  /// Direct neighbours across every relation of `kind`, ordered by
  /// neighbour kind then id.
  pub connections: Vec<Connection>,
}

impl Entity {
  /// Neighbours of the given kind, in id order.
  pub fn connected(&self, kind: EntityKind) -> impl Iterator<Item = &Connection> {
    self.connections.iter().filter(move |c| c.kind == kind)
  }

  /// Ids of neighbours of the given kind, in id order.
  pub fn connected_ids(&self, kind: EntityKind) -> Vec<i64> {
    self.connected(kind).map(|c| c.id).collect()
  }
}

impl Serialize for Entity {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let neighbours = self.kind.neighbours();
    let mut map = serializer.serialize_map(Some(6 + 2 * neighbours.len()))?;
    map.serialize_entry("id", &self.id)?;
    map.serialize_entry("name", &self.name)?;
    map.serialize_entry("description", &self.description)?;
    map.serialize_entry("type", &self.kind)?;
    map.serialize_entry("created_at", &self.created_at)?;
    map.serialize_entry("updated_at", &self.updated_at)?;
    for &other in neighbours {
      let links: Vec<&Connection> = self.connected(other).collect();
      let ids: Vec<i64> = links.iter().map(|c| c.id).collect();
      map.serialize_entry(&format!("{other}_ids"), &ids)?;
      map.serialize_entry(&format!("{other}s"), &links)?;
    }
    map.end()
  }
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

/// Every entity in the store, grouped by tier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Hierarchy {
  pub values:  Vec<Entity>,
  pub goals:   Vec<Entity>,
  pub metrics: Vec<Entity>,
}

impl Hierarchy {
  pub fn of(&self, kind: EntityKind) -> &[Entity] {
    match kind {
      EntityKind::Value => &self.values,
      EntityKind::Goal => &self.goals,
      EntityKind::Metric => &self.metrics,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty() && self.goals.is_empty() && self.metrics.is_empty()
  }
}

// ─── Connection sets ─────────────────────────────────────────────────────────

/// Requested connection sets, keyed by the kind on the far side.
///
/// For [`crate::store::HierarchyStore::set_connections`], `None` means "leave
/// this relation alone" and `Some(vec![])` clears it. An update replaces every
/// relation, so there `None` clears it as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value_ids:  Option<Vec<i64>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub goal_ids:   Option<Vec<i64>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metric_ids: Option<Vec<i64>>,
}

impl Connections {
  pub fn get(&self, kind: EntityKind) -> Option<&[i64]> {
    match kind {
      EntityKind::Value => self.value_ids.as_deref(),
      EntityKind::Goal => self.goal_ids.as_deref(),
      EntityKind::Metric => self.metric_ids.as_deref(),
    }
  }

  pub fn set(&mut self, kind: EntityKind, ids: Vec<i64>) {
    let slot = match kind {
      EntityKind::Value => &mut self.value_ids,
      EntityKind::Goal => &mut self.goal_ids,
      EntityKind::Metric => &mut self.metric_ids,
    };
    *slot = Some(ids);
  }

  /// Builder form of [`Connections::set`].
  pub fn with(mut self, kind: EntityKind, ids: impl Into<Vec<i64>>) -> Self {
    self.set(kind, ids.into());
    self
  }

  /// Fields present in `other` replace the ones in `self`.
  pub fn overlay(mut self, other: Connections) -> Self {
    for kind in EntityKind::ALL {
      if let Some(ids) = other.get(kind) {
        self.set(kind, ids.to_vec());
      }
    }
    self
  }

  /// The relations `owner` actually has and that are present here, each with
  /// sorted, de-duplicated ids. Lists for relations `owner` does not
  /// participate in are dropped.
  pub fn relevant_to(&self, owner: EntityKind) -> Vec<(EntityKind, Vec<i64>)> {
    owner
      .neighbours()
      .iter()
      .filter_map(|&other| self.get(other).map(|ids| (other, sorted_unique(ids))))
      .collect()
  }

  /// Every relation `owner` has; an absent list reads as empty.
  pub fn complete_for(&self, owner: EntityKind) -> Vec<(EntityKind, Vec<i64>)> {
    owner
      .neighbours()
      .iter()
      .map(|&other| (other, sorted_unique(self.get(other).unwrap_or_default())))
      .collect()
  }

  /// Lists present here for relations `owner` does not have.
  pub fn foreign_to(&self, owner: EntityKind) -> impl Iterator<Item = EntityKind> + '_ {
    EntityKind::ALL
      .into_iter()
      .filter(move |&other| !owner.connects_to(other) && self.get(other).is_some())
  }
}

fn sorted_unique(ids: &[i64]) -> Vec<i64> {
  let mut ids = ids.to_vec();
  ids.sort_unstable();
  ids.dedup();
  ids
}

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input to [`crate::store::HierarchyStore::create`].
#[derive(Debug, Clone)]
pub struct NewEntity {
  pub kind:        EntityKind,
  pub name:        String,
  pub description: Option<String>,
  /// Initial connections; ids that do not exist are dropped by the store.
  pub connections: Connections,
}

impl NewEntity {
  /// Convenience constructor with no description and no connections.
  pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
    Self {
      kind,
      name: name.into(),
      description: None,
      connections: Connections::default(),
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_connections(mut self, kind: EntityKind, ids: impl Into<Vec<i64>>) -> Self {
    self.connections.set(kind, ids.into());
    self
  }

  /// Validate and trim the scalar fields.
  pub fn normalize(self) -> Result<Self> {
    Ok(Self {
      name: normalize_name(&self.name)?,
      description: normalize_description(self.description.as_deref()),
      ..self
    })
  }
}

/// Input to [`crate::store::HierarchyStore::update`]: a full replacement of
/// the scalar fields and of every connection set of the kind.
#[derive(Debug, Clone)]
pub struct EntityUpdate {
  pub name:        String,
  pub description: Option<String>,
  pub connections: Connections,
}

impl EntityUpdate {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      description: None,
      connections: Connections::default(),
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn with_connections(mut self, kind: EntityKind, ids: impl Into<Vec<i64>>) -> Self {
    self.connections.set(kind, ids.into());
    self
  }

  pub fn normalize(self) -> Result<Self> {
    Ok(Self {
      name: normalize_name(&self.name)?,
      description: normalize_description(self.description.as_deref()),
      ..self
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn goal() -> Entity {
    let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    Entity {
      id:          7,
      kind:        EntityKind::Goal,
      name:        "Run a marathon".into(),
      description: None,
      created_at:  at,
      updated_at:  at,
      connections: vec![
        Connection { kind: EntityKind::Value, id: 1, name: "Health".into() },
        Connection { kind: EntityKind::Metric, id: 4, name: "Weekly km".into() },
        Connection { kind: EntityKind::Metric, id: 9, name: "Long run".into() },
      ],
    }
  }

  #[test]
  fn name_is_trimmed() {
    assert_eq!(normalize_name("  Health \n").unwrap(), "Health");
  }

  #[test]
  fn blank_name_is_rejected() {
    assert!(matches!(normalize_name(""), Err(Error::NameRequired)));
    assert!(matches!(normalize_name("   "), Err(Error::NameRequired)));
  }

  #[test]
  fn overlong_name_is_rejected() {
    let long = "x".repeat(NAME_MAX_CHARS + 1);
    assert!(matches!(normalize_name(&long), Err(Error::NameTooLong { .. })));
    assert!(normalize_name(&"x".repeat(NAME_MAX_CHARS)).is_ok());
  }

  #[test]
  fn blank_description_becomes_none() {
    assert_eq!(normalize_description(Some("  ")), None);
    assert_eq!(normalize_description(None), None);
    assert_eq!(normalize_description(Some(" why ")).as_deref(), Some("why"));
  }

  #[test]
  fn goal_serialises_both_relations() {
    let v = serde_json::to_value(goal()).unwrap();
    assert_eq!(v["type"], "goal");
    assert_eq!(v["description"], serde_json::Value::Null);
    assert_eq!(v["value_ids"], json!([1]));
    assert_eq!(v["metric_ids"], json!([4, 9]));
    assert_eq!(v["values"], json!([{ "id": 1, "name": "Health" }]));
    assert!(v.get("goal_ids").is_none());
  }

  #[test]
  fn metric_serialises_only_goals() {
    let mut metric = goal();
    metric.kind = EntityKind::Metric;
    metric.connections = vec![Connection {
      kind: EntityKind::Goal,
      id:   2,
      name: "Run a marathon".into(),
    }];
    let v = serde_json::to_value(metric).unwrap();
    assert_eq!(v["goal_ids"], json!([2]));
    assert!(v.get("value_ids").is_none());
    assert!(v.get("metric_ids").is_none());
  }

  #[test]
  fn relevant_to_drops_foreign_relations_and_dedups() {
    let c = Connections::default()
      .with(EntityKind::Value, vec![3, 1, 3])
      .with(EntityKind::Metric, vec![8]);
    assert!(c.relevant_to(EntityKind::Metric).is_empty());
    assert_eq!(
      c.relevant_to(EntityKind::Goal),
      vec![(EntityKind::Value, vec![1, 3]), (EntityKind::Metric, vec![8])]
    );
  }

  #[test]
  fn complete_for_fills_absent_relations_with_empty() {
    let c = Connections::default().with(EntityKind::Metric, vec![4, 2, 4]);
    assert_eq!(
      c.complete_for(EntityKind::Goal),
      vec![(EntityKind::Value, vec![]), (EntityKind::Metric, vec![2, 4])]
    );
    assert_eq!(c.complete_for(EntityKind::Value), vec![(EntityKind::Goal, vec![])]);
  }

  #[test]
  fn foreign_lists_are_reported() {
    let c = Connections::default()
      .with(EntityKind::Value, vec![1])
      .with(EntityKind::Goal, vec![2]);
    assert_eq!(c.foreign_to(EntityKind::Metric).collect::<Vec<_>>(), vec![EntityKind::Value]);
    assert_eq!(c.foreign_to(EntityKind::Goal).collect::<Vec<_>>(), vec![EntityKind::Goal]);
  }

  #[test]
  fn overlay_prefers_present_fields() {
    let base = Connections::default()
      .with(EntityKind::Value, vec![1])
      .with(EntityKind::Metric, vec![2]);
    let merged = base.overlay(Connections::default().with(EntityKind::Value, vec![5]));
    assert_eq!(merged.get(EntityKind::Value), Some(&[5][..]));
    assert_eq!(merged.get(EntityKind::Metric), Some(&[2][..]));
  }
}
