//! Mapping between domain types and SQLite tables, columns and text values.
//!
//! Timestamps are stored as RFC 3339 strings. Table and column names are
//! `&'static str` so they can be spliced into SQL without quoting concerns.

use chrono::{DateTime, Utc};
use tiers_core::{
  entity::{Connection, Entity},
  kind::EntityKind,
};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tables ──────────────────────────────────────────────────────────────────

pub fn entity_table(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Value => "value_entity",
    EntityKind::Goal => "goal_entity",
    EntityKind::Metric => "metric_entity",
  }
}

/// Name of the foreign-key column that refers to `kind` in a link table.
pub fn id_column(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Value => "value_id",
    EntityKind::Goal => "goal_id",
    EntityKind::Metric => "metric_id",
  }
}

/// Every link table; `reset()` empties these before the entity tables.
pub const LINK_TABLES: [&str; 2] = ["metric_goal_link", "goal_value_link"];

/// An association table seen from one of its two endpoints.
#[derive(Debug, Clone, Copy)]
pub struct LinkSpec {
  pub table:       &'static str,
  /// Column holding the id of the entity we start from.
  pub own_col:     &'static str,
  /// Column holding the id of the neighbour.
  pub other_col:   &'static str,
  /// Entity table of the neighbour.
  pub other_table: &'static str,
}

/// The link table joining `own` to `other`, if the two kinds are related.
pub fn link_spec(own: EntityKind, other: EntityKind) -> Option<LinkSpec> {
  let table = match (own, other) {
    (EntityKind::Goal, EntityKind::Value) | (EntityKind::Value, EntityKind::Goal) => {
      "goal_value_link"
    }
    (EntityKind::Metric, EntityKind::Goal) | (EntityKind::Goal, EntityKind::Metric) => {
      "metric_goal_link"
    }
    _ => return None,
  };
  Some(LinkSpec {
    table,
    own_col: id_column(own),
    other_col: id_column(other),
    other_table: entity_table(other),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Values read directly from an entity row, plus its joined connections.
pub struct RawEntity {
  pub id:          i64,
  pub kind:        EntityKind,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
  pub connections: Vec<Connection>,
}

impl RawEntity {
  /// Build from a row of `SELECT id, name, description, created_at, updated_at`.
  pub fn from_row(kind: EntityKind, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id: row.get(0)?,
      kind,
      name: row.get(1)?,
      description: row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
      connections: Vec::new(),
    })
  }

  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity {
      id:          self.id,
      kind:        self.kind,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      connections: self.connections,
    })
  }
}
