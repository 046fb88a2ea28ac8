//! [`SqliteStore`]: the SQLite implementation of [`HierarchyStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use tiers_core::{
  entity::{Connection, Connections, Entity, EntityUpdate, Hierarchy, NewEntity},
  kind::EntityKind,
  store::HierarchyStore,
};

use crate::{
  Error, Result,
  encode::{LINK_TABLES, RawEntity, encode_dt, entity_table, link_spec},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tiers store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Existing data is kept.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────
//
// These take a plain `&rusqlite::Connection` so they work both on the raw
// connection and on a `Transaction` (which derefs to it).

/// Read one entity row and its direct connections.
fn read_entity(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  id: i64,
) -> rusqlite::Result<Option<RawEntity>> {
  let sql = format!(
    "SELECT id, name, description, created_at, updated_at FROM {} WHERE id = ?1",
    entity_table(kind)
  );
  let Some(mut raw) = conn
    .query_row(&sql, rusqlite::params![id], |row| RawEntity::from_row(kind, row))
    .optional()?
  else {
    return Ok(None);
  };

  for &other in kind.neighbours() {
    let Some(spec) = link_spec(kind, other) else { continue };
    let sql = format!(
      "SELECT o.id, o.name
       FROM {link} l
       JOIN {other_table} o ON o.id = l.{other_col}
       WHERE l.{own_col} = ?1
       ORDER BY o.id",
      link = spec.table,
      other_table = spec.other_table,
      other_col = spec.other_col,
      own_col = spec.own_col,
    );
    let mut stmt = conn.prepare(&sql)?;
    let links = stmt
      .query_map(rusqlite::params![id], |row| {
        Ok(Connection { kind: other, id: row.get(0)?, name: row.get(1)? })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    raw.connections.extend(links);
  }

  Ok(Some(raw))
}

/// Read every entity of `kind` in id order, with connections loaded in one
/// query per relation rather than one per entity.
fn read_all(conn: &rusqlite::Connection, kind: EntityKind) -> rusqlite::Result<Vec<RawEntity>> {
  let sql = format!(
    "SELECT id, name, description, created_at, updated_at FROM {} ORDER BY id",
    entity_table(kind)
  );
  let mut stmt = conn.prepare(&sql)?;
  let mut raws = stmt
    .query_map([], |row| RawEntity::from_row(kind, row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut links: HashMap<i64, Vec<Connection>> = HashMap::new();
  for &other in kind.neighbours() {
    let Some(spec) = link_spec(kind, other) else { continue };
    let sql = format!(
      "SELECT l.{own_col}, o.id, o.name
       FROM {link} l
       JOIN {other_table} o ON o.id = l.{other_col}
       ORDER BY l.{own_col}, o.id",
      link = spec.table,
      other_table = spec.other_table,
      other_col = spec.other_col,
      own_col = spec.own_col,
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
      Ok((
        row.get::<_, i64>(0)?,
        Connection { kind: other, id: row.get(1)?, name: row.get(2)? },
      ))
    })?;
    for row in rows {
      let (owner, link) = row?;
      links.entry(owner).or_default().push(link);
    }
  }

  for raw in &mut raws {
    if let Some(found) = links.remove(&raw.id) {
      raw.connections = found;
    }
  }
  Ok(raws)
}

/// Replace the `other`-side connection set of entity `(kind, id)`.
///
/// Ids with no matching row in the neighbour table are skipped, so no
/// association ever points at a missing entity.
fn replace_links(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  id: i64,
  other: EntityKind,
  ids: &[i64],
) -> rusqlite::Result<()> {
  let Some(spec) = link_spec(kind, other) else { return Ok(()) };

  conn.execute(
    &format!("DELETE FROM {} WHERE {} = ?1", spec.table, spec.own_col),
    rusqlite::params![id],
  )?;

  let mut insert = conn.prepare(&format!(
    "INSERT OR IGNORE INTO {link} ({own_col}, {other_col})
     SELECT ?1, id FROM {other_table} WHERE id = ?2",
    link = spec.table,
    own_col = spec.own_col,
    other_col = spec.other_col,
    other_table = spec.other_table,
  ))?;
  for &other_id in ids {
    insert.execute(rusqlite::params![id, other_id])?;
  }
  Ok(())
}

/// Delete every association row that mentions `(kind, id)`.
fn unlink_all(conn: &rusqlite::Connection, kind: EntityKind, id: i64) -> rusqlite::Result<()> {
  for &other in kind.neighbours() {
    if let Some(spec) = link_spec(kind, other) {
      conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?1", spec.table, spec.own_col),
        rusqlite::params![id],
      )?;
    }
  }
  Ok(())
}

// ─── HierarchyStore impl ─────────────────────────────────────────────────────

impl HierarchyStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, input: NewEntity) -> Result<Entity> {
    let input       = input.normalize()?;
    let kind        = input.kind;
    let links       = input.connections.relevant_to(kind);
    let name        = input.name;
    let description = input.description;
    let now_str     = encode_dt(Utc::now());

    let raw: RawEntity = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          &format!(
            "INSERT INTO {} (name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            entity_table(kind)
          ),
          rusqlite::params![name, description, now_str],
        )?;
        let id = tx.last_insert_rowid();

        for (other, ids) in &links {
          replace_links(&tx, kind, id, *other, ids)?;
        }

        let raw = read_entity(&tx, kind, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_entity()
  }

  async fn update(&self, kind: EntityKind, id: i64, update: EntityUpdate) -> Result<Entity> {
    let update      = update.normalize()?;
    let links       = update.connections.complete_for(kind);
    let name        = update.name;
    let description = update.description;
    let now_str     = encode_dt(Utc::now());

    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!(
            "UPDATE {} SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            entity_table(kind)
          ),
          rusqlite::params![name, description, now_str, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        for (other, ids) in &links {
          replace_links(&tx, kind, id, *other, ids)?;
        }

        let raw = read_entity(&tx, kind, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(Error::NotFound { kind, id })?.into_entity()
  }

  async fn set_connections(
    &self,
    kind: EntityKind,
    id: i64,
    connections: Connections,
  ) -> Result<Entity> {
    let links   = connections.relevant_to(kind);
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!("UPDATE {} SET updated_at = ?1 WHERE id = ?2", entity_table(kind)),
          rusqlite::params![now_str, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        for (other, ids) in &links {
          replace_links(&tx, kind, id, *other, ids)?;
        }

        let raw = read_entity(&tx, kind, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(Error::NotFound { kind, id })?.into_entity()
  }

  async fn delete(&self, kind: EntityKind, id: i64) -> Result<()> {
    let deleted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        unlink_all(&tx, kind, id)?;
        let changed = tx.execute(
          &format!("DELETE FROM {} WHERE id = ?1", entity_table(kind)),
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !deleted {
      return Err(Error::NotFound { kind, id });
    }
    Ok(())
  }

  async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        for table in LINK_TABLES {
          tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        // Child tiers before the tiers they reference.
        for kind in [EntityKind::Metric, EntityKind::Goal, EntityKind::Value] {
          tx.execute(&format!("DELETE FROM {}", entity_table(kind)), [])?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Entity>> {
    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| Ok(read_entity(conn, kind, id)?))
      .await?;

    raw.map(RawEntity::into_entity).transpose()
  }

  async fn list(&self, kind: EntityKind) -> Result<Vec<Entity>> {
    let raws: Vec<RawEntity> = self
      .conn
      .call(move |conn| Ok(read_all(conn, kind)?))
      .await?;

    raws.into_iter().map(RawEntity::into_entity).collect()
  }

  async fn hierarchy(&self) -> Result<Hierarchy> {
    let (values, goals, metrics) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let values  = read_all(&tx, EntityKind::Value)?;
        let goals   = read_all(&tx, EntityKind::Goal)?;
        let metrics = read_all(&tx, EntityKind::Metric)?;
        tx.commit()?;
        Ok((values, goals, metrics))
      })
      .await?;

    let decode = |raws: Vec<RawEntity>| -> Result<Vec<Entity>> {
      raws.into_iter().map(RawEntity::into_entity).collect()
    };

    Ok(Hierarchy {
      values:  decode(values)?,
      goals:   decode(goals)?,
      metrics: decode(metrics)?,
    })
  }
}
