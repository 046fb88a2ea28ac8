//! The `HierarchyStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tiers-store-sqlite`).
//! Higher layers (`tiers-api`, `tiers-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  entity::{Connections, Entity, EntityUpdate, Hierarchy, NewEntity},
  kind::EntityKind,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Tiers store backend.
///
/// Every method is a single atomic unit: it either applies completely or not
/// at all. Association rows are the single source of truth for connections,
/// so replacing Goal G's Value set is immediately visible from each Value's
/// side as well.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HierarchyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate, persist and return a new entity with a fresh id.
  ///
  /// Requested connection ids that do not currently exist are silently
  /// dropped. Fails with [`crate::Error::NameRequired`] for a blank name.
  fn create(
    &self,
    input: NewEntity,
  ) -> impl Future<Output = Result<Entity, Self::Error>> + Send + '_;

  /// Replace the name and description of an entity and every one of its
  /// connection sets. A set missing from `update.connections` is cleared.
  ///
  /// Fails with [`crate::Error::NotFound`] if `id` does not exist.
  fn update(
    &self,
    kind: EntityKind,
    id: i64,
    update: EntityUpdate,
  ) -> impl Future<Output = Result<Entity, Self::Error>> + Send + '_;

  /// Replace only the connection sets present in `connections`.
  fn set_connections(
    &self,
    kind: EntityKind,
    id: i64,
    connections: Connections,
  ) -> impl Future<Output = Result<Entity, Self::Error>> + Send + '_;

  /// Remove an entity and its association rows. Entities on the other side
  /// of those associations are kept.
  fn delete(
    &self,
    kind: EntityKind,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove every entity of every kind. Succeeds on an empty store.
  fn reset(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve one entity with its connections. Returns `None` if not found.
  fn get(
    &self,
    kind: EntityKind,
    id: i64,
  ) -> impl Future<Output = Result<Option<Entity>, Self::Error>> + Send + '_;

  /// All entities of `kind` in id order, each with its connections.
  fn list(
    &self,
    kind: EntityKind,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  /// All entities of all kinds, read as one consistent snapshot.
  fn hierarchy(&self) -> impl Future<Output = Result<Hierarchy, Self::Error>> + Send + '_;
}
