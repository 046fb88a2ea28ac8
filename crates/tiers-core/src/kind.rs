//! The three entity kinds and the relations between them.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// One tier of the hierarchy.
///
/// The lowercase string form (`"value"`, `"goal"`, `"metric"`) is used in URL
/// path segments, in the `type` field of entity dicts and in `item_type`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Value,
  Goal,
  Metric,
}

impl EntityKind {
  /// All kinds, top tier first.
  pub const ALL: [EntityKind; 3] =
    [EntityKind::Value, EntityKind::Goal, EntityKind::Metric];

  /// Parse a path segment or `item_type` field.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownKind(s.to_owned()))
  }

  /// The kinds this kind is directly connected to, in serialisation order.
  pub fn neighbours(self) -> &'static [EntityKind] {
    match self {
      EntityKind::Value => &[EntityKind::Goal],
      EntityKind::Goal => &[EntityKind::Value, EntityKind::Metric],
      EntityKind::Metric => &[EntityKind::Goal],
    }
  }

  /// Whether `self` and `other` share an association table.
  pub fn connects_to(self, other: EntityKind) -> bool {
    self.neighbours().contains(&other)
  }

  /// The only kind this kind connects to, if there is exactly one.
  ///
  /// A bare id list can be attributed to a relation only when this is
  /// `Some`. A Goal has two relations, so its lists must be keyed.
  pub fn sole_neighbour(self) -> Option<EntityKind> {
    match self.neighbours() {
      [only] => Some(*only),
      _ => None,
    }
  }

  /// Capitalised label for human-facing messages.
  pub fn label(self) -> &'static str {
    match self {
      EntityKind::Value => "Value",
      EntityKind::Goal => "Goal",
      EntityKind::Metric => "Metric",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_lowercase_names() {
    assert_eq!(EntityKind::parse("value").unwrap(), EntityKind::Value);
    assert_eq!(EntityKind::parse("goal").unwrap(), EntityKind::Goal);
    assert_eq!(EntityKind::parse("metric").unwrap(), EntityKind::Metric);
  }

  #[test]
  fn rejects_unknown_names() {
    let err = EntityKind::parse("objective").unwrap_err();
    assert!(matches!(err, Error::UnknownKind(ref s) if s == "objective"));
    assert!(err.is_validation());
  }

  #[test]
  fn display_matches_path_segment() {
    assert_eq!(EntityKind::Metric.to_string(), "metric");
    assert_eq!(EntityKind::Goal.as_ref(), "goal");
  }

  #[test]
  fn relations_are_symmetric() {
    for a in EntityKind::ALL {
      for b in EntityKind::ALL {
        assert_eq!(a.connects_to(b), b.connects_to(a), "{a} <-> {b}");
      }
    }
    assert!(!EntityKind::Value.connects_to(EntityKind::Metric));
  }

  #[test]
  fn only_goal_has_two_relations() {
    assert_eq!(EntityKind::Value.sole_neighbour(), Some(EntityKind::Goal));
    assert_eq!(EntityKind::Metric.sole_neighbour(), Some(EntityKind::Goal));
    assert_eq!(EntityKind::Goal.sole_neighbour(), None);
  }
}
