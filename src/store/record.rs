//! Core trait for records the store can persist.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities stored in one of the named collections.
///
/// Implementors map to exactly one collection and expose the unique id
/// the store keys them by.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this record.
  fn id(&self) -> &str;

  /// Collection (table) name this record type lives in.
  fn collection() -> &'static str;

  /// Last modification timestamp (ISO 8601), when the type tracks one.
  fn updated_at(&self) -> Option<&str> {
    None
  }
}
