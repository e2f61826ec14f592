//! Storage backend trait for the local data store.

use color_eyre::Result;
use serde_json::Value;

use crate::domain::types::{Contact, Interaction, Job, Template};

use super::record::Record;

/// Full contents of all four collections, used by the atomic
/// backup-import path.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
  pub jobs: Vec<Job>,
  pub contacts: Vec<Contact>,
  pub interactions: Vec<Interaction>,
  pub templates: Vec<Template>,
}

/// Trait for store backends.
///
/// Methods are generic per record type; the collection a call operates on
/// is derived from `R::collection()`. Reads are always fresh - there is no
/// caching layer between callers and the backend.
pub trait StoreBackend: Send + Sync {
  /// Insert a record. Fails if the id already exists.
  fn add<R: Record>(&self, record: &R) -> Result<()>;

  /// Fetch a record by id.
  fn get<R: Record>(&self, id: &str) -> Result<Option<R>>;

  /// Merge `patch` (a JSON object) into the stored record's fields.
  /// Returns false (and changes nothing) when the id is absent.
  fn update<R: Record>(&self, id: &str, patch: &Value) -> Result<bool>;

  /// Delete a record by id. Deleting an absent id is a no-op.
  fn delete<R: Record>(&self, id: &str) -> Result<()>;

  /// All records in the collection. Order is not guaranteed.
  fn list<R: Record>(&self) -> Result<Vec<R>>;

  /// Records whose top-level `field` equals `value`.
  fn query<R: Record>(&self, field: &str, value: &str) -> Result<Vec<R>>;

  /// Best-effort bulk insert: records whose id already exists are
  /// skipped, the rest land. Returns the number inserted. Not atomic.
  fn bulk_add<R: Record>(&self, records: &[R]) -> Result<usize>;

  /// Remove every record in the collection.
  fn clear<R: Record>(&self) -> Result<()>;

  /// Replace the contents of all four collections at once.
  ///
  /// All-or-nothing: a concurrent reader sees either the fully-old or the
  /// fully-new state, never a partially-cleared mix.
  fn replace_all(&self, snapshot: &StoreSnapshot) -> Result<()>;
}

/// Merge a JSON object patch into a JSON object document, field by field.
/// Shared by the backends so both honor the same partial-update semantics.
pub(super) fn merge_fields(doc: &mut Value, patch: &Value) {
  if let (Some(doc_map), Some(patch_map)) = (doc.as_object_mut(), patch.as_object()) {
    for (key, value) in patch_map {
      doc_map.insert(key.clone(), value.clone());
    }
  }
}
