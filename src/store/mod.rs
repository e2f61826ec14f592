//! Durable local storage for the four record collections.
//!
//! The store is the UI's single source of truth: no caching, no eviction,
//! reads always hit the backend. Views depend on [`Store`] generically so
//! the SQLite backend can be swapped for the in-memory one in tests.

mod backend;
mod memory;
mod record;
mod sqlite;

pub use backend::{StoreBackend, StoreSnapshot};
pub use memory::MemoryBackend;
pub use record::Record;
pub use sqlite::SqliteBackend;

use color_eyre::Result;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::types::{Contact, Interaction, Job, Template};

/// Facade over a store backend, handing out collection-scoped handles.
pub struct Store<B: StoreBackend> {
  backend: Arc<B>,
}

impl<B: StoreBackend> Store<B> {
  pub fn new(backend: B) -> Self {
    Self {
      backend: Arc::new(backend),
    }
  }

  pub fn jobs(&self) -> Collection<Job, B> {
    Collection::new(Arc::clone(&self.backend))
  }

  pub fn contacts(&self) -> Collection<Contact, B> {
    Collection::new(Arc::clone(&self.backend))
  }

  pub fn interactions(&self) -> Collection<Interaction, B> {
    Collection::new(Arc::clone(&self.backend))
  }

  pub fn templates(&self) -> Collection<Template, B> {
    Collection::new(Arc::clone(&self.backend))
  }

  /// Read the full contents of all four collections.
  pub fn snapshot(&self) -> Result<StoreSnapshot> {
    Ok(StoreSnapshot {
      jobs: self.backend.list()?,
      contacts: self.backend.list()?,
      interactions: self.backend.list()?,
      templates: self.backend.list()?,
    })
  }

  /// Atomically replace the contents of all four collections.
  /// Used by backup import; see [`StoreBackend::replace_all`].
  pub fn replace_all(&self, snapshot: &StoreSnapshot) -> Result<()> {
    self.backend.replace_all(snapshot)
  }

  /// Wipe every collection ("reset application").
  pub fn reset(&self) -> Result<()> {
    self.backend.replace_all(&StoreSnapshot::default())
  }
}

impl<B: StoreBackend> Clone for Store<B> {
  fn clone(&self) -> Self {
    Self {
      backend: Arc::clone(&self.backend),
    }
  }
}

/// Handle scoped to one collection, exposing the per-collection operations.
pub struct Collection<R: Record, B: StoreBackend> {
  backend: Arc<B>,
  _marker: PhantomData<R>,
}

impl<R: Record, B: StoreBackend> Collection<R, B> {
  fn new(backend: Arc<B>) -> Self {
    Self {
      backend,
      _marker: PhantomData,
    }
  }

  /// Insert a record. Fails if the id already exists.
  pub fn add(&self, record: &R) -> Result<()> {
    self.backend.add(record)
  }

  pub fn get(&self, id: &str) -> Result<Option<R>> {
    self.backend.get(id)
  }

  /// Merge a JSON-object patch into the record. No-op when absent.
  pub fn update(&self, id: &str, patch: &Value) -> Result<bool> {
    self.backend.update::<R>(id, patch)
  }

  pub fn delete(&self, id: &str) -> Result<()> {
    self.backend.delete::<R>(id)
  }

  /// All records; order not guaranteed.
  pub fn list(&self) -> Result<Vec<R>> {
    self.backend.list()
  }

  /// Records whose top-level `field` equals `value`.
  pub fn query(&self, field: &str, value: &str) -> Result<Vec<R>> {
    self.backend.query(field, value)
  }

  /// Best-effort bulk insert; returns how many landed.
  pub fn bulk_add(&self, records: &[R]) -> Result<usize> {
    self.backend.bulk_add(records)
  }

  pub fn clear(&self) -> Result<()> {
    self.backend.clear::<R>()
  }
}

impl<R: Record, B: StoreBackend> Clone for Collection<R, B> {
  fn clone(&self) -> Self {
    Self {
      backend: Arc::clone(&self.backend),
      _marker: PhantomData,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::JobStatus;
  use serde_json::json;

  fn store() -> Store<MemoryBackend> {
    Store::new(MemoryBackend::new())
  }

  fn sample_job() -> Job {
    Job::new(
      "Sandy Beach Gardens".to_string(),
      "Gardener (casual)".to_string(),
      "Sandy Beach, NSW".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    )
  }

  #[test]
  fn test_collection_handles_share_one_backend() {
    let store = store();
    let job = sample_job();
    store.jobs().add(&job).unwrap();

    // A second handle sees the same data
    assert!(store.jobs().get(&job.id).unwrap().is_some());
  }

  #[test]
  fn test_update_via_handle() {
    let store = store();
    let job = sample_job();
    store.jobs().add(&job).unwrap();

    store
      .jobs()
      .update(&job.id, &json!({"status": "OFFER"}))
      .unwrap();
    assert_eq!(
      store.jobs().get(&job.id).unwrap().unwrap().status,
      JobStatus::Offer
    );
  }

  #[test]
  fn test_reset_empties_every_collection() {
    let store = store();
    store.jobs().add(&sample_job()).unwrap();
    store
      .templates()
      .add(&Template::new(
        "Intro".to_string(),
        crate::domain::types::ContactChannel::Email,
        "Hi {{name}}".to_string(),
        "2025-01-01T00:00:00.000Z".to_string(),
      ))
      .unwrap();

    store.reset().unwrap();
    assert!(store.jobs().list().unwrap().is_empty());
    assert!(store.templates().list().unwrap().is_empty());
  }
}
