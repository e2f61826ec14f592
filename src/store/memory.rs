//! In-memory store backend, the swappable test double.

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::backend::{merge_fields, StoreBackend, StoreSnapshot};
use super::record::Record;

type CollectionMap = BTreeMap<String, Value>;

/// Backend that keeps every collection in a map. Views built against
/// [`StoreBackend`](super::backend::StoreBackend) run unchanged on top of it.
#[derive(Default)]
pub struct MemoryBackend {
  collections: RwLock<HashMap<&'static str, CollectionMap>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<&'static str, CollectionMap>>> {
    self
      .collections
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<&'static str, CollectionMap>>> {
    self
      .collections
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  fn encode<R: Record>(record: &R) -> Result<Value> {
    serde_json::to_value(record).map_err(|e| eyre!("Failed to serialize record: {}", e))
  }

  fn decode<R: Record>(value: &Value) -> Result<R> {
    serde_json::from_value(value.clone())
      .map_err(|e| eyre!("Failed to deserialize record: {}", e))
  }
}

impl StoreBackend for MemoryBackend {
  fn add<R: Record>(&self, record: &R) -> Result<()> {
    let mut collections = self.write()?;
    let map = collections.entry(R::collection()).or_default();

    if map.contains_key(record.id()) {
      return Err(eyre!("{} '{}' already exists", R::collection(), record.id()));
    }
    map.insert(record.id().to_string(), Self::encode(record)?);
    Ok(())
  }

  fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
    let collections = self.read()?;
    match collections.get(R::collection()).and_then(|m| m.get(id)) {
      Some(value) => Ok(Some(Self::decode(value)?)),
      None => Ok(None),
    }
  }

  fn update<R: Record>(&self, id: &str, patch: &Value) -> Result<bool> {
    let mut collections = self.write()?;
    let map = collections.entry(R::collection()).or_default();

    let Some(doc) = map.get(id) else {
      return Ok(false);
    };

    let mut merged = doc.clone();
    merge_fields(&mut merged, patch);
    // Reject patches that would no longer parse as this record type
    let record: R = serde_json::from_value(merged)
      .map_err(|e| eyre!("Update would corrupt {} '{}': {}", R::collection(), id, e))?;
    map.insert(id.to_string(), Self::encode(&record)?);
    Ok(true)
  }

  fn delete<R: Record>(&self, id: &str) -> Result<()> {
    let mut collections = self.write()?;
    if let Some(map) = collections.get_mut(R::collection()) {
      map.remove(id);
    }
    Ok(())
  }

  fn list<R: Record>(&self) -> Result<Vec<R>> {
    let collections = self.read()?;
    match collections.get(R::collection()) {
      Some(map) => map.values().map(Self::decode).collect(),
      None => Ok(Vec::new()),
    }
  }

  fn query<R: Record>(&self, field: &str, value: &str) -> Result<Vec<R>> {
    let collections = self.read()?;
    let Some(map) = collections.get(R::collection()) else {
      return Ok(Vec::new());
    };

    map
      .values()
      .filter(|doc| doc.get(field).and_then(Value::as_str) == Some(value))
      .map(Self::decode)
      .collect()
  }

  fn bulk_add<R: Record>(&self, records: &[R]) -> Result<usize> {
    let mut collections = self.write()?;
    let map = collections.entry(R::collection()).or_default();

    let mut inserted = 0;
    for record in records {
      if map.contains_key(record.id()) {
        continue;
      }
      map.insert(record.id().to_string(), Self::encode(record)?);
      inserted += 1;
    }
    Ok(inserted)
  }

  fn clear<R: Record>(&self) -> Result<()> {
    let mut collections = self.write()?;
    if let Some(map) = collections.get_mut(R::collection()) {
      map.clear();
    }
    Ok(())
  }

  fn replace_all(&self, snapshot: &StoreSnapshot) -> Result<()> {
    // Build the new state first; swap under the write lock only once it
    // is complete, so readers never see a partial import.
    let mut next: HashMap<&'static str, CollectionMap> = HashMap::new();

    fill(&mut next, &snapshot.jobs)?;
    fill(&mut next, &snapshot.contacts)?;
    fill(&mut next, &snapshot.interactions)?;
    fill(&mut next, &snapshot.templates)?;

    let mut collections = self.write()?;
    *collections = next;
    Ok(())
  }
}

fn fill<R: Record>(target: &mut HashMap<&'static str, CollectionMap>, records: &[R]) -> Result<()> {
  let map = target.entry(R::collection()).or_default();
  for record in records {
    if map
      .insert(record.id().to_string(), MemoryBackend::encode(record)?)
      .is_some()
    {
      return Err(eyre!("Duplicate {} id '{}'", R::collection(), record.id()));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::{Job, JobStatus};
  use serde_json::json;

  fn sample_job(company: &str) -> Job {
    Job::new(
      company.to_string(),
      "Labourer".to_string(),
      "Byron Bay, NSW".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    )
  }

  #[test]
  fn test_add_then_get_roundtrip() {
    let backend = MemoryBackend::new();
    let job = sample_job("Coastal Construction");
    backend.add(&job).unwrap();
    assert_eq!(backend.get::<Job>(&job.id).unwrap().unwrap(), job);
  }

  #[test]
  fn test_duplicate_add_fails() {
    let backend = MemoryBackend::new();
    let job = sample_job("Coastal Construction");
    backend.add(&job).unwrap();
    assert!(backend.add(&job).is_err());
  }

  #[test]
  fn test_update_merges_fields() {
    let backend = MemoryBackend::new();
    let job = sample_job("Coastal Construction");
    backend.add(&job).unwrap();

    backend
      .update::<Job>(&job.id, &json!({"status": "INTERVIEW", "notes": "Ask about PPE"}))
      .unwrap();

    let got = backend.get::<Job>(&job.id).unwrap().unwrap();
    assert_eq!(got.status, JobStatus::Interview);
    assert_eq!(got.notes.as_deref(), Some("Ask about PPE"));
    assert_eq!(got.role, job.role);
  }

  #[test]
  fn test_replace_all_is_a_single_swap() {
    let backend = MemoryBackend::new();
    backend.add(&sample_job("Old")).unwrap();

    let snapshot = StoreSnapshot {
      jobs: vec![sample_job("New A"), sample_job("New B")],
      ..Default::default()
    };
    backend.replace_all(&snapshot).unwrap();

    let jobs = backend.list::<Job>().unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.company.starts_with("New")));
  }

  #[test]
  fn test_clear_only_touches_one_collection() {
    let backend = MemoryBackend::new();
    let job = sample_job("Kept");
    backend.add(&job).unwrap();
    backend.clear::<crate::domain::types::Template>().unwrap();
    assert_eq!(backend.list::<Job>().unwrap().len(), 1);
  }
}
