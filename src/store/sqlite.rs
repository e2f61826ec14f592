//! SQLite implementation of the store backend.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, ErrorCode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::backend::{merge_fields, StoreBackend, StoreSnapshot};
use super::record::Record;

/// Schema version 1: the original three collections.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_job
    ON contacts (json_extract(data, '$.jobId'));

CREATE TABLE IF NOT EXISTS interactions (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_interactions_job
    ON interactions (json_extract(data, '$.jobId'));
"#;

/// Schema version 2: message templates. Additive only.
const SCHEMA_V2: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);
"#;

const MIGRATIONS: &[&str] = &[SCHEMA_V1, SCHEMA_V2];

/// SQLite-backed store. Records are JSON documents keyed by id, one table
/// per collection, inside a single database file.
pub struct SqliteBackend {
  conn: Mutex<Connection>,
}

impl SqliteBackend {
  /// Open or create the database at the default location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create data directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    let backend = Self {
      conn: Mutex::new(conn),
    };
    backend.run_migrations()?;

    Ok(backend)
  }

  /// In-memory database, for tests.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().map_err(|e| eyre!("Failed to open database: {}", e))?;
    let backend = Self {
      conn: Mutex::new(conn),
    };
    backend.run_migrations()?;
    Ok(backend)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("applyflow").join("applyflow.db"))
  }

  /// Apply any schema versions newer than the database's `user_version`.
  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock()?;

    let current: u32 = conn
      .query_row("PRAGMA user_version", [], |row| row.get(0))
      .map_err(|e| eyre!("Failed to read schema version: {}", e))?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
      let version = (idx + 1) as u32;
      if version <= current {
        continue;
      }
      conn
        .execute_batch(migration)
        .map_err(|e| eyre!("Failed to apply schema version {}: {}", version, e))?;
      conn
        .pragma_update(None, "user_version", version)
        .map_err(|e| eyre!("Failed to record schema version {}: {}", version, e))?;
    }

    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  fn encode<R: Record>(record: &R) -> Result<String> {
    serde_json::to_string(record).map_err(|e| eyre!("Failed to serialize record: {}", e))
  }

  fn decode<R: Record>(data: &str) -> Result<R> {
    serde_json::from_str(data).map_err(|e| eyre!("Failed to deserialize record: {}", e))
  }
}

impl StoreBackend for SqliteBackend {
  fn add<R: Record>(&self, record: &R) -> Result<()> {
    let conn = self.lock()?;
    let data = Self::encode(record)?;

    let sql = format!("INSERT INTO {} (id, data) VALUES (?1, ?2)", R::collection());
    conn.execute(&sql, params![record.id(), data]).map_err(|e| {
      if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.code == ErrorCode::ConstraintViolation {
          return eyre!("{} '{}' already exists", R::collection(), record.id());
        }
      }
      eyre!("Failed to add {}: {}", R::collection(), e)
    })?;

    Ok(())
  }

  fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
    let conn = self.lock()?;

    let sql = format!("SELECT data FROM {} WHERE id = ?1", R::collection());
    let data: Option<String> = conn
      .query_row(&sql, params![id], |row| row.get(0))
      .ok();

    match data {
      Some(data) => Ok(Some(Self::decode(&data)?)),
      None => Ok(None),
    }
  }

  fn update<R: Record>(&self, id: &str, patch: &Value) -> Result<bool> {
    let conn = self.lock()?;

    let select = format!("SELECT data FROM {} WHERE id = ?1", R::collection());
    let data: Option<String> = conn.query_row(&select, params![id], |row| row.get(0)).ok();

    let Some(data) = data else {
      return Ok(false);
    };

    let mut doc: Value =
      serde_json::from_str(&data).map_err(|e| eyre!("Corrupt record '{}': {}", id, e))?;
    merge_fields(&mut doc, patch);

    // The merged document must still be a valid record of this type
    let record: R = serde_json::from_value(doc)
      .map_err(|e| eyre!("Update would corrupt {} '{}': {}", R::collection(), id, e))?;
    let merged = Self::encode(&record)?;

    let update = format!("UPDATE {} SET data = ?2 WHERE id = ?1", R::collection());
    conn
      .execute(&update, params![id, merged])
      .map_err(|e| eyre!("Failed to update {}: {}", R::collection(), e))?;

    Ok(true)
  }

  fn delete<R: Record>(&self, id: &str) -> Result<()> {
    let conn = self.lock()?;

    let sql = format!("DELETE FROM {} WHERE id = ?1", R::collection());
    conn
      .execute(&sql, params![id])
      .map_err(|e| eyre!("Failed to delete from {}: {}", R::collection(), e))?;

    Ok(())
  }

  fn list<R: Record>(&self) -> Result<Vec<R>> {
    let conn = self.lock()?;

    let sql = format!("SELECT data FROM {}", R::collection());
    let mut stmt = conn
      .prepare(&sql)
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let rows: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list {}: {}", R::collection(), e))?
      .filter_map(|r| r.ok())
      .collect();

    rows.iter().map(|data| Self::decode(data)).collect()
  }

  fn query<R: Record>(&self, field: &str, value: &str) -> Result<Vec<R>> {
    let conn = self.lock()?;

    let sql = format!(
      "SELECT data FROM {} WHERE json_extract(data, ?1) = ?2",
      R::collection()
    );
    let path = format!("$.{}", field);

    let mut stmt = conn
      .prepare(&sql)
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let rows: Vec<String> = stmt
      .query_map(params![path, value], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query {}: {}", R::collection(), e))?
      .filter_map(|r| r.ok())
      .collect();

    rows.iter().map(|data| Self::decode(data)).collect()
  }

  fn bulk_add<R: Record>(&self, records: &[R]) -> Result<usize> {
    let conn = self.lock()?;

    let sql = format!(
      "INSERT OR IGNORE INTO {} (id, data) VALUES (?1, ?2)",
      R::collection()
    );
    let mut stmt = conn
      .prepare(&sql)
      .map_err(|e| eyre!("Failed to prepare insert: {}", e))?;

    let mut inserted = 0;
    for record in records {
      let data = Self::encode(record)?;
      inserted += stmt
        .execute(params![record.id(), data])
        .map_err(|e| eyre!("Failed to insert into {}: {}", R::collection(), e))?;
    }

    Ok(inserted)
  }

  fn clear<R: Record>(&self) -> Result<()> {
    let conn = self.lock()?;

    let sql = format!("DELETE FROM {}", R::collection());
    conn
      .execute(&sql, [])
      .map_err(|e| eyre!("Failed to clear {}: {}", R::collection(), e))?;

    Ok(())
  }

  fn replace_all(&self, snapshot: &StoreSnapshot) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute_batch("BEGIN IMMEDIATE")
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    let result = (|| -> Result<()> {
      for table in ["jobs", "contacts", "interactions", "templates"] {
        conn
          .execute(&format!("DELETE FROM {}", table), [])
          .map_err(|e| eyre!("Failed to clear {}: {}", table, e))?;
      }

      insert_all(&conn, "jobs", &snapshot.jobs)?;
      insert_all(&conn, "contacts", &snapshot.contacts)?;
      insert_all(&conn, "interactions", &snapshot.interactions)?;
      insert_all(&conn, "templates", &snapshot.templates)?;
      Ok(())
    })();

    match result {
      Ok(()) => conn
        .execute_batch("COMMIT")
        .map_err(|e| eyre!("Failed to commit transaction: {}", e)),
      Err(e) => {
        // Leave the old contents untouched
        let _ = conn.execute_batch("ROLLBACK");
        Err(e)
      }
    }
  }
}

fn insert_all<R: Record>(conn: &Connection, table: &str, records: &[R]) -> Result<()> {
  let sql = format!("INSERT INTO {} (id, data) VALUES (?1, ?2)", table);
  let mut stmt = conn
    .prepare(&sql)
    .map_err(|e| eyre!("Failed to prepare insert: {}", e))?;

  for record in records {
    let data =
      serde_json::to_string(record).map_err(|e| eyre!("Failed to serialize record: {}", e))?;
    stmt
      .execute(params![record.id(), data])
      .map_err(|e| eyre!("Failed to insert into {}: {}", table, e))?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::{Contact, ContactChannel, Job, JobStatus};
  use serde_json::json;

  fn sample_job(company: &str) -> Job {
    Job::new(
      company.to_string(),
      "Kitchen hand".to_string(),
      "Coffs Harbour, NSW".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    )
  }

  #[test]
  fn test_add_then_get_returns_equal_record() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let job = sample_job("Cafe Corner");

    backend.add(&job).unwrap();
    let got: Job = backend.get(&job.id).unwrap().unwrap();
    assert_eq!(got, job);
  }

  #[test]
  fn test_add_duplicate_id_fails() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let job = sample_job("Cafe Corner");

    backend.add(&job).unwrap();
    assert!(backend.add(&job).is_err());
    // The original record is intact
    assert_eq!(backend.list::<Job>().unwrap().len(), 1);
  }

  #[test]
  fn test_update_patches_only_named_fields() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let job = sample_job("Byron Hostel");
    backend.add(&job).unwrap();

    let changed = backend
      .update::<Job>(&job.id, &json!({"status": "APPLIED"}))
      .unwrap();
    assert!(changed);

    let got: Job = backend.get(&job.id).unwrap().unwrap();
    assert_eq!(got.status, JobStatus::Applied);
    assert_eq!(got.company, job.company);
    assert_eq!(got.updated_at, job.updated_at);
  }

  #[test]
  fn test_update_absent_id_is_noop() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let changed = backend
      .update::<Job>("missing", &json!({"status": "APPLIED"}))
      .unwrap();
    assert!(!changed);
  }

  #[test]
  fn test_delete_job_leaves_contacts_orphaned() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let job = sample_job("Farm Connect");
    let contact = Contact::new(
      job.id.clone(),
      "Sam".to_string(),
      ContactChannel::Whatsapp,
      "+61 400 000 000".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    );
    backend.add(&job).unwrap();
    backend.add(&contact).unwrap();

    backend.delete::<Job>(&job.id).unwrap();

    assert!(backend.get::<Job>(&job.id).unwrap().is_none());
    // No cascade: the contact still references the deleted job
    let orphans: Vec<Contact> = backend.query("jobId", &job.id).unwrap();
    assert_eq!(orphans.len(), 1);
  }

  #[test]
  fn test_query_by_job_id() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let job_a = sample_job("A");
    let job_b = sample_job("B");
    for job in [&job_a, &job_b] {
      backend.add(job).unwrap();
    }
    for n in 0..3 {
      let c = Contact::new(
        job_a.id.clone(),
        format!("Person {}", n),
        ContactChannel::Email,
        format!("p{}@example.com", n),
        "2025-01-01T00:00:00.000Z".to_string(),
      );
      backend.add(&c).unwrap();
    }

    let found: Vec<Contact> = backend.query("jobId", &job_a.id).unwrap();
    assert_eq!(found.len(), 3);
    let found: Vec<Contact> = backend.query("jobId", &job_b.id).unwrap();
    assert!(found.is_empty());
  }

  #[test]
  fn test_bulk_add_skips_existing() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let existing = sample_job("Existing");
    backend.add(&existing).unwrap();

    let fresh = sample_job("Fresh");
    let inserted = backend
      .bulk_add(&[existing.clone(), fresh.clone()])
      .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(backend.list::<Job>().unwrap().len(), 2);
  }

  #[test]
  fn test_replace_all_swaps_contents() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend.add(&sample_job("Old 1")).unwrap();
    backend.add(&sample_job("Old 2")).unwrap();

    let snapshot = StoreSnapshot {
      jobs: vec![sample_job("New 1")],
      ..Default::default()
    };
    backend.replace_all(&snapshot).unwrap();

    let jobs = backend.list::<Job>().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "New 1");
  }

  #[test]
  fn test_replace_all_rolls_back_on_duplicate() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend.add(&sample_job("Old")).unwrap();

    let dup = sample_job("Dup");
    let snapshot = StoreSnapshot {
      jobs: vec![dup.clone(), dup],
      ..Default::default()
    };
    assert!(backend.replace_all(&snapshot).is_err());

    // Old contents untouched - never a partially-cleared mix
    let jobs = backend.list::<Job>().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "Old");
  }

  #[test]
  fn test_migrations_are_idempotent() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    // Re-running from the recorded version applies nothing and breaks nothing
    backend.run_migrations().unwrap();

    let conn = backend.lock().unwrap();
    let version: u32 = conn
      .query_row("PRAGMA user_version", [], |row| row.get(0))
      .unwrap();
    assert_eq!(version, MIGRATIONS.len() as u32);
  }
}
