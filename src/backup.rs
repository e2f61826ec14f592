//! Backup export and atomic import.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::followup::{now_iso, today};
use crate::domain::types::{Contact, Interaction, Job, Template};
use crate::store::{Store, StoreBackend, StoreSnapshot};

/// Current backup format version. Version 1 predates templates.
const BACKUP_VERSION: u32 = 2;

/// The on-disk backup document.
///
/// Collection arrays default to empty so a version-1 file (no
/// `templates`) still imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
  #[serde(default)]
  pub jobs: Vec<Job>,
  #[serde(default)]
  pub contacts: Vec<Contact>,
  #[serde(default)]
  pub interactions: Vec<Interaction>,
  #[serde(default)]
  pub templates: Vec<Template>,
  pub exported_at: String,
  pub version: u32,
}

impl BackupFile {
  fn from_snapshot(snapshot: StoreSnapshot) -> Self {
    Self {
      jobs: snapshot.jobs,
      contacts: snapshot.contacts,
      interactions: snapshot.interactions,
      templates: snapshot.templates,
      exported_at: now_iso(),
      version: BACKUP_VERSION,
    }
  }

  fn into_snapshot(self) -> StoreSnapshot {
    StoreSnapshot {
      jobs: self.jobs,
      contacts: self.contacts,
      interactions: self.interactions,
      templates: self.templates,
    }
  }
}

/// Default export file name, date-stamped like the original exports.
pub fn default_export_name() -> String {
  format!("applyflow-backup-{}.json", today())
}

/// Write a backup of the whole store to `dir`, returning the file path.
pub fn export_to_dir<B: StoreBackend>(store: &Store<B>, dir: &Path) -> Result<PathBuf> {
  let backup = BackupFile::from_snapshot(store.snapshot()?);
  let json = serde_json::to_string_pretty(&backup)
    .map_err(|e| eyre!("Failed to serialize backup: {}", e))?;

  let path = dir.join(default_export_name());
  std::fs::write(&path, json)
    .map_err(|e| eyre!("Failed to write backup to {}: {}", path.display(), e))?;

  Ok(path)
}

/// Parse a backup document.
pub fn parse(json: &str) -> Result<BackupFile> {
  serde_json::from_str(json).map_err(|e| eyre!("Invalid backup file: {}", e))
}

/// Overwrite the store with the contents of a backup file.
///
/// Parsing happens before any write, and the store swap is atomic, so a
/// malformed file leaves the current data untouched.
pub fn import<B: StoreBackend>(store: &Store<B>, path: &Path) -> Result<ImportSummary> {
  let json = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
  let backup = parse(&json)?;

  let summary = ImportSummary {
    jobs: backup.jobs.len(),
    contacts: backup.contacts.len(),
    interactions: backup.interactions.len(),
    templates: backup.templates.len(),
  };

  store.replace_all(&backup.into_snapshot())?;
  Ok(summary)
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
  pub jobs: usize,
  pub contacts: usize,
  pub interactions: usize,
  pub templates: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::types::ContactChannel;
  use crate::store::MemoryBackend;

  fn store() -> Store<MemoryBackend> {
    Store::new(MemoryBackend::new())
  }

  fn sample_job(company: &str) -> Job {
    Job::new(
      company.to_string(),
      "Picker".to_string(),
      "Bundaberg, QLD".to_string(),
      "2025-01-01T00:00:00.000Z".to_string(),
    )
  }

  #[test]
  fn test_export_then_import_roundtrip() {
    let source = store();
    source.jobs().add(&sample_job("Farm Connect")).unwrap();
    source
      .templates()
      .add(&Template::new(
        "Intro".to_string(),
        ContactChannel::Email,
        "Hi {{name}}".to_string(),
        "2025-01-01T00:00:00.000Z".to_string(),
      ))
      .unwrap();

    let dir = std::env::temp_dir().join(format!("applyflow-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = export_to_dir(&source, &dir).unwrap();

    let target = store();
    target.jobs().add(&sample_job("Stale")).unwrap();
    let summary = import(&target, &path).unwrap();

    assert_eq!(summary.jobs, 1);
    assert_eq!(summary.templates, 1);
    let jobs = target.jobs().list().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company, "Farm Connect");

    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn test_import_length_matches_backup_exactly() {
    let backup = BackupFile {
      jobs: (0..5).map(|n| sample_job(&format!("Company {}", n))).collect(),
      contacts: Vec::new(),
      interactions: Vec::new(),
      templates: Vec::new(),
      exported_at: "2025-01-01T00:00:00.000Z".to_string(),
      version: 2,
    };

    let target = store();
    target.jobs().add(&sample_job("Old")).unwrap();
    target.replace_all(&backup.into_snapshot()).unwrap();
    assert_eq!(target.jobs().list().unwrap().len(), 5);
  }

  #[test]
  fn test_malformed_file_leaves_store_untouched() {
    let dir = std::env::temp_dir().join(format!("applyflow-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.json");
    std::fs::write(&path, "{not json").unwrap();

    let target = store();
    target.jobs().add(&sample_job("Kept")).unwrap();

    assert!(import(&target, &path).is_err());
    assert_eq!(target.jobs().list().unwrap().len(), 1);

    std::fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn test_version_one_file_imports_with_empty_templates() {
    let json = r#"{
      "jobs": [],
      "contacts": [],
      "interactions": [],
      "exportedAt": "2024-06-01T00:00:00.000Z",
      "version": 1
    }"#;
    let backup = parse(json).unwrap();
    assert!(backup.templates.is_empty());
    assert_eq!(backup.version, 1);
  }
}
