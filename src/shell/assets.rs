//! Named asset caches and their storage backends.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// Cache generation the current build writes to. Bumping it makes
/// `activate` drop every older generation.
pub const CACHE_NAME: &str = "applyflow-shell-v1";

/// One cached shell asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
  pub path: String,
  pub body: Vec<u8>,
  pub content_type: Option<String>,
}

/// Storage for named asset caches.
pub trait AssetStore: Send + Sync {
  /// Store an asset under the given cache name, replacing any entry for
  /// the same path.
  fn put(&self, cache: &str, asset: &CachedAsset) -> Result<()>;

  /// Look up an asset by path within a cache.
  fn get(&self, cache: &str, path: &str) -> Result<Option<CachedAsset>>;

  /// Names of every cache generation currently stored.
  fn cache_names(&self) -> Result<Vec<String>>;

  /// Drop a whole cache generation.
  fn delete_cache(&self, cache: &str) -> Result<()>;
}

const ASSET_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS shell_assets (
    cache_name TEXT NOT NULL,
    path TEXT NOT NULL,
    body BLOB NOT NULL,
    content_type TEXT,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (cache_name, path)
);
"#;

/// SQLite-backed asset store.
pub struct SqliteAssets {
  conn: Mutex<Connection>,
}

impl SqliteAssets {
  /// Open or create the asset database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open asset cache at {}: {}", path.display(), e))?;

    conn
      .execute_batch(ASSET_SCHEMA)
      .map_err(|e| eyre!("Failed to run asset cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl AssetStore for SqliteAssets {
  fn put(&self, cache: &str, asset: &CachedAsset) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO shell_assets (cache_name, path, body, content_type, cached_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))",
        params![cache, asset.path, asset.body, asset.content_type],
      )
      .map_err(|e| eyre!("Failed to store asset: {}", e))?;

    Ok(())
  }

  fn get(&self, cache: &str, path: &str) -> Result<Option<CachedAsset>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare(
        "SELECT body, content_type FROM shell_assets
         WHERE cache_name = ?1 AND path = ?2",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(Vec<u8>, Option<String>)> = stmt
      .query_row(params![cache, path], |row| Ok((row.get(0)?, row.get(1)?)))
      .ok();

    Ok(row.map(|(body, content_type)| CachedAsset {
      path: path.to_string(),
      body,
      content_type,
    }))
  }

  fn cache_names(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare("SELECT DISTINCT cache_name FROM shell_assets")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names: Vec<String> = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list caches: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  fn delete_cache(&self, cache: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "DELETE FROM shell_assets WHERE cache_name = ?1",
        params![cache],
      )
      .map_err(|e| eyre!("Failed to delete cache '{}': {}", cache, e))?;

    Ok(())
  }
}

/// In-memory asset store for tests.
#[derive(Default)]
pub struct MemoryAssets {
  caches: RwLock<HashMap<String, HashMap<String, CachedAsset>>>,
}

impl MemoryAssets {
  pub fn new() -> Self {
    Self::default()
  }
}

impl AssetStore for MemoryAssets {
  fn put(&self, cache: &str, asset: &CachedAsset) -> Result<()> {
    let mut caches = self
      .caches
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    caches
      .entry(cache.to_string())
      .or_default()
      .insert(asset.path.clone(), asset.clone());
    Ok(())
  }

  fn get(&self, cache: &str, path: &str) -> Result<Option<CachedAsset>> {
    let caches = self
      .caches
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(caches.get(cache).and_then(|c| c.get(path)).cloned())
  }

  fn cache_names(&self) -> Result<Vec<String>> {
    let caches = self
      .caches
      .read()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(caches.keys().cloned().collect())
  }

  fn delete_cache(&self, cache: &str) -> Result<()> {
    let mut caches = self
      .caches
      .write()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    caches.remove(cache);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn svg() -> CachedAsset {
    CachedAsset {
      path: "/icon.svg".to_string(),
      body: b"<svg/>".to_vec(),
      content_type: Some("image/svg+xml".to_string()),
    }
  }

  #[test]
  fn test_put_get_roundtrip_memory() {
    let store = MemoryAssets::new();
    store.put(CACHE_NAME, &svg()).unwrap();
    let got = store.get(CACHE_NAME, "/icon.svg").unwrap().unwrap();
    assert_eq!(got.body, b"<svg/>");
  }

  #[test]
  fn test_caches_are_isolated_by_name() {
    let store = MemoryAssets::new();
    store.put("applyflow-shell-v0", &svg()).unwrap();
    assert!(store.get(CACHE_NAME, "/icon.svg").unwrap().is_none());
  }

  #[test]
  fn test_delete_cache_drops_generation() {
    let store = MemoryAssets::new();
    store.put("applyflow-shell-v0", &svg()).unwrap();
    store.put(CACHE_NAME, &svg()).unwrap();

    store.delete_cache("applyflow-shell-v0").unwrap();
    let names = store.cache_names().unwrap();
    assert_eq!(names, vec![CACHE_NAME.to_string()]);
  }
}
