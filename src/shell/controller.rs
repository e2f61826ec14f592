//! Shell cache controller: install, activate, and request handling.

use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, warn};

use super::assets::{AssetStore, CachedAsset, CACHE_NAME};
use super::fetch::Fetch;
use super::policy::{classify, FetchStrategy, ShellRequest, PRECACHE_ASSETS};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSource {
  Network,
  Cache,
}

/// A served shell asset plus its provenance.
#[derive(Debug, Clone)]
pub struct ShellResponse {
  pub body: Vec<u8>,
  pub content_type: Option<String>,
  pub source: ShellSource,
}

impl ShellResponse {
  fn from_cache(asset: CachedAsset) -> Self {
    Self {
      body: asset.body,
      content_type: asset.content_type,
      source: ShellSource::Cache,
    }
  }

  fn from_network(asset: CachedAsset) -> Self {
    Self {
      body: asset.body,
      content_type: asset.content_type,
      source: ShellSource::Network,
    }
  }
}

/// Controller applying the shell caching policy over an asset store and
/// a network fetcher.
pub struct ShellController<F: Fetch, S: AssetStore> {
  fetcher: F,
  store: Arc<S>,
  cache_name: String,
}

impl<F: Fetch, S: AssetStore> ShellController<F, S> {
  pub fn new(fetcher: F, store: S) -> Self {
    Self {
      fetcher,
      store: Arc::new(store),
      cache_name: CACHE_NAME.to_string(),
    }
  }

  /// Precache the fixed asset list into the current cache generation.
  /// Fails if any asset cannot be fetched.
  pub async fn install(&self) -> Result<()> {
    for path in PRECACHE_ASSETS {
      let asset = self.fetcher.fetch(path).await?;
      self.store.put(&self.cache_name, &asset)?;
      debug!(path, "precached shell asset");
    }
    Ok(())
  }

  /// Delete every cache generation other than the current one.
  /// Returns how many generations were dropped.
  pub fn activate(&self) -> Result<usize> {
    let mut dropped = 0;
    for name in self.store.cache_names()? {
      if name != self.cache_name {
        self.store.delete_cache(&name)?;
        dropped += 1;
      }
    }
    if dropped > 0 {
      debug!(dropped, "removed stale shell cache generations");
    }
    Ok(dropped)
  }

  /// Handle one request according to the classification policy.
  pub async fn handle(&self, request: &ShellRequest) -> Result<ShellResponse> {
    match classify(request) {
      FetchStrategy::Bypass => {
        let asset = self.fetcher.fetch(&request.path).await?;
        Ok(ShellResponse::from_network(asset))
      }
      FetchStrategy::NetworkFirst => match self.fetcher.fetch(&request.path).await {
        Ok(asset) => Ok(ShellResponse::from_network(asset)),
        Err(err) => {
          warn!(path = %request.path, %err, "network failed, trying cache");
          match self.store.get(&self.cache_name, &request.path)? {
            Some(asset) => Ok(ShellResponse::from_cache(asset)),
            // Nothing cached for this navigation: the failure stands
            None => Err(err),
          }
        }
      },
      FetchStrategy::CacheFirst => {
        if let Some(asset) = self.store.get(&self.cache_name, &request.path)? {
          return Ok(ShellResponse::from_cache(asset));
        }
        // Cache miss: serve from network without populating the cache
        let asset = self.fetcher.fetch(&request.path).await?;
        Ok(ShellResponse::from_network(asset))
      }
    }
  }
}

/// Convenience used by the app's startup task: install + activate.
/// An error here means the shell host was unreachable.
pub async fn sync<F: Fetch, S: AssetStore>(controller: &ShellController<F, S>) -> Result<()> {
  controller.install().await?;
  controller.activate()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::shell::assets::MemoryAssets;
  use crate::shell::fetch::FetchFuture;
  use color_eyre::eyre::eyre;
  use std::collections::HashMap;

  /// Fetcher serving canned bodies, or failing every request.
  struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    fail: bool,
  }

  impl FakeFetcher {
    fn online(paths: &[(&str, &[u8])]) -> Self {
      Self {
        responses: paths
          .iter()
          .map(|(p, b)| (p.to_string(), b.to_vec()))
          .collect(),
        fail: false,
      }
    }

    fn offline() -> Self {
      Self {
        responses: HashMap::new(),
        fail: true,
      }
    }
  }

  impl Fetch for FakeFetcher {
    fn fetch(&self, path: &str) -> FetchFuture {
      let result = if self.fail {
        Err(eyre!("network unreachable"))
      } else {
        match self.responses.get(path) {
          Some(body) => Ok(CachedAsset {
            path: path.to_string(),
            body: body.clone(),
            content_type: None,
          }),
          None => Err(eyre!("404 for {}", path)),
        }
      };
      Box::pin(async move { result })
    }
  }

  fn precache_assets() -> Vec<(&'static str, &'static [u8])> {
    vec![
      ("/icon.svg", b"<svg/>".as_slice()),
      ("/manifest.json", b"{}".as_slice()),
    ]
  }

  #[tokio::test]
  async fn test_install_precaches_fixed_assets() {
    let controller = ShellController::new(
      FakeFetcher::online(&precache_assets()),
      MemoryAssets::new(),
    );
    controller.install().await.unwrap();

    let cached = controller
      .store
      .get(CACHE_NAME, "/icon.svg")
      .unwrap()
      .unwrap();
    assert_eq!(cached.body, b"<svg/>");
    assert!(controller
      .store
      .get(CACHE_NAME, "/manifest.json")
      .unwrap()
      .is_some());
  }

  #[tokio::test]
  async fn test_activate_drops_old_generations_only() {
    let store = MemoryAssets::new();
    store
      .put(
        "applyflow-shell-v0",
        &CachedAsset {
          path: "/icon.svg".to_string(),
          body: b"old".to_vec(),
          content_type: None,
        },
      )
      .unwrap();
    store
      .put(
        CACHE_NAME,
        &CachedAsset {
          path: "/icon.svg".to_string(),
          body: b"new".to_vec(),
          content_type: None,
        },
      )
      .unwrap();

    let controller = ShellController::new(FakeFetcher::offline(), store);
    let dropped = controller.activate().unwrap();

    assert_eq!(dropped, 1);
    let kept = controller
      .store
      .get(CACHE_NAME, "/icon.svg")
      .unwrap()
      .unwrap();
    assert_eq!(kept.body, b"new");
  }

  #[tokio::test]
  async fn test_cached_asset_served_when_network_fails() {
    // Install while online, then lose the network
    let store = MemoryAssets::new();
    {
      let online = ShellController::new(FakeFetcher::online(&precache_assets()), MemoryAssets::new());
      online.install().await.unwrap();
      // Copy the precached asset into the shared store
      let asset = online.store.get(CACHE_NAME, "/icon.svg").unwrap().unwrap();
      store.put(CACHE_NAME, &asset).unwrap();
    }

    let offline = ShellController::new(FakeFetcher::offline(), store);
    let response = offline
      .handle(&ShellRequest::asset("/icon.svg"))
      .await
      .unwrap();

    assert_eq!(response.source, ShellSource::Cache);
    assert_eq!(response.body, b"<svg/>");
  }

  #[tokio::test]
  async fn test_navigation_falls_back_to_cache() {
    let store = MemoryAssets::new();
    store
      .put(
        CACHE_NAME,
        &CachedAsset {
          path: "/dashboard".to_string(),
          body: b"<html/>".to_vec(),
          content_type: Some("text/html".to_string()),
        },
      )
      .unwrap();

    let controller = ShellController::new(FakeFetcher::offline(), store);
    let response = controller
      .handle(&ShellRequest::navigate("/dashboard"))
      .await
      .unwrap();
    assert_eq!(response.source, ShellSource::Cache);
  }

  #[tokio::test]
  async fn test_navigation_without_cache_entry_fails() {
    let controller = ShellController::new(FakeFetcher::offline(), MemoryAssets::new());
    let result = controller.handle(&ShellRequest::navigate("/jobs")).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_cache_first_miss_does_not_populate_cache() {
    let controller = ShellController::new(
      FakeFetcher::online(&precache_assets()),
      MemoryAssets::new(),
    );

    let response = controller
      .handle(&ShellRequest::asset("/icon.svg"))
      .await
      .unwrap();
    assert_eq!(response.source, ShellSource::Network);

    // The fallback path did not write the cache
    assert!(controller
      .store
      .get(CACHE_NAME, "/icon.svg")
      .unwrap()
      .is_none());
  }

  #[tokio::test]
  async fn test_navigation_prefers_network_when_online() {
    let store = MemoryAssets::new();
    store
      .put(
        CACHE_NAME,
        &CachedAsset {
          path: "/".to_string(),
          body: b"stale".to_vec(),
          content_type: None,
        },
      )
      .unwrap();

    let controller =
      ShellController::new(FakeFetcher::online(&[("/", b"fresh".as_slice())]), store);
    let response = controller.handle(&ShellRequest::navigate("/")).await.unwrap();
    assert_eq!(response.source, ShellSource::Network);
    assert_eq!(response.body, b"fresh");
  }
}
