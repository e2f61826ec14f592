//! Request classification rules for the shell cache.

/// Requests under this prefix belong to the shell's framework runtime and
/// are never intercepted.
pub const FRAMEWORK_PREFIX: &str = "/_next/";

/// Assets precached when the controller installs.
pub const PRECACHE_ASSETS: &[&str] = &["/icon.svg", "/manifest.json"];

/// Path fragments served cache-first.
const ASSET_FRAGMENTS: &[&str] = &["icon.svg", "manifest"];

/// How a request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
  /// A full page load
  Navigate,
  /// A subresource (image, manifest, stylesheet, ...)
  Asset,
}

/// One intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
  pub path: String,
  pub mode: RequestMode,
}

impl ShellRequest {
  pub fn navigate(path: &str) -> Self {
    Self {
      path: path.to_string(),
      mode: RequestMode::Navigate,
    }
  }

  pub fn asset(path: &str) -> Self {
    Self {
      path: path.to_string(),
      mode: RequestMode::Asset,
    }
  }
}

/// Strategy selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
  /// Go straight to the network, untouched
  Bypass,
  /// Network first; any network failure falls back to the cache
  NetworkFirst,
  /// Serve from cache when present; fetch otherwise (without caching)
  CacheFirst,
}

/// Classify a request. Rules are checked in order: framework paths pass
/// through, navigations are network-first, allow-listed assets are
/// cache-first, everything else passes through.
pub fn classify(request: &ShellRequest) -> FetchStrategy {
  if request.path.starts_with(FRAMEWORK_PREFIX) {
    return FetchStrategy::Bypass;
  }

  if request.mode == RequestMode::Navigate {
    return FetchStrategy::NetworkFirst;
  }

  if ASSET_FRAGMENTS.iter().any(|f| request.path.contains(f)) {
    return FetchStrategy::CacheFirst;
  }

  FetchStrategy::Bypass
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_framework_paths_bypass() {
    let req = ShellRequest::asset("/_next/static/chunk.js");
    assert_eq!(classify(&req), FetchStrategy::Bypass);

    // Even framework navigations pass through
    let req = ShellRequest::navigate("/_next/data/page.json");
    assert_eq!(classify(&req), FetchStrategy::Bypass);
  }

  #[test]
  fn test_navigations_are_network_first() {
    for path in ["/", "/dashboard", "/jobs", "/settings"] {
      assert_eq!(
        classify(&ShellRequest::navigate(path)),
        FetchStrategy::NetworkFirst
      );
    }
  }

  #[test]
  fn test_allow_listed_assets_are_cache_first() {
    assert_eq!(
      classify(&ShellRequest::asset("/icon.svg")),
      FetchStrategy::CacheFirst
    );
    assert_eq!(
      classify(&ShellRequest::asset("/manifest.json")),
      FetchStrategy::CacheFirst
    );
    // Fragment match, not exact match
    assert_eq!(
      classify(&ShellRequest::asset("/assets/icon.svg?v=2")),
      FetchStrategy::CacheFirst
    );
  }

  #[test]
  fn test_other_assets_bypass() {
    assert_eq!(
      classify(&ShellRequest::asset("/globals.css")),
      FetchStrategy::Bypass
    );
  }
}
