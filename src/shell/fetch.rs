//! Network fetching for shell assets.

use color_eyre::{eyre::eyre, Result};
use std::future::Future;
use std::pin::Pin;
use url::Url;

use super::assets::CachedAsset;

/// A boxed future returning a fetched asset.
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<CachedAsset>> + Send>>;

/// Trait for fetching a shell asset by path.
///
/// The controller only sees this seam, so tests can substitute an
/// always-failing or canned fetcher.
pub trait Fetch: Send + Sync {
  fn fetch(&self, path: &str) -> FetchFuture;
}

/// HTTP fetcher against the configured shell base URL.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  base: Url,
}

impl HttpFetcher {
  pub fn new(base_url: &str) -> Result<Self> {
    let base = Url::parse(base_url).map_err(|e| eyre!("Invalid shell base URL: {}", e))?;

    let client = reqwest::Client::builder()
      .user_agent(concat!("applyflow/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self { client, base })
  }
}

impl Fetch for HttpFetcher {
  fn fetch(&self, path: &str) -> FetchFuture {
    let client = self.client.clone();
    let url = self.base.join(path.trim_start_matches('/'));
    let path = path.to_string();

    Box::pin(async move {
      let url = url.map_err(|e| eyre!("Invalid asset path '{}': {}", path, e))?;

      let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| eyre!("Fetch failed for {}: {}", url, e))?
        .error_for_status()
        .map_err(|e| eyre!("Fetch failed for {}: {}", url, e))?;

      let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

      let body = response
        .bytes()
        .await
        .map_err(|e| eyre!("Failed to read body for {}: {}", url, e))?
        .to_vec();

      Ok(CachedAsset {
        path,
        body,
        content_type,
      })
    })
  }
}
