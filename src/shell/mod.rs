//! Offline shell cache.
//!
//! The tracker's data lives entirely in the local store; this module keeps
//! the app-shell assets of the companion web shell available offline:
//! - a named asset cache with generation cleanup on activate
//! - install-time precaching of a fixed asset list
//! - per-request policy: framework paths bypass, navigations are
//!   network-first with cache fallback, allow-listed assets cache-first

mod assets;
mod controller;
mod fetch;
mod policy;

pub use assets::{AssetStore, MemoryAssets, SqliteAssets, CACHE_NAME};
pub use controller::{sync, ShellController, ShellResponse, ShellSource};
pub use fetch::{Fetch, HttpFetcher};
pub use policy::{classify, FetchStrategy, RequestMode, ShellRequest};
