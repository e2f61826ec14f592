use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for the header (defaults to "applyflow")
  pub title: Option<String>,
  #[serde(default)]
  pub store: StoreConfig,
  /// Shell cache settings; absent = no shell sync, no offline banner
  pub shell: Option<ShellConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
  /// Database file path (default: platform data dir)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
  /// Base URL the shell assets are fetched from
  pub base_url: String,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./applyflow.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/applyflow/config.yaml
  ///
  /// Everything has a default, so a missing file yields the default
  /// config rather than an error.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("applyflow.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("applyflow").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Header title.
  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("applyflow")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_full_config() {
    let yaml = r#"
title: "job hunt"
store:
  path: /tmp/applyflow.db
shell:
  base_url: "https://applyflow.example.com"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.title(), "job hunt");
    assert_eq!(
      config.store.path.as_deref(),
      Some(Path::new("/tmp/applyflow.db"))
    );
    assert_eq!(
      config.shell.unwrap().base_url,
      "https://applyflow.example.com"
    );
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.title(), "applyflow");
    assert!(config.store.path.is_none());
    assert!(config.shell.is_none());
  }
}
