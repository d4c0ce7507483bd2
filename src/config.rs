use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adzuna::request::{Credentials, DEFAULT_COUNTRY, DEFAULT_RESULTS_PER_PAGE};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub search: SearchConfig,
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base of the jobs API; country and page are appended per request
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.adzuna.com/v1/api/jobs".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  pub default_country: String,
  pub results_per_page: u32,
  /// How close (in rows) to the end of the list a visible row must be to load the next page
  pub prefetch_distance: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      default_country: DEFAULT_COUNTRY.to_string(),
      results_per_page: DEFAULT_RESULTS_PER_PAGE,
      prefetch_distance: 3,
    }
  }
}

/// The response TTL and the request timeout are fixed; only caching as a
/// whole can be switched off.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./jobseek.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/jobseek/config.yaml
  ///
  /// With no file found the built-in defaults are used.
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
    let local = PathBuf::from("jobseek.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("jobseek").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }

    let config: Config = serde_yaml::from_str(contents)?;
    if config.search.results_per_page == 0 {
      return Err(eyre!("search.results_per_page must be greater than zero"));
    }

    Ok(config)
  }

  /// Get the Adzuna credentials from environment variables.
  ///
  /// Checks JOBSEEK_APP_ID / JOBSEEK_APP_KEY first, then ADZUNA_APP_ID /
  /// ADZUNA_APP_KEY as fallback.
  pub fn get_credentials() -> Result<Credentials> {
    credentials_from(|name| std::env::var(name).ok())
  }
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
  let first = |names: [&str; 2]| {
    names
      .iter()
      .filter_map(|name| lookup(*name))
      .find(|value| !value.trim().is_empty())
  };

  let app_id = first(["JOBSEEK_APP_ID", "ADZUNA_APP_ID"]).ok_or_else(|| {
    eyre!("Adzuna app id not found. Set JOBSEEK_APP_ID or ADZUNA_APP_ID environment variable.")
  })?;
  let app_key = first(["JOBSEEK_APP_KEY", "ADZUNA_APP_KEY"]).ok_or_else(|| {
    eyre!("Adzuna app key not found. Set JOBSEEK_APP_KEY or ADZUNA_APP_KEY environment variable.")
  })?;

  Ok(Credentials { app_id, app_key })
}
