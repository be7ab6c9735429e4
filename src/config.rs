//! # Configuration Module
//!
//! This module loads the header tokens and owner remapping rules used by the
//! rewriter.
//!
//! Configuration lives in `.headstamp.yml` (or `.headstamp.yaml` /
//! `.headstamp.toml`) at the repository root, or in the file named by the
//! `HEADSTAMP_CONFIG` environment variable. A missing file is not an error: it
//! yields a configuration without rules, and every file passes through
//! unchanged.
//!
//! ```yaml
//! headers:
//!   "@project-header@": |
//!     This file is part of Example.
//!     <copyrights>
//! owner_remap:
//!   - pattern: ".*@example\\.com"
//!     name: Example Corp
//! history: log
//! ```
//!
//! Sections are read independently. A section or entry of the wrong shape is
//! reported as a warning and skipped; only a file that is not valid YAML/TOML
//! at all is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::warn;

use crate::copyright::{OwnerRemapper, RemapRule};
use crate::history::HistoryMode;
use crate::verbose_log;

/// Config file names searched at the repository root, in order.
pub const DEFAULT_CONFIG_FILENAMES: [&str; 3] = [".headstamp.yml", ".headstamp.yaml", ".headstamp.toml"];

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "HEADSTAMP_CONFIG";

/// One `owner_remap` entry as written in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemapEntry {
  /// Regular expression matched against the whole author email.
  pub pattern: String,

  /// Owner name used for every matching email.
  pub name: String,
}

/// Loaded configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
  /// Token to template text, in declaration order.
  pub headers: Vec<(String, String)>,

  /// Owner remapping rules, in declaration order.
  pub owner_remap: Vec<RemapEntry>,

  /// Attribution model for the `<copyrights>` marker.
  pub history: HistoryMode,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid YAML.
  #[error("Failed to parse config file '{path}': {source}")]
  YamlError { path: PathBuf, source: serde_yaml::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  TomlError { path: PathBuf, source: toml::de::Error },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// Files ending in `.toml` are read as TOML, everything else as YAML.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
      Self::from_toml_str(&content).map_err(|e| match e {
        TomlConfigError::Toml(source) => ConfigError::TomlError {
          path: path.to_path_buf(),
          source,
        },
        TomlConfigError::Yaml(source) => ConfigError::YamlError {
          path: path.to_path_buf(),
          source,
        },
      })?
    } else {
      Self::from_yaml_str(&content).map_err(|e| ConfigError::YamlError {
        path: path.to_path_buf(),
        source: e,
      })?
    };

    verbose_log!(
      "Loaded {} header tokens and {} remap rules",
      config.headers.len(),
      config.owner_remap.len()
    );

    Ok(config)
  }

  /// Parse YAML configuration text.
  pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(content)?;
    Ok(Self::from_value(value))
  }

  /// Parse TOML configuration text.
  pub fn from_toml_str(content: &str) -> Result<Self, TomlConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(TomlConfigError::Toml)?;
    // Tables keep insertion order (`preserve_order`), and so does the YAML tree.
    let value = serde_yaml::to_value(&table).map_err(TomlConfigError::Yaml)?;
    Ok(Self::from_value(value))
  }

  fn from_value(value: Value) -> Self {
    let mut root = match value {
      Value::Mapping(mapping) => mapping,
      Value::Null => return Self::default(),
      other => {
        warn!("Ignoring config: expected a mapping at the top level, found {}", kind(&other));
        return Self::default();
      }
    };

    let headers = root.remove("headers").map(parse_headers).unwrap_or_default();
    let owner_remap = root.remove("owner_remap").map(parse_owner_remap).unwrap_or_default();
    let history = root.remove("history").map(parse_history).unwrap_or_default();

    for (key, _) in root {
      if let Value::String(name) = key {
        verbose_log!("Ignoring unknown config key: {}", name);
      }
    }

    Self {
      headers,
      owner_remap,
      history,
    }
  }

  /// Compiles the remap rules, skipping entries whose pattern is invalid.
  pub fn remapper(&self) -> OwnerRemapper {
    let rules = self
      .owner_remap
      .iter()
      .filter_map(|entry| match RemapRule::new(&entry.pattern, entry.name.as_str()) {
        Ok(rule) => Some(rule),
        Err(e) => {
          warn!("Ignoring owner_remap entry '{}': {}", entry.pattern, e);
          None
        }
      })
      .collect();
    OwnerRemapper::new(rules)
  }
}

/// Failure while parsing a TOML config, either in TOML itself or while
/// converting it to the common value tree.
#[derive(Debug, thiserror::Error)]
pub enum TomlConfigError {
  #[error(transparent)]
  Toml(toml::de::Error),
  #[error(transparent)]
  Yaml(serde_yaml::Error),
}

const fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Sequence(_) => "a sequence",
    Value::Mapping(_) => "a mapping",
    Value::Tagged(_) => "a tagged value",
  }
}

fn parse_headers(value: Value) -> Vec<(String, String)> {
  let mapping = match value {
    Value::Mapping(mapping) => mapping,
    Value::Null => return Vec::new(),
    other => {
      warn!("Ignoring 'headers': expected a mapping, found {}", kind(&other));
      return Vec::new();
    }
  };

  mapping
    .into_iter()
    .filter_map(|(token, template)| match (token, template) {
      (Value::String(token), _) if token.is_empty() => {
        warn!("Ignoring header with an empty token");
        None
      }
      (Value::String(token), Value::String(template)) => Some((token, template)),
      (Value::String(token), Value::Null) => Some((token, String::new())),
      (Value::String(token), other) => {
        warn!("Ignoring header '{}': expected text, found {}", token, kind(&other));
        None
      }
      (other, _) => {
        warn!("Ignoring header: expected a string token, found {}", kind(&other));
        None
      }
    })
    .collect()
}

fn parse_owner_remap(value: Value) -> Vec<RemapEntry> {
  let entries = match value {
    Value::Sequence(entries) => entries,
    Value::Null => return Vec::new(),
    other => {
      warn!("Ignoring 'owner_remap': expected a sequence, found {}", kind(&other));
      return Vec::new();
    }
  };

  entries
    .into_iter()
    .enumerate()
    .filter_map(|(index, entry)| match serde_yaml::from_value::<RemapEntry>(entry) {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!("Ignoring owner_remap entry #{}: {}", index + 1, e);
        None
      }
    })
    .collect()
}

fn parse_history(value: Value) -> HistoryMode {
  serde_yaml::from_value(value).unwrap_or_else(|e| {
    warn!("Ignoring 'history': {}", e);
    HistoryMode::default()
  })
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `HEADSTAMP_CONFIG` environment variable
/// 3. The first of [`DEFAULT_CONFIG_FILENAMES`] present in the repository root
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  for name in DEFAULT_CONFIG_FILENAMES {
    let candidate = workspace_root.join(name);
    if candidate.is_file() {
      verbose_log!("Using workspace config: {}", candidate.display());
      return Some(candidate);
    }
  }

  verbose_log!("No config file found");
  None
}
