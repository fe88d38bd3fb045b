//! Configuration for the embedpy bridge
//!
//! Settings live in a TOML file (`~/.config/embedpy/embedpy.toml` by default,
//! overridable through `EMBEDPY_CONFIG`) and are applied once, when the
//! embedded interpreter is first started.

pub mod errors;
pub mod site_packages;

pub use errors::ConfigError;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "EMBEDPY_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KEYS: &[&str] = &["search-paths", "venv-path", "write-bytecode"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Directories appended to `sys.path` at startup, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<String>,
    /// Virtual environment whose site-packages is added at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venv_path: Option<String>,
    /// Overrides `sys.dont_write_bytecode` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_bytecode: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config");

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?;

        Ok(base.join("embedpy").join("embedpy.toml"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match key {
            "search-paths" => Ok((!self.search_paths.is_empty()).then(|| self.search_paths.join(","))),
            "venv-path" => Ok(self.venv_path.clone()),
            "write-bytecode" => Ok(self.write_bytecode.map(|v| v.to_string())),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Set a key from its textual form; `search-paths` takes a comma-separated list
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "search-paths" => {
                self.search_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            "venv-path" => self.venv_path = Some(value.to_string()),
            "write-bytecode" => {
                let parsed = value.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                self.write_bytecode = Some(parsed);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.search_paths.is_empty() && self.venv_path.is_none() && self.write_bytecode.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| match self.get(key) {
                Ok(Some(value)) => Some((*key, value)),
                _ => None,
            })
            .collect()
    }

    pub fn search_dirs(&self) -> Vec<PathBuf> {
        self.search_paths.iter().map(PathBuf::from).collect()
    }

    /// site-packages of the configured venv, if one is configured
    pub fn venv_site_packages(&self) -> Result<Option<PathBuf>, ConfigError> {
        self.venv_path
            .as_deref()
            .map(|venv| site_packages::resolve_site_packages(Path::new(venv)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("embedpy.toml");

        let mut config = Config::default();
        config.set("search-paths", "/opt/mods, /srv/py").unwrap();
        config.set("write-bytecode", "false").unwrap();
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("search-paths"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.search_paths, vec!["/opt/mods", "/srv/py"]);
    }

    #[test]
    fn test_get_set_keys() {
        let mut config = Config::default();
        assert_eq!(config.get("venv-path").unwrap(), None);
        config.set("venv-path", "/tmp/venv").unwrap();
        assert_eq!(config.get("venv-path").unwrap(), Some("/tmp/venv".to_string()));
        assert_eq!(config.values_iter(), vec![("venv-path", "/tmp/venv".to_string())]);

        assert!(matches!(config.get("nope"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            config.set("write-bytecode", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_search_dirs_keep_order() {
        let mut config = Config::default();
        config.set("search-paths", "b,a").unwrap();
        assert_eq!(config.search_dirs(), vec![PathBuf::from("b"), PathBuf::from("a")]);
        assert_eq!(config.venv_site_packages().unwrap(), None);
    }

    #[test]
    fn test_missing_venv_fails() {
        let config = Config {
            venv_path: Some("/tmp/embedpy_missing_venv".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.venv_site_packages(),
            Err(ConfigError::VenvNotFound(_))
        ));
    }
}
