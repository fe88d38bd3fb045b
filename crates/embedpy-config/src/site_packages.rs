//! Locating the site-packages directory of a Python virtual environment
//!
//! The bridge hands this directory to `site.addsitedir` so packages installed
//! in a venv become importable from the embedded interpreter.

use crate::errors::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// "Lib" on Windows, "lib" on Unix
#[cfg(windows)]
pub const PYTHON_LIB_DIR: &str = "Lib";
#[cfg(not(windows))]
pub const PYTHON_LIB_DIR: &str = "lib";

pub const SITE_PACKAGES: &str = "site-packages";

/// Resolve the site-packages path for a Python virtual environment
///
/// - **Unix/macOS**: `<venv>/lib/python3.X/site-packages`
/// - **Windows**: `<venv>/Lib/site-packages`
pub fn resolve_site_packages(venv_path: &Path) -> Result<PathBuf, ConfigError> {
    if !venv_path.is_dir() {
        return Err(ConfigError::VenvNotFound(venv_path.to_path_buf()));
    }

    let lib_dir = venv_path.join(PYTHON_LIB_DIR);
    if !lib_dir.is_dir() {
        return Err(ConfigError::PathResolution(format!(
            "lib directory not found: {}",
            lib_dir.display()
        )));
    }

    let site_packages = if cfg!(windows) {
        lib_dir.join(SITE_PACKAGES)
    } else {
        // Highest interpreter wins when several share one venv
        fs::read_dir(&lib_dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let version = python_dir_version(&e.file_name().to_string_lossy())?;
                Some((version, e.path()))
            })
            .max_by_key(|(version, _)| *version)
            .map(|(_, path)| path)
            .ok_or_else(|| {
                ConfigError::PathResolution(format!(
                    "No python3.X directory found in {}",
                    lib_dir.display()
                ))
            })?
            .join(SITE_PACKAGES)
    };

    if !site_packages.is_dir() {
        return Err(ConfigError::PathResolution(format!(
            "site-packages not found: {}",
            site_packages.display()
        )));
    }

    Ok(site_packages)
}

/// `(major, minor)` of a `python{major}.{minor}` directory name
fn python_dir_version(name: &str) -> Option<(u32, u32)> {
    let (major, minor) = name.strip_prefix("python")?.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}
