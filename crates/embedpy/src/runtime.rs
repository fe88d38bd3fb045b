//! Interpreter lifecycle
//!
//! The embedded interpreter is a process-wide singleton. It is started at
//! most once; the outcome of that first start (success or failure) is cached
//! and handed back to every later caller.

use crate::errors::BridgeError;
use embedpy_config::Config;
use embedpy_logger as logger;
use once_cell::sync::OnceCell;
use parking_lot::ReentrantMutex;
use pyo3::prelude::*;
use pyo3::types::PyModule;
use std::time::Instant;

/// Handle meaning "the embedded interpreter is running"
pub struct Runtime {
    python_version: String,
    /// Serializes bridge scopes across threads; see `Runtime::with_lock`
    pub(crate) exclusive: ReentrantMutex<()>,
}

static RUNTIME: OnceCell<Result<Runtime, BridgeError>> = OnceCell::new();

impl Runtime {
    /// Start the interpreter with default settings, or return the running one
    pub fn initialize() -> Result<&'static Runtime, BridgeError> {
        Self::initialize_with(&Config::default())
    }

    /// Start the interpreter applying `config`, or return the running one
    ///
    /// Configuration only takes effect on the first call; the interpreter is
    /// never reconfigured or restarted.
    pub fn initialize_with(config: &Config) -> Result<&'static Runtime, BridgeError> {
        let mut started_here = false;
        let outcome = RUNTIME.get_or_init(|| {
            started_here = true;
            Runtime::start(config)
        });
        if !started_here {
            logger::step("Python runtime already initialized, reusing it");
        }
        cached(outcome)
    }

    /// Whether the interpreter has been started successfully
    pub fn is_initialized() -> bool {
        matches!(RUNTIME.get(), Some(Ok(_)))
    }

    /// The running runtime, without starting it
    pub fn get() -> Result<&'static Runtime, BridgeError> {
        match RUNTIME.get() {
            Some(outcome) => cached(outcome),
            None => Err(BridgeError::NotInitialized),
        }
    }

    /// `major.minor` version of the embedded interpreter
    pub fn python_version(&self) -> &str {
        &self.python_version
    }

    fn start(config: &Config) -> Result<Runtime, BridgeError> {
        let start_time = Instant::now();

        let site_packages = config.venv_site_packages()?;

        let pyo3_start = Instant::now();
        std::panic::catch_unwind(pyo3::Python::initialize).map_err(|_| {
            BridgeError::Initialization("embedded interpreter failed to start".to_string())
        })?;
        logger::debug(&format!(
            "pyo3::Python::initialize took: {:?}",
            pyo3_start.elapsed()
        ));

        let mut runtime = Runtime {
            python_version: String::new(),
            exclusive: ReentrantMutex::new(()),
        };

        runtime.python_version = runtime.with_lock(|lock| {
            if let Some(write) = config.write_bytecode {
                let sys = lock.import_module("sys")?;
                sys.as_bound()
                    .setattr("dont_write_bytecode", !write)
                    .map_err(|e| {
                        BridgeError::Initialization(format!(
                            "Failed to configure bytecode generation: {}",
                            e
                        ))
                    })?;
                logger::debug(&format!("sys.dont_write_bytecode = {}", !write));
            }

            for dir in config.search_dirs() {
                if lock.add_search_path(&dir)? {
                    logger::debug(&format!("Added to sys.path: {}", dir.display()));
                }
            }

            if let Some(ref site) = site_packages {
                lock.add_site_dir(site)?;
                logger::debug(&format!("Added site directory: {}", site.display()));
            }

            detect_python_version(lock.python())
        })?;

        logger::debug(&format!(
            "Python {} runtime ready in {:?}",
            runtime.python_version,
            start_time.elapsed()
        ));
        Ok(runtime)
    }
}

fn cached(outcome: &'static Result<Runtime, BridgeError>) -> Result<&'static Runtime, BridgeError> {
    match outcome {
        Ok(runtime) => Ok(runtime),
        Err(BridgeError::Initialization(msg)) => Err(BridgeError::Initialization(msg.clone())),
        Err(e) => Err(BridgeError::Initialization(format!("{}", e))),
    }
}

fn detect_python_version(py: Python<'_>) -> Result<String, BridgeError> {
    let sys = PyModule::import(py, "sys")
        .map_err(|e| BridgeError::Initialization(format!("Failed to import sys: {}", e)))?;
    let version_info = sys
        .getattr("version_info")
        .map_err(|e| BridgeError::Initialization(format!("Failed to get version_info: {}", e)))?;

    let major = version_info.getattr("major")?.extract::<i32>()?;
    let minor = version_info.getattr("minor")?.extract::<i32>()?;

    Ok(format!("{}.{}", major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let first = Runtime::initialize().unwrap();
        for _ in 0..5 {
            let again = Runtime::initialize().unwrap();
            assert!(std::ptr::eq(first, again));
        }
        assert!(Runtime::is_initialized());
        assert!(std::ptr::eq(first, Runtime::get().unwrap()));
    }

    #[test]
    fn test_python_version_is_recorded() {
        let runtime = Runtime::initialize().unwrap();
        let (major, minor) = runtime.python_version().split_once('.').unwrap();
        assert_eq!(major, "3");
        assert!(minor.parse::<u32>().is_ok());
    }
}
