pub mod call;
pub mod check;
pub mod config;

use crate::GlobalOpts;
use anyhow::Context;
use embedpy::Runtime;
use embedpy_config::Config;
use embedpy_logger as logger;

/// Load the config file, merge `--path` flags and bring the interpreter up
pub(crate) fn start_runtime(opts: &GlobalOpts) -> anyhow::Result<&'static Runtime> {
    let config = Config::load().context("Failed to load configuration")?;
    let config = opts.bridge_config(config);

    logger::spinner_start("Starting Python runtime");
    match Runtime::initialize_with(&config) {
        Ok(runtime) => {
            logger::spinner_success(&format!("Python {} ready", runtime.python_version()));
            Ok(runtime)
        }
        Err(e) => {
            logger::spinner_error("Python runtime failed to start");
            Err(e.into())
        }
    }
}
