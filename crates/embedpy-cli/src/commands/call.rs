use super::start_runtime;
use crate::GlobalOpts;
use anyhow::Context;
use clap::Args;
use embedpy::ClassInstance;
use embedpy_logger as logger;

#[derive(Args, Debug, Clone)]
pub struct CallCommand {
    /// Module to import (e.g., mypackage.tools)
    pub module: String,
    /// Class inside the module; constructed with no arguments
    pub class: String,
    /// Method to call on the new instance
    pub method: String,
    /// Text arguments passed to the method, in order
    pub args: Vec<String>,
}

/// Instantiate the class and print what the method returns
pub fn handle_call(cmd: CallCommand, opts: &GlobalOpts) -> anyhow::Result<()> {
    let runtime = start_runtime(opts)?;

    let instance = ClassInstance::load(runtime, &cmd.module, &cmd.class)
        .with_context(|| format!("Failed to load {}.{}", cmd.module, cmd.class))?;
    logger::info(&format!("Loaded {}.{}", cmd.module, cmd.class));

    let args: Vec<&str> = cmd.args.iter().map(String::as_str).collect();
    logger::debug(&format!(
        "Calling {}.{} with {} argument(s)",
        cmd.class,
        cmd.method,
        args.len()
    ));

    let output = instance
        .invoke(&cmd.method, &args)
        .with_context(|| format!("{}.{} failed", cmd.class, cmd.method))?;
    instance.close();

    println!("{}", output);
    Ok(())
}
