use super::start_runtime;
use crate::GlobalOpts;
use colored::Colorize;
use embedpy::BridgeError;

/// Start the interpreter and report its version
pub fn handle_check(opts: &GlobalOpts) -> anyhow::Result<()> {
    let runtime = start_runtime(opts)?;

    let executable = runtime.with_lock(|lock| {
        let sys = lock.import_module("sys")?;
        let executable = lock.get_attribute(&sys, "executable")?;
        if lock.is_text(&executable) {
            Ok::<String, BridgeError>(lock.decode_text(&executable)?.to_owned_string())
        } else {
            Ok(String::new())
        }
    })?;

    println!("{} {}", "Python".bold().green(), runtime.python_version());
    if opts.verbosity_level() > 0 && !executable.is_empty() {
        println!("  {}: {}", "executable".cyan(), executable);
    }
    Ok(())
}
