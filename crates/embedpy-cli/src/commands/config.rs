use crate::GlobalOpts;
use anyhow::Context;
use clap::Subcommand;
use colored::Colorize;
use embedpy_config::{Config, KEYS};
use embedpy_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Print the path of the configuration file
    Path,
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> anyhow::Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load().context("Failed to load config")?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Path => {
            let path = Config::path()?;
            logger::debug(&format!("Config resolved to {}", path.display()));
            println!("{}", path.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load().context("Failed to load config")?;
            config.set(&key, &value).with_context(|| {
                format!("Supported keys: {}", KEYS.join(", "))
            })?;
            config.save().context("Failed to save config")?;
            logger::success(&format!("Set {} = {}", key, value));
        }
    }
    Ok(())
}
