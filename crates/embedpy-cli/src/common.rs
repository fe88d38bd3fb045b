//! Options shared by every subcommand

use clap::Parser;
use embedpy_config::Config;
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Decrease verbosity")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long = "path",
        global = true,
        value_name = "DIR",
        help = "Extra directory on the Python module search path (repeatable)"
    )]
    pub paths: Vec<PathBuf>,
}

impl GlobalOpts {
    /// Effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// The config file merged with `--path` flags, which come after configured paths
    pub fn bridge_config(&self, base: Config) -> Config {
        let mut config = base;
        config
            .search_paths
            .extend(self.paths.iter().map(|p| p.to_string_lossy().into_owned()));
        config
    }
}
