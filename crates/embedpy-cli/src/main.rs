use clap::{Parser, Subcommand};
use embedpy_cli::{
    commands::{
        call::{self, CallCommand},
        check,
        config::{self, ConfigAction},
    },
    init_tracing, GlobalOpts,
};
use embedpy_logger as logger;

#[derive(Parser)]
#[command(name = "embedpy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Host an embedded Python interpreter",
    long_about = "embedpy starts an embedded Python interpreter, loads classes from Python modules and calls their methods with text arguments."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interpreter and print its version
    Check,
    /// Instantiate a Python class and call one of its methods
    Call(CallCommand),
    /// Show or change embedpy configuration
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        logger::warn(&format!("Failed to initialize logger: {}", e));
    }
    init_tracing(cli.global.verbosity_level());

    let result = match cli.command {
        Commands::Check => check::handle_check(&cli.global),
        Commands::Call(cmd) => call::handle_call(cmd, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        logger::show_log_path();
        std::process::exit(1);
    }
}
