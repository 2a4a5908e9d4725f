//! Julia Bridge - run Julia code through a supervised REPL subprocess.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use julia_bridge::config::ConfigLoader;
use julia_bridge::{display, BridgeError, JuliaBridge, Value};

#[derive(Parser)]
#[command(
    name = "julia-bridge",
    about = "Run Julia code through a supervised REPL subprocess",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to .julia-bridge.toml, then the user config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the interpreter version banner.
    Version,
    /// Run code and print its output.
    Exec {
        /// Julia code to run.
        code: String,
    },
    /// Evaluate an expression and print its value.
    Eval {
        /// Julia expression to evaluate.
        code: String,
    },
    /// Call a function with Julia expressions as arguments.
    Call {
        /// Function name.
        func: String,
        /// Arguments, each passed through as Julia source.
        args: Vec<String>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(bridge: &mut JuliaBridge, command: Commands) -> Result<(), BridgeError> {
    match command {
        Commands::Version => {
            bridge.open().await?;
            display::print_version(bridge.version());
        }
        Commands::Exec { code } => {
            let lines = bridge.exec(&code).await?;
            display::print_lines(&lines);
        }
        Commands::Eval { code } => {
            let value = bridge.eval(&code).await?;
            display::print_value(&value);
        }
        Commands::Call { func, args } => {
            let args: Vec<Value> = args.into_iter().map(|a| JuliaBridge::expr(a).into()).collect();
            let value = bridge.call(&func, &args).await?;
            display::print_value(&value);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = cli.config.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(config = ?config, "Loaded configuration");

    let mut bridge = JuliaBridge::with_config(config);
    let result = run(&mut bridge, cli.command).await;
    bridge.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
