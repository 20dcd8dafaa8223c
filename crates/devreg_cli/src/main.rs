//! devreg CLI
//!
//! Runs the subscription validation and device registration service.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `check-seed` - Validate an account provisioning file
//! - `version` - Print version information

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::serve::ServeOptions;
use logging::{LogFormat, LogLevel};
use std::path::PathBuf;
use std::time::Duration;

/// Subscription validation and device registration service.
#[derive(Parser, Debug)]
#[command(name = "devreg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (RUST_LOG overrides it when set)
    #[arg(global = true, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log output format
    #[arg(global = true, long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// IP address to bind, empty for all interfaces
        #[arg(long, default_value = "")]
        address: String,

        /// TCP port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u32,

        /// Load development accounts
        #[arg(long)]
        seed: bool,

        /// JSON file with accounts and devices to load
        #[arg(long)]
        accounts: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 15)]
        request_timeout: u64,

        /// Seconds to wait for in-flight requests on shutdown
        #[arg(long, default_value_t = 60)]
        shutdown_timeout: u64,
    },

    /// Validate an account provisioning file
    CheckSeed {
        /// Path to the provisioning file
        path: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_level, cli.log_format);

    match cli.command {
        Commands::Serve {
            address,
            port,
            seed,
            accounts,
            request_timeout,
            shutdown_timeout,
        } => {
            commands::serve::run(ServeOptions {
                address,
                port,
                seed,
                accounts,
                request_timeout: Duration::from_secs(request_timeout),
                shutdown_timeout: Duration::from_secs(shutdown_timeout),
            })
            .await?;
        }
        Commands::CheckSeed { path } => {
            commands::check_seed::run(&path)?;
        }
        Commands::Version => {
            println!("devreg v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
