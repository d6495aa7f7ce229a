//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod run;

use clap::{Parser, Subcommand};

/// Collect QRNG samples and run the NIST SP800-22r1a battery on them
#[derive(Parser)]
#[command(name = "qrng-nist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect samples and print the test report
    Run(run::RunArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run::run(args),
        Commands::Config(args) => config::run(args),
    }
}
