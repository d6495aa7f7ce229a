//! Run command handler
//!
//! Collects samples, runs the battery and prints the report.

use crate::battery::sp800_22r1a_battery;
use crate::config::{Config, RunConfig};
use crate::encode::EncodingPolicy;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::pipeline::{self, describe_source};
use crate::qrng::DeviceBackend;
use crate::source::{data_collection, write_samples};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run command arguments
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Read samples from this file instead of a device
    #[arg(long, value_name = "PATH", conflicts_with = "device")]
    pub mock: Option<PathBuf>,

    /// Read samples from the device even if the config enables mock mode
    #[arg(long)]
    pub device: bool,

    /// Device backend (anu, pseudo)
    #[arg(long, short = 'b')]
    pub backend: Option<String>,

    /// Device network address
    #[arg(long)]
    pub address: Option<String>,

    /// Device index
    #[arg(long)]
    pub device_index: Option<u32>,

    /// Number of samples to request
    #[arg(long, short = 'n')]
    pub samples: Option<usize>,

    /// Seed for the pseudo backend
    #[arg(long)]
    pub seed: Option<u64>,

    /// Encoding policy (encode_val, map_val, last_bits)
    #[arg(long, short = 'e')]
    pub encoding: Option<String>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write the collected samples to a file
    #[arg(long, value_name = "PATH")]
    pub save_samples: Option<PathBuf>,

    /// Log each test result as it completes
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Use this config file instead of the default one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List the tests in the battery
    #[arg(long = "list-tests")]
    pub list_tests: bool,

    /// List available encoding policies
    #[arg(long = "list-encodings")]
    pub list_encodings: bool,

    /// List available device backends
    #[arg(long = "list-backends")]
    pub list_backends: bool,
}

/// Run the run command
pub fn run(args: RunArgs) -> Result<()> {
    // Handle list flags first
    if args.list_tests {
        list_tests();
        return Ok(());
    }

    if args.list_encodings {
        list_encodings();
        return Ok(());
    }

    if args.list_backends {
        list_backends();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let run_config = apply_overrides(&args, config.to_run_config()?)?;

    init_logging(run_config.verbose);

    // Resolve the formatter before spending time on collection
    let formatter = get_formatter(&run_config.format).ok_or_else(|| {
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            run_config.format,
            available_formats()
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })?;

    let report = match &args.save_samples {
        Some(path) => {
            let samples = data_collection(&run_config)?;
            write_samples(path, &samples)?;
            info!(path = %path.display(), count = samples.len(), "samples saved");
            pipeline::evaluate(
                &samples,
                run_config.encoding,
                describe_source(&run_config),
                run_config.verbose,
            )?
        }
        None => pipeline::run(&run_config)?,
    };

    info!(
        passed = report.passed_count(),
        total = report.results.len(),
        "run complete"
    );

    print!("{}", formatter.format(&report)?);
    Ok(())
}

/// Layer command-line flags over the resolved config
fn apply_overrides(args: &RunArgs, mut config: RunConfig) -> Result<RunConfig> {
    if let Some(path) = &args.mock {
        config.mock = true;
        config.data_path = path.clone();
    }
    if args.device {
        config.mock = false;
    }
    if let Some(backend) = &args.backend {
        config.backend = backend.parse::<DeviceBackend>()?;
    }
    if let Some(address) = &args.address {
        config.device_address = address.clone();
    }
    if let Some(index) = args.device_index {
        config.device_index = index;
    }
    if let Some(samples) = args.samples {
        config.sample_count = samples;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(encoding) = &args.encoding {
        config.encoding = encoding.parse::<EncodingPolicy>()?;
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }
    if args.verbose {
        config.verbose = true;
    }
    Ok(config)
}

/// Initialize logging on stderr
///
/// `RUST_LOG` wins; otherwise `warn`, or `info` when verbose.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print the battery in run order
fn list_tests() {
    println!("Tests in the battery (run order):");
    for test in sp800_22r1a_battery() {
        println!("  {}", test.name());
    }
}

/// Print available encoding policies
fn list_encodings() {
    println!("Available encoding policies:");
    for policy in EncodingPolicy::all() {
        println!("  {:10} - {}", policy.as_str(), policy.description());
    }
}

/// Print available device backends
fn list_backends() {
    println!("Available device backends:");
    for backend in DeviceBackend::all() {
        println!("  {:6} - {}", backend.as_str(), backend.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse_run(argv: &[&str]) -> RunArgs {
        let mut full = vec!["qrng-nist", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = parse_run(&[]);
        let resolved = apply_overrides(&args, RunConfig::default()).unwrap();
        assert_eq!(resolved, RunConfig::default());
    }

    #[test]
    fn test_mock_flag_enables_mock_mode() {
        let args = parse_run(&["--mock", "data/samples.txt"]);
        let resolved = apply_overrides(&args, RunConfig::default()).unwrap();
        assert!(resolved.mock);
        assert_eq!(resolved.data_path, PathBuf::from("data/samples.txt"));
    }

    #[test]
    fn test_device_flag_disables_configured_mock() {
        let args = parse_run(&["--device"]);
        let config = RunConfig {
            mock: true,
            ..RunConfig::default()
        };
        assert!(!apply_overrides(&args, config).unwrap().mock);
    }

    #[test]
    fn test_list_flags_parse() {
        let args = parse_run(&["--list-backends", "--list-tests"]);
        assert!(args.list_backends);
        assert!(args.list_tests);
        assert!(!args.list_encodings);
    }

    #[test]
    fn test_mock_and_device_conflict() {
        let result = Cli::try_parse_from(["qrng-nist", "run", "--mock", "a.txt", "--device"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_typed_overrides() {
        let args = parse_run(&[
            "--backend",
            "pseudo",
            "--seed",
            "7",
            "--samples",
            "100",
            "--encoding",
            "last_bits",
            "--format",
            "json",
            "--verbose",
        ]);
        let resolved = apply_overrides(&args, RunConfig::default()).unwrap();
        assert_eq!(resolved.backend, DeviceBackend::Pseudo);
        assert_eq!(resolved.seed, Some(7));
        assert_eq!(resolved.sample_count, 100);
        assert_eq!(resolved.encoding, EncodingPolicy::LastBits);
        assert_eq!(resolved.format, "json");
        assert!(resolved.verbose);
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let args = parse_run(&["--encoding", "rot13"]);
        let err = apply_overrides(&args, RunConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let args = parse_run(&["--backend", "dice"]);
        assert!(apply_overrides(&args, RunConfig::default()).is_err());
    }
}
