//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "source.backend")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            print!("{}", render_config(&config));
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Render all configuration values, masking the API key
fn render_config(config: &Config) -> String {
    let mut lines = vec!["[source]".to_string()];
    lines.push(format!("mock = {}", config.source.mock));
    lines.push(format!("data_path = \"{}\"", config.source.data_path));
    lines.push(format!("backend = \"{}\"", config.source.backend));
    lines.push(format!("device_address = \"{}\"", config.source.device_address));
    lines.push(format!("device_index = {}", config.source.device_index));
    lines.push(format!("sample_count = {}", config.source.sample_count));
    match config.source.seed {
        Some(seed) => lines.push(format!("seed = {}", seed)),
        None => lines.push("seed = \"\" # not set".to_string()),
    }
    lines.push(String::new());

    lines.push("[encoding]".to_string());
    lines.push(format!("policy = \"{}\"", config.encoding.policy));
    lines.push(String::new());

    lines.push("[report]".to_string());
    lines.push(format!("format = \"{}\"", config.report.format));
    lines.push(format!("verbose = {}", config.report.verbose));
    lines.push(String::new());

    lines.push("[api_keys]".to_string());
    if config.api_keys.anu.is_empty() {
        lines.push("anu = \"\" # not configured".to_string());
    } else {
        lines.push("anu = \"***\" # configured".to_string());
    }

    lines.join("\n") + "\n"
}
