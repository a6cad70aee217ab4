//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "database.name")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,

    /// Print secrets instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
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
            show_all_config(&config, args.show_secrets);
        }

        // Key only: show that value
        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", display_value(key, &value, args.show_secrets)),
            None => {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        },

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, display_value(key, value, args.show_secrets));
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Mask secret values unless asked to show them
fn display_value(key: &str, value: &str, show_secrets: bool) -> String {
    if value.is_empty() || show_secrets || !Config::is_secret(key) {
        value.to_string()
    } else {
        "***".to_string()
    }
}

/// Display all configuration values, grouped by section
fn show_all_config(config: &Config, show_secrets: bool) {
    let mut section = "";

    for key in Config::available_keys() {
        let Some((prefix, name)) = key.split_once('.') else {
            continue;
        };

        if prefix != section {
            if !section.is_empty() {
                println!();
            }
            println!("[{}]", prefix);
            section = prefix;
        }

        let value = config.get(key).unwrap_or_default();
        if value.is_empty() {
            println!("{} = \"\" # not configured", name);
        } else {
            println!("{} = \"{}\"", name, display_value(key, &value, show_secrets));
        }
    }
}
