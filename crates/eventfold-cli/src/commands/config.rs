//! Configuration commands.

use crate::config::EventfoldConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &EventfoldConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", EventfoldConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &EventfoldConfig) -> ClientResult<()> {
    config.validate()?;

    if let Some(ref path) = config.local.events_file {
        let store = config.store()?;
        println!(
            "Loaded {} events from {}.",
            store.events().len(),
            path.display()
        );
    }
    println!("{} remote source(s) configured.", config.sources.len());
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = EventfoldConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
