// Configuration management module
// Handles TOML configuration loading, validation, and persistence.

pub mod settings;

#[cfg(test)]
mod tests;

pub use settings::{Config, ConfigError, FetchConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}

/// Print the effective configuration to stdout.
#[inline]
pub fn show_config() -> anyhow::Result<()> {
    let config = Config::load()?;
    let path = Config::config_file_path()?;

    println!("Configuration file: {}", path.display());
    if !path.exists() {
        println!("(file does not exist; showing defaults)");
    }
    println!();
    println!("[fetch]");
    println!("timeout_seconds = {}", config.fetch.timeout_seconds);
    println!("user_agent = {:?}", config.fetch.user_agent);
    println!("max_retries = {}", config.fetch.max_retries);
    println!("retry_delay_seconds = {}", config.fetch.retry_delay_seconds);

    Ok(())
}
