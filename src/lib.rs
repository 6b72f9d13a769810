use thiserror::Error;

pub type Result<T> = std::result::Result<T, SitekitError>;

#[derive(Error, Debug)]
pub enum SitekitError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Calculator error: {0}")]
    Calculator(#[from] calculator::CalcError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Sitemap error: {0}")]
    Sitemap(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod calculator;
pub mod commands;
pub mod config;
pub mod mcp;
pub mod prompts;
pub mod sitemap;
