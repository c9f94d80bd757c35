//! Market Harvester: a marketplace product crawler
//!
//! This crate implements a crawler for a single e-commerce marketplace. Seed
//! keywords are optionally expanded through the site's autosuggest endpoint,
//! each (keyword, category) pair drives a bounded pagination chain over
//! search results, and every discovered product page is fetched, extracted
//! into a structured record, and emitted to the output sinks.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod product;
pub mod search;
pub mod sink;
pub mod suggest;

use thiserror::Error;

/// Main error type for Market Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("WebDriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session could not be established: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Market Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use product::ProductRecord;
pub use search::{PaginationState, SearchTask, StopReason};
