//! Configuration module for Market Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Configuration is an explicit immutable object passed into the
//! crawl driver at construction time, never ambient state.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, EndpointConfig, NetworkConfig, OutputConfig, RenderingConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
