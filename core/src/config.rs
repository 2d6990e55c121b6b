//! Configuration management for the footwear inventory core
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FIM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bill-of-materials configuration
    pub bom: BomConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Names of the component-type dimensions that make up one assembled
/// pair. The legacy system inferred these from naming convention; here
/// the mapping is explicit configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct BomConfig {
    /// Dimension name of the strap component type
    pub strap_component_type: String,

    /// Dimension name of the sole component type
    pub sole_component_type: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = std::env::var("FIM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            // Dimension names used by the sandal assembly line
            .set_default("bom.strap_component_type", "Tira")?
            .set_default("bom.sole_component_type", "Planta")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FIM_ prefix)
            .add_source(
                Environment::with_prefix("FIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            strap_component_type: "Tira".to_string(),
            sole_component_type: "Planta".to_string(),
        }
    }
}
