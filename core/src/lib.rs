//! Footwear Inventory Core
//!
//! The inventory-ledger and SKU-matrix subsystem of the footwear
//! manufacturing platform: component and finished-product stock
//! ledgers keyed by unique SKU tuples, the production and assembly
//! order pipelines that move quantity between them, and the series/kit
//! matrix generator that seeds component definitions.
//!
//! This crate is a library; the HTTP/controller layer that consumes it
//! lives elsewhere and owns transport concerns (routing, auth, error
//! response mapping).

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub mod config;
pub mod error;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create a database connection pool and bring the schema up to date.
pub async fn connect(database: &config::DatabaseConfig) -> AppResult<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database.url)
        .await?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| AppError::Configuration(format!("migration failed: {}", e)))?;
    tracing::info!("Database connection established");

    Ok(pool)
}
