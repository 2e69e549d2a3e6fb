//! Communal shop configuration loading from config.toml
//!
//! The communal ("town mall") shop is seeded from a TOML file: each item has
//! a name, a coin price, and an optional stock count. Seeding itself lives in
//! `core::reward::seed_communal_rewards`, which inserts only items that are
//! not already present.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure for the `[[items]]` tables in config.toml
#[derive(Debug, Deserialize)]
pub struct ShopConfig {
    /// Communal shop items to seed
    #[serde(default)]
    pub items: Vec<ShopItemConfig>,
}

/// Configuration for a single communal shop item
#[derive(Debug, Deserialize, Clone)]
pub struct ShopItemConfig {
    /// Name of the item
    pub name: String,
    /// Price in coins
    pub price: i64,
    /// Stock count; omit for unlimited stock
    pub stock: Option<i32>,
}

/// Loads communal shop configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ShopConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads communal shop configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<ShopConfig> {
    load_config("config.toml")
}
