/// Medal-bonus conversion schedule loading from config.toml
pub mod conversion;

/// Database configuration and connection management
pub mod database;

/// Communal shop item configuration loading from config.toml
pub mod shop;
