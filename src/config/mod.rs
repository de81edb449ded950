/// Database configuration and connection management
pub mod database;

/// Application settings loading from margem.toml
pub mod settings;
