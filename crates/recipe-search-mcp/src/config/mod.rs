//! Configuration loading and resolution.

pub mod loader;

pub use loader::{from_sources, load_config, ConfigError, ConfigFile, Overrides, ServerConfig};
