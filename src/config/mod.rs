//! Configuration management for listing-composer
//!
//! Layered loading, lowest priority first:
//! 1. `default.toml`
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `LISTING_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use loader::ConfigLoader;
pub use settings::{CapabilitiesConfig, ComposerConfig, EndpointConfig, Settings};
