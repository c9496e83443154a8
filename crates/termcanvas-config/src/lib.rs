//! termcanvas configuration.
//!
//! TOML-based configuration with validation. Every section has defaults so
//! partial configs work out of the box.
//!
//! ```rust,no_run
//! let config = termcanvas_config::load_config(None).expect("failed to load config");
//! println!("listening on port {}", config.network.port);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{CanvasConfig, LoggingConfig, NetworkConfig, TermcanvasConfig, DEFAULT_PORT};

use std::path::Path;
use termcanvas_common::ConfigError;

/// Load config from `path`, or from the platform default location when
/// `None`, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<TermcanvasConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}
