//! Reading `config.toml`, and seeding a commented one on first run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use termcanvas_common::ConfigError;
use tracing::{info, warn};

use crate::schema::TermcanvasConfig;
use crate::validation;

const APP_DIR: &str = "termcanvas";
const FILE_NAME: &str = "config.toml";

/// Read and parse `path`. A file that parses but fails validation yields the
/// defaults, with the problems logged.
pub fn load_from_path(path: &Path) -> Result<TermcanvasConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config = parse(&content)?;
    match validation::validate(&config) {
        Ok(()) => {
            info!(path = %path.display(), "Config loaded");
            Ok(config)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config rejected, using defaults");
            Ok(TermcanvasConfig::default())
        }
    }
}

/// Parse TOML text. Validation is up to the caller.
pub fn parse(content: &str) -> Result<TermcanvasConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load [`default_config_path`]. On first run the template is written there
/// and the defaults are used.
pub fn load_default() -> Result<TermcanvasConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            if let Err(e) = create_default_config(&path) {
                // Read-only config dir: run on defaults.
                warn!(error = %e, "Could not write config template");
            }
            Ok(TermcanvasConfig::default())
        }
        other => other,
    }
}

/// `termcanvas/config.toml` under the directory `dirs::config_dir` reports.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

/// Write the template to `path`, creating missing parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_error =
        |e: std::io::Error| ConfigError::ParseError(format!("cannot write {}: {e}", path.display()));

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_error)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(write_error)?;
    info!(path = %path.display(), "Wrote config template");
    Ok(())
}

const DEFAULT_CONFIG_TOML: &str = r##"# termcanvas
# Every key is optional; uncomment one to override its default.

[network]
# port = 55055
# bind_address = "0.0.0.0"
# outbound_queue = 256       # 16-65536 queued writes per connection
# max_line_length = 4096     # 64-1048576 bytes

[canvas]
# header_rows = 4            # toolbar rows, not shared or saved
# width = 120                # headless surface size
# height = 40
# max_region_cells = 1000000 # largest accepted region fill, 1-100000000

[logging]
# level = "termcanvas=info"  # RUST_LOG style directive
"##;
