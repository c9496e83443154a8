//! Configuration validation. Collects every problem into one `ConfigError`.

use crate::schema::TermcanvasConfig;
use termcanvas_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TermcanvasConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let net = &config.network;
    if net.port == 0 {
        errors.push("network.port must not be 0".into());
    }
    if net.bind_address.trim().is_empty() {
        errors.push("network.bind_address must not be empty".into());
    }
    validate_range(&mut errors, "network.outbound_queue", net.outbound_queue, 16, 65536);
    validate_range(&mut errors, "network.max_line_length", net.max_line_length, 64, 1_048_576);

    let canvas = &config.canvas;
    validate_range(&mut errors, "canvas.width", canvas.width.into(), 1, 1000);
    validate_range(&mut errors, "canvas.height", canvas.height.into(), 1, 1000);
    validate_range(&mut errors, "canvas.max_region_cells", canvas.max_region_cells, 1, 100_000_000);
    if canvas.header_rows >= canvas.height {
        errors.push(format!(
            "canvas.header_rows = {} leaves no drawable rows (height {})",
            canvas.header_rows, canvas.height
        ));
    }

    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
