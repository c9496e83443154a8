//! Configuration schema. Every struct uses `serde(default)` so partial
//! configs work.

use serde::{Deserialize, Serialize};

/// Well-known TCP port for sessions.
pub const DEFAULT_PORT: u16 = 55055;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermcanvasConfig {
    pub network: NetworkConfig,
    pub canvas: CanvasConfig,
    pub logging: LoggingConfig,
}

/// Listening and peer-connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Port to listen on (host) and to dial (client).
    pub port: u16,
    /// Interface the host binds to.
    pub bind_address: String,
    /// Per-connection outbound queue length (valid range: 16-65536).
    pub outbound_queue: u32,
    /// Longest accepted wire line in bytes (valid range: 64-1048576).
    pub max_line_length: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: "0.0.0.0".into(),
            outbound_queue: 256,
            max_line_length: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Rows at the top reserved for the toolbar. Edits there stay local and
    /// are not saved.
    pub header_rows: u16,
    /// Size of the headless surface used by the console.
    pub width: u16,
    pub height: u16,
    /// Largest region fill, in cells, accepted from a peer or the console
    /// (valid range: 1-100000000).
    pub max_region_cells: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            header_rows: 4,
            width: 120,
            height: 40,
            max_region_cells: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "termcanvas=info".into(),
        }
    }
}
