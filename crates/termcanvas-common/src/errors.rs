use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// A palette name that is neither one of the 16 known colors nor `reset`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color name: {0:?}")]
pub struct ColorNameError(pub String);

/// Failure to decode one wire line. Scoped to the line (and the connection
/// that sent it), never to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// `field` is the zero-based index within the comma-separated payload.
    #[error("invalid coordinate in field {field} of line {line:?}")]
    Coordinate { field: usize, line: String },

    #[error(transparent)]
    ColorName(#[from] ColorNameError),

    #[error("malformed line {line:?}: {reason}")]
    Malformed { line: String, reason: String },

    /// A region fill larger than the session allows.
    #[error("region covers {cells} cells, limit is {limit}")]
    RegionTooLarge { cells: u64, limit: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("unable to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A saved canvas that could not be parsed. `line` is one-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed canvas file at line {line}: {reason}")]
pub struct MalformedFileError {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    MalformedFile(#[from] MalformedFileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
