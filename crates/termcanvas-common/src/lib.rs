pub mod errors;
pub mod id;
pub mod types;

pub use errors::{
    CanvasError, ColorNameError, ConfigError, ConnectionError, MalformedFileError, ProtocolError,
};
pub use id::ConnectionId;
pub use types::{Cell, ColorRef, Point, Region, Style};
