//! Peer-to-peer canvas sync over TCP.
//!
//! A [`Session`] owns the canvas and a [`ConnectionRegistry`]. [`Host`]
//! accepts peers into it, [`connect`] joins a remote host. Every decoded line
//! is applied locally and then forwarded to every other peer.

pub mod client;
mod connection;
pub mod host;
pub mod registry;
pub mod session;

pub use client::{connect, dial_target};
pub use host::Host;
pub use registry::{ConnectionRegistry, Outbound};
pub use session::{CanvasState, Session, SessionOptions};
