//! Connecting side: dial a host and join its session.

use std::net::{Ipv6Addr, SocketAddr};

use tokio::net::TcpStream;

use termcanvas_common::{ConnectionError, ConnectionId};

use crate::session::Session;

/// Dial `address` (with `default_port` unless it names one) and register the
/// connection in `session`.
pub async fn connect(
    address: &str,
    default_port: u16,
    session: &Session,
) -> Result<ConnectionId, ConnectionError> {
    let target = dial_target(address, default_port);
    let connect_error = |source| ConnectionError::Connect {
        addr: target.clone(),
        source,
    };

    let stream = TcpStream::connect(&target).await.map_err(connect_error)?;
    let peer = stream.peer_addr().map_err(connect_error)?;
    tracing::info!(peer = %peer, "Connected to host");
    Ok(session.attach(stream, peer).await)
}

/// `host:port` to dial. Keeps an explicit port, brackets bare IPv6.
pub fn dial_target(address: &str, default_port: u16) -> String {
    let address = address.trim();
    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }
    if address.parse::<Ipv6Addr>().is_ok() {
        return format!("[{address}]:{default_port}");
    }
    match address.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            address.to_string()
        }
        _ => format!("{address}:{default_port}"),
    }
}
