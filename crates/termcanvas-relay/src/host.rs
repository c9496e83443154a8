//! Listening side: accept peers and hand them the current drawing.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use termcanvas_common::ConnectionError;

use crate::session::Session;

pub struct Host {
    listener: TcpListener,
    session: Session,
}

impl Host {
    /// Bind the listener. A bind failure is fatal for hosting.
    pub async fn bind(addr: &str, session: Session) -> Result<Self, ConnectionError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ConnectionError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr = %addr, "Listening for peers");
        Ok(Self { listener, session })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the session shuts down. Accept errors are
    /// logged and the loop continues.
    pub async fn run(self) {
        let shutdown = self.session.shutdown_token();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        if self.session.accept(stream, addr).await.is_none() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Accept failed"),
                },
            }
        }
        tracing::info!("Stopped accepting peers");
    }
}
