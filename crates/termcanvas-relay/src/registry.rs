//! Connection registry: the set of peers that receive relayed lines.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

use termcanvas_common::ConnectionId;
use termcanvas_protocol::{encode, Operation};

/// One entry of a connection's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Line(String),
    /// Lines written back to back and flushed once. Takes a single queue
    /// slot however long it is.
    Batch(Arc<[String]>),
}

impl Outbound {
    pub fn line(line: impl Into<String>) -> Self {
        Self::Line(line.into())
    }
}

/// One registered connection. Dropping `tx` lets its writer task flush and
/// close the socket.
struct Peer {
    addr: SocketAddr,
    tx: mpsc::Sender<Outbound>,
}

/// Thread-safe connection registry.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    peers: Arc<RwLock<HashMap<ConnectionId, Peer>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection's outbound queue. Returns its new id.
    pub async fn register(&self, addr: SocketAddr, tx: mpsc::Sender<Outbound>) -> ConnectionId {
        let id = ConnectionId::new();
        self.peers.write().await.insert(id, Peer { addr, tx });
        tracing::debug!(connection = %id, peer = %addr, "Connection registered");
        id
    }

    /// Remove a connection. Returns false if it was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.peers.write().await.remove(&id).is_some()
    }

    /// Queue `line` to every registered connection.
    pub async fn broadcast(&self, line: &str) {
        self.send_filtered(None, Outbound::line(line)).await;
    }

    /// Queue `line` to every registered connection except `origin`.
    pub async fn broadcast_except(&self, origin: ConnectionId, line: &str) {
        self.send_filtered(Some(origin), Outbound::line(line)).await;
    }

    /// Queue `lines` to every registered connection as one batch. Empty
    /// batches are not sent.
    pub async fn broadcast_batch(&self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        self.send_filtered(None, Outbound::Batch(lines.into())).await;
    }

    async fn send_filtered(&self, skip: Option<ConnectionId>, item: Outbound) {
        let peers = self.peers.read().await;
        for (id, peer) in peers.iter().filter(|(id, _)| Some(**id) != skip) {
            match peer.tx.try_send(item.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(connection = %id, peer = %peer.addr, "Outbound queue full, line dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(connection = %id, peer = %peer.addr, "Outbound queue closed, line dropped");
                }
            }
        }
    }

    /// Display labels (`ip:port`) of every connection, sorted.
    pub async fn addresses(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .peers
            .read()
            .await
            .values()
            .map(|p| p.addr.to_string())
            .collect();
        labels.sort();
        labels
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Queue `exit` to every connection, then drop all of them.
    pub async fn disconnect_all(&self) {
        let exit = Outbound::Line(encode(&Operation::Disconnect));
        let mut peers = self.peers.write().await;
        for (id, peer) in peers.drain() {
            if peer.tx.try_send(exit.clone()).is_err() {
                tracing::warn!(connection = %id, peer = %peer.addr, "Could not queue exit");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn register_and_unregister() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(4);
        let id = registry.register(addr(1), tx).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.unregister(id).await);
        assert!(!registry.unregister(id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn broadcast_except_skips_origin() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let (tx_c, mut rx_c) = mpsc::channel(4);
        let a = registry.register(addr(1), tx_a).await;
        registry.register(addr(2), tx_b).await;
        registry.register(addr(3), tx_c).await;

        registry.broadcast_except(a, "clear").await;
        assert_eq!(rx_b.recv().await, Some(Outbound::line("clear")));
        assert_eq!(rx_c.recv().await, Some(Outbound::line("clear")));
        assert!(rx_a.try_recv().is_err());

        registry.broadcast("exit").await;
        assert_eq!(rx_a.recv().await, Some(Outbound::line("exit")));
    }

    #[tokio::test]
    async fn full_queue_drops_only_that_destination() {
        let registry = ConnectionRegistry::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        registry.register(addr(1), slow_tx).await;
        registry.register(addr(2), fast_tx).await;

        registry.broadcast("clear").await;
        registry.broadcast("exit").await;

        assert_eq!(slow_rx.recv().await, Some(Outbound::line("clear")));
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(fast_rx.recv().await, Some(Outbound::line("clear")));
        assert_eq!(fast_rx.recv().await, Some(Outbound::line("exit")));
    }

    #[tokio::test]
    async fn batch_takes_one_queue_slot() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(1);
        registry.register(addr(1), tx).await;

        let lines: Vec<String> = (0..50).map(|x| format!("set:{x},5,red,reset,a")).collect();
        registry.broadcast_batch(lines.clone()).await;
        registry.broadcast_batch(Vec::new()).await;

        match rx.recv().await {
            Some(Outbound::Batch(batch)) => assert_eq!(&batch[..], &lines[..]),
            other => panic!("expected a batch, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn addresses_are_sorted_labels() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(1);
        registry.register(addr(9000), tx.clone()).await;
        registry.register(addr(1000), tx).await;
        assert_eq!(
            registry.addresses().await,
            vec!["127.0.0.1:1000".to_string(), "127.0.0.1:9000".to_string()]
        );
    }

    #[tokio::test]
    async fn disconnect_all_sends_exit_and_closes_queues() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(addr(1), tx).await;

        registry.disconnect_all().await;
        assert!(registry.is_empty().await);
        assert_eq!(rx.recv().await, Some(Outbound::line("exit")));
        // Sender dropped with the registry entry.
        assert_eq!(rx.recv().await, None);
    }
}
