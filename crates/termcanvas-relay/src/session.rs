//! Shared drawing session: the canvas, its peers and the shutdown signal.
//!
//! The same `Session` backs hosting, client and offline use. Lock order is
//! always canvas first, then registry.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use termcanvas_canvas::{parse_csv, repaint, to_csv, CanvasStore, Damage, Surface};
use termcanvas_common::{ConnectionId, MalformedFileError, ProtocolError};
use termcanvas_protocol::{encode, Operation};

use crate::connection;
use crate::registry::{ConnectionRegistry, Outbound};

/// Canvas data plus the surface it is rendered onto.
pub struct CanvasState {
    pub store: CanvasStore,
    pub surface: Box<dyn Surface>,
}

impl CanvasState {
    fn repaint(&mut self, damage: Damage) {
        repaint(&self.store, self.surface.as_mut(), damage);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Rows `y < header_rows` are local-only.
    pub header_rows: u16,
    pub outbound_queue: usize,
    pub max_line_length: usize,
    /// Largest region fill, in cells, that is applied.
    pub max_region_cells: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            header_rows: 4,
            outbound_queue: 256,
            max_line_length: 4096,
            max_region_cells: 1_000_000,
        }
    }
}

#[derive(Clone)]
pub struct Session {
    canvas: Arc<Mutex<CanvasState>>,
    registry: ConnectionRegistry,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    options: SessionOptions,
}

impl Session {
    pub fn new(surface: Box<dyn Surface>, options: SessionOptions) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(CanvasState {
                store: CanvasStore::new(),
                surface,
            })),
            registry: ConnectionRegistry::new(),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            options,
        }
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub(crate) fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Token cancelled by [`Session::shutdown`].
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Whether an operation is relayed to peers. Edits whose top row lies in
    /// the header band stay local.
    fn is_shared(&self, op: &Operation) -> bool {
        op.top_row()
            .map_or(true, |y| y >= self.options.header_rows)
    }

    /// Reject region fills over `max_region_cells`.
    fn check_size(&self, op: &Operation) -> Result<(), ProtocolError> {
        match op {
            Operation::DrawRegion { region, .. } if region.area() > self.options.max_region_cells => {
                Err(ProtocolError::RegionTooLarge {
                    cells: region.area(),
                    limit: self.options.max_region_cells,
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply a local edit and relay it to every peer. An oversized region is
    /// neither applied nor relayed.
    ///
    /// `Operation::Disconnect` leaves the session instead.
    pub async fn submit(&self, op: Operation) -> Result<(), ProtocolError> {
        if matches!(op, Operation::Disconnect) {
            self.shutdown().await;
            return Ok(());
        }
        self.check_size(&op)?;
        let mut canvas = self.canvas.lock().await;
        let damage = canvas.store.apply(&op);
        if self.is_shared(&op) {
            self.registry.broadcast(&encode(&op)).await;
        }
        canvas.repaint(damage);
        Ok(())
    }

    /// Apply an operation read from `origin` and forward its raw line to
    /// every other peer. An error means the sender broke the session's
    /// limits and should be dropped.
    pub(crate) async fn apply_remote(
        &self,
        origin: ConnectionId,
        op: &Operation,
        line: &str,
    ) -> Result<(), ProtocolError> {
        self.check_size(op)?;
        let mut canvas = self.canvas.lock().await;
        let damage = canvas.store.apply(op);
        self.registry.broadcast_except(origin, line).await;
        canvas.repaint(damage);
        Ok(())
    }

    /// Overlay a saved canvas as local edits. Peers receive the shared
    /// cells as a single batch, so a file larger than their queues arrives
    /// whole. Nothing is applied if the text is malformed.
    pub async fn load_csv(&self, text: &str) -> Result<usize, MalformedFileError> {
        let cells = parse_csv(text)?;
        let mut canvas = self.canvas.lock().await;
        let mut shared = Vec::with_capacity(cells.len());
        for (p, cell) in &cells {
            let op = Operation::set_cell(p.x, p.y, cell.ch, cell.style);
            canvas.store.apply(&op);
            if self.is_shared(&op) {
                shared.push(encode(&op));
            }
        }
        self.registry.broadcast_batch(shared).await;
        canvas.repaint(Damage::Full);
        tracing::info!(cells = cells.len(), "Loaded drawing");
        Ok(cells.len())
    }

    /// CSV of the drawing area.
    pub async fn save_csv(&self) -> String {
        let canvas = self.canvas.lock().await;
        to_csv(&canvas.store, self.options.header_rows)
    }

    /// True if anything is drawn below the header band.
    pub async fn has_drawing(&self) -> bool {
        let canvas = self.canvas.lock().await;
        let drawing = canvas
            .store
            .cells()
            .any(|(p, _)| p.y >= self.options.header_rows);
        drawing
    }

    /// Run `f` with the canvas locked.
    pub async fn with_canvas<R>(&self, f: impl FnOnce(&mut CanvasState) -> R) -> R {
        let mut canvas = self.canvas.lock().await;
        f(&mut canvas)
    }

    /// "Connected to" labels of all peers.
    pub async fn peers(&self) -> Vec<String> {
        self.registry.addresses().await
    }

    /// Register an accepted connection and start its tasks. The joiner
    /// receives the current drawing before any later operation.
    ///
    /// Returns `None` once the session has shut down.
    pub async fn accept(&self, stream: TcpStream, addr: SocketAddr) -> Option<ConnectionId> {
        let (tx, rx) = mpsc::channel(self.options.outbound_queue.max(1));
        let (id, snapshot) = {
            let canvas = self.canvas.lock().await;
            if self.is_shut_down() {
                return None;
            }
            let snapshot: Vec<String> = canvas
                .store
                .snapshot()
                .filter(|op| self.is_shared(op))
                .map(|op| encode(&op))
                .collect();
            (self.registry.register(addr, tx).await, snapshot)
        };
        connection::spawn(self, id, addr, stream, rx, snapshot);
        Some(id)
    }

    /// Register an outgoing connection. No snapshot is sent.
    pub async fn attach(&self, stream: TcpStream, addr: SocketAddr) -> ConnectionId {
        let (tx, rx) = mpsc::channel(self.options.outbound_queue.max(1));
        let id = self.registry.register(addr, tx).await;
        connection::spawn(self, id, addr, stream, rx, Vec::new());
        id
    }

    /// Send `exit` to every peer, close their connections and stop the
    /// accept loop and readers. Idempotent.
    ///
    /// Holds the canvas lock like [`Session::accept`], so a joiner is either
    /// registered before the peers are dropped or refused.
    pub async fn shutdown(&self) {
        {
            let _canvas = self.canvas.lock().await;
            if self.is_shut_down() {
                return;
            }
            self.registry.disconnect_all().await;
            self.shutdown.cancel();
        }
        self.tasks.close();
        tracing::info!("Session shut down");
    }

    /// Wait for every connection task to finish. Only returns after
    /// [`Session::shutdown`].
    pub async fn wait(&self) {
        self.tasks.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcanvas_canvas::HeadlessSurface;
    use termcanvas_common::{ColorRef, Region, Style};
    use tokio::net::TcpListener;

    fn session() -> Session {
        Session::new(Box::new(HeadlessSurface::new(20, 12)), SessionOptions::default())
    }

    async fn listen(session: &Session) -> mpsc::Receiver<Outbound> {
        let (tx, rx) = mpsc::channel(64);
        session
            .registry()
            .register(SocketAddr::from(([127, 0, 0, 1], 4000)), tx)
            .await;
        rx
    }

    #[tokio::test]
    async fn submit_applies_repaints_and_relays() {
        let session = session();
        let mut rx = listen(&session).await;

        session
            .submit(Operation::set_cell(5, 6, 'x', Style::fg(ColorRef::Red)))
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(Outbound::line("set:5,6,red,reset,x")));
        let (stored, shown) = session
            .with_canvas(|c| (c.store.get(5, 6).ch, c.surface.get_cell(5, 6).0))
            .await;
        assert_eq!(stored, 'x');
        assert_eq!(shown, 'x');
    }

    #[tokio::test]
    async fn header_band_edits_stay_local() {
        let session = session();
        let mut rx = listen(&session).await;

        session
            .submit(Operation::set_cell(1, 2, 'T', Style::default()))
            .await
            .unwrap();
        session
            .submit(Operation::ClearRegion {
                region: Region::new(0, 8, 5, 3),
            })
            .await
            .unwrap();
        session.submit(Operation::ClearAll).await.unwrap();

        assert_eq!(rx.recv().await, Some(Outbound::line("clear")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn save_skips_header_and_reports_drawing() {
        let session = session();
        session
            .submit(Operation::set_cell(0, 0, 'T', Style::default()))
            .await
            .unwrap();
        assert!(!session.has_drawing().await);

        session
            .submit(Operation::set_cell(3, 7, 'd', Style::fg(ColorRef::Lime)))
            .await
            .unwrap();
        assert!(session.has_drawing().await);
        assert_eq!(
            session.save_csv().await,
            "x,y,foregroundColor,backgroundColor,character\n3,7,lime,reset,d\n"
        );
    }

    #[tokio::test]
    async fn load_relays_cells_and_rejects_bad_text() {
        let session = session();
        let mut rx = listen(&session).await;

        let text = "x,y,foregroundColor,backgroundColor,character\n0,1,reset,reset,T\n2,5,red,reset,a\n3,5,red,reset,b\n";
        assert_eq!(session.load_csv(text).await.unwrap(), 3);
        let batch: Arc<[String]> = vec![
            "set:2,5,red,reset,a".to_string(),
            "set:3,5,red,reset,b".to_string(),
        ]
        .into();
        assert_eq!(rx.recv().await, Some(Outbound::Batch(batch)));

        let bad = "x,y,foregroundColor,backgroundColor,character\n2,5,red,reset,b\nzz\n";
        assert!(session.load_csv(bad).await.is_err());
        let ch = session.with_canvas(|c| c.store.get(2, 5).ch).await;
        assert_eq!(ch, 'a');
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shutdown_says_exit_and_cancels() {
        let session = session();
        let mut rx = listen(&session).await;

        session.submit(Operation::Disconnect).await.unwrap();
        assert!(session.is_shut_down());
        assert_eq!(rx.recv().await, Some(Outbound::line("exit")));
        assert_eq!(rx.recv().await, None);
        assert!(session.registry().is_empty().await);

        // Second call is a no-op.
        session.shutdown().await;
        session.wait().await;
    }

    #[tokio::test]
    async fn oversized_region_is_refused() {
        let session = Session::new(
            Box::new(HeadlessSurface::new(20, 12)),
            SessionOptions {
                max_region_cells: 100,
                ..SessionOptions::default()
            },
        );
        let mut rx = listen(&session).await;
        let region = |x2, y2| Operation::DrawRegion {
            region: Region::new(0, 4, x2, y2),
            fill: '#',
            fill_style: Style::fg(ColorRef::Olive),
            border_style: Style::default(),
            draw_borders: false,
        };

        let err = session.submit(region(65535, 65535)).await.unwrap_err();
        assert_eq!(
            err,
            ProtocolError::RegionTooLarge {
                cells: 65536 * 65532,
                limit: 100,
            }
        );
        assert!(session.with_canvas(|c| c.store.is_empty()).await);
        assert!(rx.try_recv().is_err());

        // A 10 x 10 bounding box is exactly at the limit; its 8 x 8
        // interior is filled.
        session.submit(region(9, 13)).await.unwrap();
        assert_eq!(session.with_canvas(|c| c.store.len()).await, 64);
        assert!(matches!(rx.recv().await, Some(Outbound::Line(_))));
    }

    #[tokio::test]
    async fn accept_after_shutdown_is_refused() {
        let session = session();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        session.shutdown().await;
        assert_eq!(session.accept(stream, peer).await, None);
        assert!(session.registry().is_empty().await);
        session.wait().await;
    }
}
