//! Per-connection tasks: a reader that applies and relays decoded lines, and
//! a writer that drains the outbound queue.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use termcanvas_common::ConnectionId;
use termcanvas_protocol::{decode, Operation};

use crate::registry::Outbound;
use crate::session::Session;

type LineStream = FramedRead<OwnedReadHalf, LinesCodec>;
type LineSink = FramedWrite<OwnedWriteHalf, LinesCodec>;

/// Start the reader and writer tasks of a registered connection.
/// `snapshot` is written before anything queued.
pub(crate) fn spawn(
    session: &Session,
    id: ConnectionId,
    addr: SocketAddr,
    stream: TcpStream,
    rx: mpsc::Receiver<Outbound>,
    snapshot: Vec<String>,
) {
    let (reader, writer) = stream.into_split();
    let lines = FramedRead::new(
        reader,
        LinesCodec::new_with_max_length(session.options().max_line_length),
    );
    let sink = FramedWrite::new(writer, LinesCodec::new());

    tracing::info!(peer = %addr, connection = %id, "Peer connected");
    session.tasks().spawn(write_loop(id, addr, sink, rx, snapshot));
    session.tasks().spawn(read_loop(session.clone(), id, addr, lines));
}

async fn read_loop(session: Session, id: ConnectionId, addr: SocketAddr, mut lines: LineStream) {
    let shutdown = session.shutdown_token();

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = lines.next() => next,
        };

        let line = match next {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                tracing::warn!(peer = %addr, connection = %id, error = %e, "Read failed");
                break;
            }
            None => {
                tracing::debug!(peer = %addr, connection = %id, "Peer closed the connection");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match decode(&line) {
            Ok(Operation::Disconnect) => {
                tracing::debug!(peer = %addr, connection = %id, "Peer said exit");
                break;
            }
            Ok(op) => {
                if let Err(e) = session.apply_remote(id, &op, &line).await {
                    tracing::warn!(peer = %addr, connection = %id, error = %e, "Rejected line, closing connection");
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(peer = %addr, connection = %id, error = %e, "Malformed line, closing connection");
                break;
            }
        }
    }

    // Dropping the registry's sender lets the writer flush and close.
    session.registry().unregister(id).await;
    tracing::info!(peer = %addr, connection = %id, "Peer disconnected");
}

async fn write_loop(
    id: ConnectionId,
    addr: SocketAddr,
    mut sink: LineSink,
    mut rx: mpsc::Receiver<Outbound>,
    snapshot: Vec<String>,
) {
    if !snapshot.is_empty() {
        tracing::debug!(connection = %id, lines = snapshot.len(), "Sending canvas snapshot");
        if let Err(e) = write_batch(&mut sink, snapshot).await {
            tracing::warn!(peer = %addr, connection = %id, error = %e, "Snapshot write failed");
            return;
        }
    }

    while let Some(item) = rx.recv().await {
        let written = match item {
            Outbound::Line(line) => sink.send(line).await,
            Outbound::Batch(lines) => write_batch(&mut sink, lines.iter().cloned()).await,
        };
        if let Err(e) = written {
            tracing::warn!(peer = %addr, connection = %id, error = %e, "Write failed");
            return;
        }
    }

    if let Err(e) = SinkExt::<String>::close(&mut sink).await {
        tracing::debug!(peer = %addr, connection = %id, error = %e, "Close failed");
    }
}

/// Feed every line, then flush once.
async fn write_batch(
    sink: &mut LineSink,
    lines: impl IntoIterator<Item = String>,
) -> Result<(), LinesCodecError> {
    for line in lines {
        sink.feed(line).await?;
    }
    SinkExt::<String>::flush(sink).await
}
