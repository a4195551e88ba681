use crate::config::HubConfig;
use crate::coordinator::Command;
use crate::error::{Error, HubErrorKind};
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::*;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError, UnboundedSender};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A transport-neutral WebSocket frame. Pumps only ever see these; the axum
/// adapter in `transport` converts to and from the real socket messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Lifecycle of a single connection: `Connecting → Registered → Closing → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ConnectionState {
    /// Wrapped, but not yet visible to the hub.
    Connecting = 0,
    /// Present in the hub's connection set with both pumps running.
    Registered = 1,
    /// Unregistration started from either direction; enqueues are rejected.
    Closing = 2,
    /// Transport released. Terminal.
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Registered,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// State shared by the coordinator's handle and the two pumps of one connection.
/// The state only ever moves forward.
#[derive(Debug)]
struct Lifecycle {
    state: AtomicU8,
    closing: CancellationToken,
}

impl Lifecycle {
    fn new(closing: CancellationToken) -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            closing,
        }
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn mark_registered(&self) -> bool {
        self.state
            .compare_exchange(
                ConnectionState::Connecting as u8,
                ConnectionState::Registered as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Moves to `Closing` and wakes both pumps. Returns `true` only for the caller
    /// that actually initiated the close; every later call is a no-op.
    fn close(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current >= ConnectionState::Closing as u8 {
                self.closing.cancel();
                return false;
            }
            match self.state.compare_exchange(
                current,
                ConnectionState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.closing.cancel();
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn mark_closed(&self) {
        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
    }

    fn is_closing(&self) -> bool {
        self.state() >= ConnectionState::Closing || self.closing.is_cancelled()
    }
}

/// The coordinator's view of a connection: its id, the producer side of its
/// outbound queue and its lifecycle.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Arc<str>>,
    lifecycle: Arc<Lifecycle>,
}

impl ConnectionHandle {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    /// Non-blocking enqueue onto the outbound queue.
    pub fn try_enqueue(&self, frame: Arc<str>) -> Result<(), Error> {
        if self.lifecycle.is_closing() {
            return Err(Error::new(HubErrorKind::Closed));
        }

        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => Error::new(HubErrorKind::QueueFull),
            TrySendError::Closed(_) => Error::new(HubErrorKind::Closed),
        })
    }

    /// Starts closing the connection. Idempotent.
    pub fn close(&self) -> bool {
        self.lifecycle.close()
    }

    pub(crate) fn mark_registered(&self) -> bool {
        self.lifecycle.mark_registered()
    }

    pub(crate) fn same_connection(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.lifecycle, &other.lifecycle)
    }
}

/// A connection that has been wrapped but whose pumps have not started yet.
pub struct Connection {
    handle: ConnectionHandle,
    outbound: mpsc::Receiver<Arc<str>>,
}

impl Connection {
    pub fn new(id: ConnectionId, capacity: usize, closing: CancellationToken) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        Self {
            handle: ConnectionHandle {
                id,
                outbound: sender,
                lifecycle: Arc::new(Lifecycle::new(closing)),
            },
            outbound: receiver,
        }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub(crate) fn into_parts(self) -> (ConnectionHandle, mpsc::Receiver<Arc<str>>) {
        (self.handle, self.outbound)
    }

    /// Starts the reader and writer pumps on the hub's task tracker.
    pub(crate) fn spawn<S, R, E>(
        self,
        sink: S,
        stream: R,
        config: &HubConfig,
        commands: &UnboundedSender<Command>,
        tasks: &TaskTracker,
    ) where
        S: Sink<Frame> + Unpin + Send + 'static,
        S::Error: fmt::Display + Send,
        R: Stream<Item = Result<Frame, E>> + Unpin + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (handle, outbound) = self.into_parts();

        tasks.spawn(write_pump(
            handle.clone(),
            outbound,
            sink,
            config.clone(),
            commands.clone(),
        ));
        tasks.spawn(read_pump(handle, stream, config.clone(), commands.clone()));
    }
}

/// Drains the outbound queue onto the transport and keeps the client alive with
/// pings. Owns the sink, so this is the only place the transport gets closed.
async fn write_pump<S>(
    handle: ConnectionHandle,
    mut outbound: mpsc::Receiver<Arc<str>>,
    mut sink: S,
    config: HubConfig,
    commands: UnboundedSender<Command>,
) where
    S: Sink<Frame> + Unpin,
    S::Error: fmt::Display,
{
    let id = handle.id().clone();
    let closing = handle.lifecycle.closing.clone();

    let mut keepalive = time::interval_at(
        Instant::now() + config.ping_interval,
        config.ping_interval,
    );
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let failure = loop {
        let frame = tokio::select! {
            biased;
            _ = closing.cancelled() => break None,
            next = outbound.recv() => match next {
                Some(text) => Frame::Text(text.to_string()),
                None => break None,
            },
            _ = keepalive.tick() => Frame::Ping(Vec::new()),
        };

        match write_frame(&mut sink, frame, config.write_timeout, &closing).await {
            Ok(()) => {}
            Err(e) if e.error_kind == HubErrorKind::Closed => break None,
            Err(e) => break Some(e),
        }
    };

    match failure {
        Some(e) => {
            warn!("Write to connection {id} failed, disconnecting: {e}");
            if handle.close() {
                let _ = commands.send(Command::Unregister(id.clone()));
            }
        }
        None => {
            handle.close();
        }
    }

    // Best effort: the peer may already be gone.
    let _ = time::timeout(config.write_timeout, async {
        let _ = sink.send(Frame::Close).await;
        let _ = sink.close().await;
    })
    .await;

    handle.lifecycle.mark_closed();
    debug!("Connection {id} closed");
}

async fn write_frame<S>(
    sink: &mut S,
    frame: Frame,
    deadline: Duration,
    closing: &CancellationToken,
) -> Result<(), Error>
where
    S: Sink<Frame> + Unpin,
    S::Error: fmt::Display,
{
    tokio::select! {
        biased;
        _ = closing.cancelled() => Err(Error::new(HubErrorKind::Closed)),
        result = time::timeout(deadline, sink.send(frame)) => match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::transport(e)),
            Err(_) => Err(Error::transport(format!("write deadline of {deadline:?} elapsed"))),
        },
    }
}

/// Watches the transport for client close, read errors and idleness.
async fn read_pump<R, E>(
    handle: ConnectionHandle,
    mut stream: R,
    config: HubConfig,
    commands: UnboundedSender<Command>,
) where
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: fmt::Display,
{
    let id = handle.id().clone();
    let closing = handle.lifecycle.closing.clone();

    loop {
        let next = tokio::select! {
            biased;
            // Closed from the hub side, the writer takes care of the transport.
            _ = closing.cancelled() => return,
            next = time::timeout(config.keepalive_timeout, stream.next()) => next,
        };

        match next {
            Ok(Some(Ok(Frame::Close))) => {
                debug!("Client closed connection {id}");
                break;
            }
            Ok(Some(Ok(frame))) => {
                trace!("Activity on connection {id}: {frame:?}");
            }
            Ok(Some(Err(e))) => {
                debug!("Read from connection {id} failed: {e}");
                break;
            }
            Ok(None) => {
                debug!("Connection {id} stream ended");
                break;
            }
            Err(_) => {
                info!(
                    "Connection {id} idle for longer than {:?}, disconnecting",
                    config.keepalive_timeout
                );
                break;
            }
        }
    }

    if handle.close() {
        let _ = commands.send(Command::Unregister(id));
    }
}
