//! Owns the link to the peer: non-blocking connects with a cool-down between
//! attempts, non-blocking reads split into commands, and best-effort writes.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use thiserror::Error;
use tracing::*;

use remote_mixer_api::{Codec, CodecError, JsonLines, LineBuffer, SurfaceCommand, SurfaceEvent};

pub mod mocked;


const READ_CHUNK: usize = 16 * 1024;
const MAX_READS_PER_TICK: usize = 16;
/// An unterminated line longer than this is discarded.
const MAX_PENDING_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("not connected")]
    NotConnected,
    #[error("could not encode message: {0}")]
    Encode(#[from] CodecError),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("peer closed the connection")]
    PeerClosed,
}

/// Progress of a connect started with [`Transport::begin`].
#[derive(Debug)]
pub enum Handshake<P, S> {
    Pending(P),
    Established(S),
}

/// Opens byte streams to the peer without blocking the caller.
pub trait Transport {
    type Stream: Read + Write;
    type Pending;

    /// Starts connecting. Must return immediately.
    fn begin(&mut self, peer: SocketAddr) -> io::Result<Self::Pending>;

    /// Checks on a connect started by [`Transport::begin`]. Established
    /// streams must report [`ErrorKind::WouldBlock`] instead of waiting for
    /// data.
    fn finish(&mut self, pending: Self::Pending) -> io::Result<Handshake<Self::Pending, Self::Stream>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl Transport for TcpTransport {
    type Stream = TcpStream;
    type Pending = Socket;

    fn begin(&mut self, peer: SocketAddr) -> io::Result<Socket> {
        let socket = Socket::new(Domain::for_address(peer), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;

        match socket.connect(&SockAddr::from(peer)) {
            Ok(()) => Ok(socket),
            Err(err) if connect_in_progress(&err) => Ok(socket),
            Err(err) => Err(err),
        }
    }

    fn finish(&mut self, socket: Socket) -> io::Result<Handshake<Socket, TcpStream>> {
        if let Some(err) = socket.take_error()? {
            return Err(err);
        }

        match socket.peer_addr() {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotConnected => return Ok(Handshake::Pending(socket)),
            Err(err) => return Err(err),
        }

        let stream = TcpStream::from(socket);
        stream.set_nodelay(true)?;

        Ok(Handshake::Established(stream))
    }
}

#[cfg(unix)]
fn connect_in_progress(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EINPROGRESS) || err.kind() == ErrorKind::WouldBlock
}

#[cfg(not(unix))]
fn connect_in_progress(err: &io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct ConnectionManager<T: Transport> {
    transport:       T,
    peer:            SocketAddr,
    connect_timeout: Duration,
    cooldown:        Duration,
    state:           ConnectionState,
    pending:         Option<T::Pending>,
    stream:          Option<T::Stream>,
    last_attempt:    Option<Instant>,
    codec:           JsonLines,
    inbound:         LineBuffer,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, peer: SocketAddr, connect_timeout: Duration, cooldown: Duration) -> Self {
        Self { transport,
               peer,
               connect_timeout,
               cooldown,
               state: ConnectionState::Disconnected,
               pending: None,
               stream: None,
               last_attempt: None,
               codec: JsonLines,
               inbound: LineBuffer::default() }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Starts a connect when disconnected and the cool-down since the
    /// previous attempt has passed, then checks on the handshake in flight.
    /// Returns true only when this call established the link.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.stream.is_some() {
            return false;
        }

        if self.pending.is_none() {
            if let Some(last) = self.last_attempt {
                if now.saturating_duration_since(last) < self.cooldown {
                    return false;
                }
            }

            self.last_attempt = Some(now);

            match self.transport.begin(self.peer) {
                Ok(pending) => {
                    self.pending = Some(pending);
                    self.set_state(ConnectionState::Connecting);
                }
                Err(err) => {
                    debug!(%err, peer = %self.peer, "connect failed");
                    return false;
                }
            }
        }

        self.poll_handshake(now)
    }

    fn poll_handshake(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        match self.transport.finish(pending) {
            Ok(Handshake::Established(stream)) => {
                self.stream = Some(stream);
                self.inbound.clear();
                self.set_state(ConnectionState::Connected);
                true
            }
            Ok(Handshake::Pending(pending)) => {
                let waited = self.last_attempt
                                 .map(|started| now.saturating_duration_since(started))
                                 .unwrap_or_default();

                if waited < self.connect_timeout {
                    self.pending = Some(pending);
                } else {
                    debug!(peer = %self.peer, ?waited, "connect timed out");
                    self.set_state(ConnectionState::Disconnected);
                }
                false
            }
            Err(err) => {
                debug!(%err, peer = %self.peer, "connect failed");
                self.set_state(ConnectionState::Disconnected);
                false
            }
        }
    }

    /// Drains whatever the peer has sent so far and returns the complete
    /// commands in arrival order. Malformed lines are logged and dropped.
    /// A closed or failed stream disconnects after its buffered lines are
    /// returned.
    pub fn receive(&mut self) -> Vec<SurfaceCommand> {
        let Some(stream) = self.stream.as_mut() else {
            return vec![];
        };

        let mut chunk = [0_u8; READ_CHUNK];
        let mut broken = None;

        for _ in 0..MAX_READS_PER_TICK {
            match stream.read(&mut chunk) {
                Ok(0) => {
                    broken = Some(ConnectionError::PeerClosed);
                    break;
                }
                Ok(read) => self.inbound.extend(&chunk[..read]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    broken = Some(ConnectionError::Read(err));
                    break;
                }
            }
        }

        let commands = self.inbound
                           .take_lines()
                           .into_iter()
                           .filter_map(|line| match self.codec.decode::<SurfaceCommand>(&line) {
                               Ok(command) => Some(command),
                               Err(err) => {
                                   warn!(%err, line = %String::from_utf8_lossy(&line), "dropping malformed line");
                                   None
                               }
                           })
                           .collect();

        if self.inbound.pending_len() > MAX_PENDING_BYTES {
            warn!(bytes = self.inbound.pending_len(), "discarding oversized unterminated line");
            self.inbound.clear();
        }

        if let Some(reason) = broken {
            info!(%reason, "link lost");
            self.disconnect();
        }

        commands
    }

    /// Writes one message. Any failure to write tears the link down; nothing
    /// is queued for retry.
    pub fn send(&mut self, event: &SurfaceEvent) -> Result<(), ConnectionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectionError::NotConnected);
        };

        let bytes = self.codec.encode(event)?;

        if let Err(err) = stream.write_all(&bytes).and_then(|_| stream.flush()) {
            warn!(%err, kind = event.kind(), "write failed, dropping connection");
            self.disconnect();
            return Err(ConnectionError::Write(err));
        }

        trace!(kind = event.kind(), bytes = bytes.len(), "sent");
        Ok(())
    }

    pub fn disconnect(&mut self) {
        let was_connecting = self.pending.take().is_some();
        if self.stream.take().is_some() || was_connecting {
            self.inbound.clear();
            self.set_state(ConnectionState::Disconnected);
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            match state {
                ConnectionState::Connected => info!(peer = %self.peer, "connected"),
                ConnectionState::Disconnected if self.state == ConnectionState::Connected => {
                    info!(peer = %self.peer, "disconnected")
                }
                _ => trace!(?state, peer = %self.peer, "connection state"),
            }
            self.state = state;
        }
    }
}
