//! Scripted in-memory transport for exercising the surface without sockets.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddr;
use std::rc::Rc;

use remote_mixer_api::{Codec, JsonLines, LineBuffer, SurfaceEvent};

use crate::connection::{Handshake, Transport};

#[derive(Debug, Default)]
struct Pipe {
    inbound:     VecDeque<Vec<u8>>,
    outbound:    Vec<u8>,
    peer_closed: bool,
    fail_writes: bool,
}

/// One end of an in-memory connection. Clones share the same buffers, so a
/// test keeps a handle while the surface owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockedStream {
    pipe: Rc<RefCell<Pipe>>,
}

impl MockedStream {
    /// Queues bytes as a single read.
    pub fn push_inbound(&self, bytes: impl AsRef<[u8]>) {
        self.pipe.borrow_mut().inbound.push_back(bytes.as_ref().to_vec());
    }

    /// Reads return end-of-stream once the queued bytes are consumed.
    pub fn close(&self) {
        self.pipe.borrow_mut().peer_closed = true;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.pipe.borrow_mut().fail_writes = fail;
    }

    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut self.pipe.borrow_mut().outbound)
    }

    /// Drains and decodes everything written so far.
    pub fn sent_events(&self) -> Vec<SurfaceEvent> {
        let mut lines = LineBuffer::default();
        lines.extend(&self.take_outbound());

        lines.take_lines()
             .into_iter()
             .filter_map(|line| JsonLines.decode(&line).ok())
             .collect()
    }
}

impl Read for MockedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut pipe = self.pipe.borrow_mut();

        let Some(mut chunk) = pipe.inbound.pop_front() else {
            return if pipe.peer_closed {
                Ok(0)
            } else {
                Err(ErrorKind::WouldBlock.into())
            };
        };

        let read = chunk.len().min(buf.len());
        buf[..read].copy_from_slice(&chunk[..read]);
        if read < chunk.len() {
            pipe.inbound.push_front(chunk.split_off(read));
        }

        Ok(read)
    }
}

impl Write for MockedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut pipe = self.pipe.borrow_mut();
        if pipe.fail_writes {
            return Err(ErrorKind::BrokenPipe.into());
        }

        pipe.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A connect in flight; it completes after `polls_left` more checks.
#[derive(Debug)]
pub struct MockedHandshake {
    polls_left: usize,
    stream:     MockedStream,
}

/// Connect attempts consume scripted outcomes in order; with nothing
/// scripted, the connection is refused.
#[derive(Debug, Clone, Default)]
pub struct MockedTransport {
    outcomes: Rc<RefCell<VecDeque<Option<MockedHandshake>>>>,
    attempts: Rc<Cell<usize>>,
}

impl MockedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a connect that completes on the first check and returns the
    /// peer's view of the stream.
    pub fn accept(&self) -> MockedStream {
        self.accept_after(0)
    }

    /// Scripts a connect that stays in flight for `polls` checks.
    pub fn accept_after(&self, polls: usize) -> MockedStream {
        let stream = MockedStream::default();
        self.outcomes.borrow_mut().push_back(Some(MockedHandshake { polls_left: polls,
                                                                    stream:     stream.clone(), }));
        stream
    }

    /// Scripts a connect that never completes.
    pub fn stall(&self) {
        self.accept_after(usize::MAX);
    }

    pub fn refuse(&self) {
        self.outcomes.borrow_mut().push_back(None);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl Transport for MockedTransport {
    type Stream = MockedStream;
    type Pending = MockedHandshake;

    fn begin(&mut self, _peer: SocketAddr) -> io::Result<MockedHandshake> {
        self.attempts.set(self.attempts.get() + 1);

        self.outcomes
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or_else(|| ErrorKind::ConnectionRefused.into())
    }

    fn finish(&mut self, mut pending: MockedHandshake) -> io::Result<Handshake<MockedHandshake, MockedStream>> {
        if pending.polls_left == 0 {
            return Ok(Handshake::Established(pending.stream));
        }

        pending.polls_left -= 1;
        Ok(Handshake::Pending(pending))
    }
}
