//! Per-connection buffering and the read/write state machine.
//!
//! A connection is registered `READABLE` until the peer half-closes.
//! `WRITABLE` is added the moment output is queued and removed once the
//! output buffer has been written out, so interest contains `WRITABLE` exactly
//! when there is something left to send.
//!
//! After the peer's EOF the connection stops reading. If responses are still
//! queued it stays registered for `WRITABLE` only and reports
//! [`ConnectionState::Closed`] once the last byte has been written.

use bytes::{Buf, BytesMut};
use mio::{event::Source, Interest, Token};
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, RawFd};
use tracing::{debug, trace};

use crate::error::{NetworkError, Result};
use crate::event::ReadyEvent;
use crate::handler::Target;
use crate::net::tcp::framing;
use crate::net::tcp::traits::{ConnectionId, RequestHandler};
use crate::poll::PollHandle;

const READ_WRITE: Interest = Interest::READABLE.add(Interest::WRITABLE);

/// Whether a connection should stay registered after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

pub struct Connection<S> {
    id: ConnectionId,
    token: Token,
    stream: S,
    interest: Interest,
    input: BytesMut,
    output: BytesMut,
    // Prefix of `input` already searched for a delimiter.
    scanned: usize,
    read_closed: bool,
    peer_addr: Option<SocketAddr>,
}

impl<S> Connection<S> {
    pub fn new(id: ConnectionId, stream: S, peer_addr: Option<SocketAddr>) -> Self {
        Self {
            id,
            token: id.token(),
            stream,
            interest: Interest::READABLE,
            input: BytesMut::new(),
            output: BytesMut::new(),
            scanned: 0,
            read_closed: false,
            peer_addr,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn interest(&self) -> Interest {
        self.interest
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// True once the peer has shut down its sending side.
    pub fn is_read_closed(&self) -> bool {
        self.read_closed
    }

    /// Bytes received but not yet framed into a request.
    pub fn pending_input(&self) -> &[u8] {
        &self.input
    }

    /// Bytes queued but not yet accepted by the socket.
    pub fn pending_output(&self) -> &[u8] {
        &self.output
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: AsRawFd> Connection<S> {
    pub fn raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

impl<S> Connection<S>
where
    S: Read + Write + Source,
{
    pub fn register(&mut self, poll: &mut PollHandle) -> Result<()> {
        poll.register(
            &mut self.stream,
            self.token,
            self.interest,
            Target::Connection(self.id),
        )
    }

    pub fn deregister(&mut self, poll: &mut PollHandle) -> Result<()> {
        poll.deregister(&mut self.stream, self.token)
    }

    /// Runs read handling if `event` is readable, then write handling if it
    /// is writable.
    pub fn handle<H>(
        &mut self,
        poll: &mut PollHandle,
        event: &ReadyEvent,
        scratch: &mut [u8],
        handler: &H,
    ) -> Result<ConnectionState>
    where
        H: RequestHandler + ?Sized,
    {
        if event.is_readable() && !self.read_closed {
            let state = self.on_readable(poll, scratch, handler)?;
            if state == ConnectionState::Closed {
                return Ok(state);
            }
        }
        if event.is_writable() {
            return self.flush(poll);
        }
        Ok(ConnectionState::Open)
    }

    /// Queues `data` for sending and makes sure write readiness is watched.
    pub fn write(&mut self, poll: &mut PollHandle, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.output.extend_from_slice(data);
        self.sync_interest(poll)
    }

    /// Writes queued output until it is gone or the socket would block.
    ///
    /// Returns [`ConnectionState::Closed`] when the peer has half-closed and
    /// nothing is left to send.
    pub fn flush(&mut self, poll: &mut PollHandle) -> Result<ConnectionState> {
        let written = self.drain_output().map_err(|source| NetworkError::Write {
            id: self.id,
            source,
        })?;
        if written > 0 {
            debug!(
                conn = self.id.as_u64(),
                len = written,
                remaining = self.output.len(),
                "wrote"
            );
        }
        if self.read_closed && self.output.is_empty() {
            return Ok(ConnectionState::Closed);
        }
        self.sync_interest(poll)?;
        Ok(ConnectionState::Open)
    }

    fn on_readable<H>(
        &mut self,
        poll: &mut PollHandle,
        scratch: &mut [u8],
        handler: &H,
    ) -> Result<ConnectionState>
    where
        H: RequestHandler + ?Sized,
    {
        // mio readiness is edge-triggered: read until the socket is empty.
        let mut peer_closed = false;
        loop {
            match self.stream.read(scratch) {
                Ok(0) => {
                    peer_closed = true;
                    break;
                }
                Ok(n) => {
                    debug!(conn = self.id.as_u64(), len = n, "read");
                    self.input.extend_from_slice(&scratch[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(NetworkError::Read { id: self.id, source }),
            }
        }

        while let Some(frame) = framing::extract_frame_from(&mut self.input, self.scanned) {
            self.scanned = 0;
            trace!(conn = self.id.as_u64(), len = frame.len(), "request framed");
            let response = handler.handle_request(&frame);
            self.write(poll, &response)?;
        }
        self.scanned = framing::resume_offset(self.input.len());

        if peer_closed {
            debug!(
                conn = self.id.as_u64(),
                unframed = self.input.len(),
                queued = self.output.len(),
                "peer closed"
            );
            self.read_closed = true;
            return self.flush(poll);
        }
        Ok(ConnectionState::Open)
    }

    fn drain_output(&mut self) -> io::Result<usize> {
        let mut written = 0;
        while !self.output.is_empty() {
            match self.stream.write(&self.output) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => {
                    self.output.advance(n);
                    written += n;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(written)
    }

    /// Brings the registered interest in line with the buffers: `READABLE`
    /// while the peer may still send, `WRITABLE` while output is queued.
    fn sync_interest(&mut self, poll: &mut PollHandle) -> Result<()> {
        let wanted = match (self.read_closed, self.output.is_empty()) {
            (false, true) => Interest::READABLE,
            (false, false) => READ_WRITE,
            (true, false) => Interest::WRITABLE,
            // About to be closed; nothing left to watch.
            (true, true) => return Ok(()),
        };
        if wanted != self.interest {
            self.set_interest(poll, wanted)?;
        }
        Ok(())
    }

    fn set_interest(&mut self, poll: &mut PollHandle, interest: Interest) -> Result<()> {
        poll.modify(&mut self.stream, self.token, interest)?;
        self.interest = interest;
        Ok(())
    }
}
