use std::io;
use std::net::SocketAddr;

use mio::net::{TcpListener, TcpStream};
use mio::{Interest, Token};
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::event::ReadyEvent;
use crate::handler::{EventHandler, Target};
use crate::net::tcp::config::TcpServerConfig;
use crate::net::tcp::connection::{Connection, ConnectionState};
use crate::net::tcp::registry::ConnectionRegistry;
use crate::net::tcp::socket;
use crate::net::tcp::traits::{ConnectionId, RequestHandler};
use crate::poll::PollHandle;

pub const LISTENER_TOKEN: Token = Token(1);

/// Owns the listening socket and every connection accepted from it.
pub struct Listener<H> {
    listener: TcpListener,
    connections: ConnectionRegistry<TcpStream>,
    handler: H,
    config: TcpServerConfig,
    scratch: Vec<u8>,
    // Set when accepting stopped for lack of descriptors or memory.
    accept_paused: bool,
}

/// Errors from `accept` that will repeat until some resource is freed.
fn is_resource_exhaustion(e: &io::Error) -> bool {
    e.raw_os_error().is_some_and(|code| {
        matches!(
            Errno::from_raw(code),
            Errno::EMFILE | Errno::ENFILE | Errno::ENOBUFS | Errno::ENOMEM
        )
    })
}

impl<H: RequestHandler> Listener<H> {
    /// Binds the wildcard address on `config.port`.
    pub fn bind(config: TcpServerConfig, handler: H) -> Result<Self> {
        let listener = socket::bind_wildcard(config.port, config.backlog)?;
        Ok(Self::new(listener, config, handler))
    }

    pub fn new(listener: TcpListener, config: TcpServerConfig, handler: H) -> Self {
        Self {
            listener,
            connections: ConnectionRegistry::new(),
            handler,
            scratch: vec![0; config.buffer_size],
            config,
            accept_paused: false,
        }
    }

    /// Ignores `SIGPIPE` process-wide and starts watching for connections.
    pub fn register(&mut self, poll: &mut PollHandle) -> Result<()> {
        // Writing to a reset peer must come back as EPIPE, not kill us.
        unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigIgn) }?;
        poll.register(
            &mut self.listener,
            LISTENER_TOKEN,
            Interest::READABLE,
            Target::Listener,
        )
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connections(&self) -> &ConnectionRegistry<TcpStream> {
        &self.connections
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// True while pending connections are left in the backlog because the
    /// process ran out of descriptors or memory.
    pub fn is_accept_paused(&self) -> bool {
        self.accept_paused
    }

    /// Accepts every pending connection. Returns how many were added.
    ///
    /// A failed accept is logged and skipped. When the failure is resource
    /// exhaustion (`EMFILE`, `ENFILE`, `ENOBUFS`, `ENOMEM`) the round ends
    /// instead, and accepting resumes once a connection is closed or a new
    /// one arrives.
    pub fn accept_pending(&mut self, poll: &mut PollHandle) -> Result<usize> {
        self.accept_paused = false;
        let mut accepted = 0;
        loop {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    self.add_connection(poll, stream)?;
                    accepted += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_resource_exhaustion(&e) => {
                    warn!(error = %e, live = self.connections.len(), "pausing accept");
                    self.accept_paused = true;
                    break;
                }
                Err(e) => {
                    // One bad accept is not worth stopping the server for.
                    error!(error = %e, "accept failed");
                }
            }
        }
        Ok(accepted)
    }

    /// Deregisters the connection, drops it from the registry and closes its
    /// socket, in that order.
    pub fn close_connection(&mut self, poll: &mut PollHandle, id: ConnectionId) -> Result<()> {
        let Some(mut conn) = self.connections.remove(id) else {
            return Ok(());
        };
        conn.deregister(poll)?;
        info!(conn = id.as_u64(), fd = conn.raw_fd(), "closing connection");
        drop(conn);
        self.handler.on_disconnect(id);

        if self.accept_paused {
            // Re-arming reports the backlog again now that a descriptor is free.
            self.accept_paused = false;
            poll.modify(&mut self.listener, LISTENER_TOKEN, Interest::READABLE)?;
            debug!("accept resumed");
        }
        Ok(())
    }

    fn add_connection(&mut self, poll: &mut PollHandle, stream: TcpStream) -> Result<()> {
        let peer_addr = match stream.peer_addr() {
            Ok(addr) => {
                info!(peer = %addr, "accepted new client");
                Some(addr)
            }
            Err(e) => {
                info!(error = %e, "accepted new client with unknown address");
                None
            }
        };
        if self.config.no_delay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!(error = %e, "failed to set TCP_NODELAY");
            }
        }

        let id = self.connections.next_id();
        let mut conn = Connection::new(id, stream, peer_addr);
        conn.register(poll)?;
        self.connections.insert(conn)?;
        self.handler.on_connect(id, peer_addr);
        Ok(())
    }

    fn handle_connection(
        &mut self,
        poll: &mut PollHandle,
        id: ConnectionId,
        event: &ReadyEvent,
    ) -> Result<()> {
        let Some(conn) = self.connections.get_mut(id) else {
            warn!(conn = id.as_u64(), "event for unknown connection");
            return Ok(());
        };
        match conn.handle(poll, event, &mut self.scratch, &self.handler) {
            Ok(ConnectionState::Open) => Ok(()),
            Ok(ConnectionState::Closed) => self.close_connection(poll, id),
            Err(e) if e.is_connection_scoped() => {
                error!(conn = id.as_u64(), error = %e, "dropping connection");
                self.close_connection(poll, id)
            }
            Err(e) => Err(e),
        }
    }
}

impl<H: RequestHandler> EventHandler for Listener<H> {
    fn handle_event(
        &mut self,
        poll: &mut PollHandle,
        target: Target,
        event: &ReadyEvent,
    ) -> Result<()> {
        match target {
            Target::Listener => {
                if !event.is_readable() {
                    return Ok(());
                }
                let accepted = self.accept_pending(poll)?;
                debug!(accepted, live = self.connections.len(), "accept round done");
                Ok(())
            }
            Target::Connection(id) => self.handle_connection(poll, id, event),
        }
    }
}
