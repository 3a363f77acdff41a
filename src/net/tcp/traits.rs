use mio::Token;
use std::net::SocketAddr;

/// The fixed reply [`CannedResponse`] sends for every request.
pub const CANNED_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 13\r\n\r\nHello world!\n";

/// Unique identifier for connections.
///
/// Assigned from a monotonic counter when a connection is accepted and never
/// reused, so it doubles as the connection's poll token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        ConnectionId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn token(&self) -> Token {
        Token(self.0 as usize)
    }
}

/// Turns one framed request into the bytes to send back.
///
/// `frame` is the complete request including its trailing `\r\n\r\n`. Runs on
/// the reactor thread, so it must not block. Any `Fn(&[u8]) -> Vec<u8>`
/// closure is a handler.
pub trait RequestHandler {
    fn handle_request(&self, frame: &[u8]) -> Vec<u8>;

    /// Called after a connection has been registered.
    fn on_connect(&self, conn_id: ConnectionId, peer_addr: Option<SocketAddr>) {
        let _ = (conn_id, peer_addr);
    }

    /// Called after a connection has been deregistered and removed.
    fn on_disconnect(&self, conn_id: ConnectionId) {
        let _ = conn_id;
    }
}

impl<F> RequestHandler for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn handle_request(&self, frame: &[u8]) -> Vec<u8> {
        self(frame)
    }
}

/// Answers every request with [`CANNED_RESPONSE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedResponse;

impl RequestHandler for CannedResponse {
    fn handle_request(&self, _frame: &[u8]) -> Vec<u8> {
        CANNED_RESPONSE.to_vec()
    }
}
