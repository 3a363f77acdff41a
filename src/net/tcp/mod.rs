//! TCP listener and connections driven by the single-threaded reactor.
//!
//! Each accepted connection gets a [`ConnectionId`] from a monotonic counter.
//! The id is also its poll token, and the reactor maps that token to
//! [`Target::Connection`](crate::handler::Target::Connection). The connection
//! itself lives in the listener's [`ConnectionRegistry`].
//!
//! ```text
//! Connection Storage:
//!   ConnectionRegistry (HashMap<ConnectionId, Connection>)
//!        │
//!        ├──> ConnId(2) ──> Connection { stream, interest, input, output }
//!        ├──> ConnId(3) ──> Connection { stream, interest, input, output }
//!        └──> ConnId(N) ──> Connection { stream, interest, input, output }
//! ```
//!
//! ## Event Handling Pipeline
//!
//! ```text
//! 1. Listener Events:
//!    Readable ──> Listener::accept_pending()
//!        - accept() until WouldBlock
//!        - Assign ConnectionId
//!        - Register the stream with the reactor (READABLE)
//!        - Insert into ConnectionRegistry
//!        - handler.on_connect()
//!
//! 2. Connection Events:
//!    Readable ──> Connection::handle()
//!        - Read until WouldBlock into the input buffer
//!        - Split off every "\r\n\r\n"-terminated frame
//!        - handler.handle_request(frame) ──> Connection::write()
//!          (adds WRITABLE interest if it was not set)
//!        - If EOF: stop reading; close now if nothing is queued,
//!          otherwise keep only WRITABLE interest
//!
//!    Writable ──> Connection::flush()
//!        - Write until WouldBlock or the output buffer is empty
//!        - Empty: drop WRITABLE interest, or close after EOF
//!
//! 3. Close:
//!    Listener::close_connection()
//!        - Deregister from the reactor
//!        - Remove from ConnectionRegistry
//!        - Drop the stream (closes the socket)
//!        - handler.on_disconnect()
//! ```
//!
//! ## Handler Implementation
//!
//! ```rust
//! use mill_reactor::net::tcp::traits::RequestHandler;
//!
//! struct Upper;
//!
//! impl RequestHandler for Upper {
//!     fn handle_request(&self, frame: &[u8]) -> Vec<u8> {
//!         frame.to_ascii_uppercase()
//!     }
//! }
//! ```

pub mod config;
pub mod connection;
pub mod framing;
pub mod listener;
pub mod registry;
pub mod socket;
pub mod traits;

pub use config::{TcpServerConfig, TcpServerConfigBuilder};
pub use connection::{Connection, ConnectionState};
pub use listener::{Listener, LISTENER_TOKEN};
pub use registry::ConnectionRegistry;
pub use traits::{CannedResponse, ConnectionId, RequestHandler, CANNED_RESPONSE};
