//! # Mill-Reactor
//! A single-threaded, readiness-based TCP server core built on [`mio`].
//!
//! One thread blocks in the OS poller, and every readiness event is dispatched
//! synchronously to the component that owns the source: the [`Listener`]
//! accepts, each [`Connection`] reads, frames and writes.
//! Nothing blocks inside a handler; would-block results simply wait for the
//! next readiness edge.
//!
//! ## Features
//! - **Explicit dispatch table**: tokens map to a closed [`Target`] enum, never to raw references
//! - **Buffered connections**: per-connection input/output buffers with lazy write interest
//! - **Delimiter framing**: requests end at `\r\n\r\n`
//! - **Injectable protocol**: any [`RequestHandler`] turns a frame into a response
//! - **Typed errors**: connection-scoped failures close one connection, the rest stop the loop
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │ Reactor     │───▶│  PollHandle  │───▶│  mio::Poll  │
//! └─────────────┘    └──────────────┘    └─────────────┘
//!        │                   │
//!        │            Token ──▶ Target
//!        ▼
//! ┌──────────────┐    ┌────────────────────┐    ┌────────────┐
//! │ Listener     │───▶│ ConnectionRegistry │───▶│ Connection │
//! └──────────────┘    └────────────────────┘    └────────────┘
//! ```
//! ## Quick Start
//!
//! ```rust,no_run
//! use mill_reactor::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TcpServerConfig::builder().port(8080).build();
//!     let mut reactor = Reactor::new(config.events_capacity)?;
//!
//!     // Respond to every request with its own bytes.
//!     let mut listener = Listener::bind(config, |frame: &[u8]| frame.to_vec())?;
//!     listener.register(reactor.poll_handle())?;
//!
//!     // Blocks until a ShutdownHandle stops it.
//!     reactor.run(&mut listener)?;
//!     Ok(())
//! }
//! ```
//!
//! - [`reactor`]: the poll-and-dispatch loop and its shutdown handle
//! - [`poll`]: the poller plus the token to target table
//! - [`handler`]: dispatch targets and the [`EventHandler`] trait
//! - [`net`]: listener, connections, framing and configuration
//! - [`error`]: error types and result handling

pub mod error;
pub mod event;
pub mod handler;
pub mod net;
pub mod poll;
pub mod reactor;

pub use event::ReadyEvent;
pub use handler::{EventHandler, Target};
pub use net::tcp::{Connection, Listener, RequestHandler};

/// Commonly used types.
///
/// ```rust
/// use mill_reactor::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::NetworkError;
    pub use crate::handler::{EventHandler, Target};
    pub use crate::net::tcp::{
        CannedResponse, ConnectionId, Listener, RequestHandler, TcpServerConfig,
    };
    pub use crate::reactor::{Reactor, ShutdownHandle};
}
