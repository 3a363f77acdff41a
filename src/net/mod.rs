//! Networking on top of the reactor.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      User Application                       │
//! │  ┌──────────────┐          ┌─────────────────┐              │
//! │  │ Listener     │────────▶│ Your Handler    │              │
//! │  │ (owns conns) │          │ (RequestHandler)│              │
//! │  └──────────────┘          └─────────────────┘              │
//! └────────────┬──────────────────────┬─────────────────────────┘
//!              │                      │ Callbacks
//!              │ Register             │ (handle_request, on_connect, ...)
//!              ▼                      │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Reactor                            │
//! │  ┌──────────┐       ┌────────────────────────┐              │
//! │  │ Poll     │─────▶│ Token ──▶ Target table │              │
//! │  └──────────┘       └────────────────────────┘              │
//! └────────────┬────────────────────────────────────────────────┘
//!              │ OS Events
//!              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Operating System (epoll/kqueue)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the thread that calls [`Reactor::run`](crate::reactor::Reactor::run).
//! Handlers are invoked inline, one event at a time, and must not block.
//!
//! # Example
//!
//! ```rust,no_run
//! use mill_reactor::net::tcp::{CannedResponse, Listener, TcpServerConfig};
//! use mill_reactor::{error::Result, reactor::Reactor};
//!
//! # fn main() -> Result<()> {
//! let config = TcpServerConfig::builder().port(8080).build();
//! let mut reactor = Reactor::new(config.events_capacity)?;
//! let mut listener = Listener::bind(config, CannedResponse)?;
//!
//! listener.register(reactor.poll_handle())?;
//! reactor.run(&mut listener)?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod tcp;
