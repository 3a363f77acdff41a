use mio::{event::Event, Token};
use std::fmt;

/// Readiness flags for one source, detached from `mio::event::Event` so that
/// handlers can be driven without a live poller.
///
/// Error and hang-up conditions are folded into the flags: an errored source
/// is reported readable and writable, a read-closed source readable. The
/// following I/O call then surfaces the actual condition.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    token: Token,
    is_readable: bool,
    is_writable: bool,
}

impl fmt::Debug for ReadyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyEvent")
            .field("token", &self.token)
            .field("is_readable", &self.is_readable)
            .field("is_writable", &self.is_writable)
            .finish()
    }
}

impl ReadyEvent {
    pub fn new(token: Token, is_readable: bool, is_writable: bool) -> Self {
        Self {
            token,
            is_readable,
            is_writable,
        }
    }

    pub fn readable(token: Token) -> Self {
        Self::new(token, true, false)
    }

    pub fn writable(token: Token) -> Self {
        Self::new(token, false, true)
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn is_readable(&self) -> bool {
        self.is_readable
    }

    pub fn is_writable(&self) -> bool {
        self.is_writable
    }
}

impl From<&Event> for ReadyEvent {
    fn from(event: &Event) -> Self {
        Self {
            token: event.token(),
            is_readable: event.is_readable() || event.is_read_closed() || event.is_error(),
            is_writable: event.is_writable() || event.is_error(),
        }
    }
}
