use crate::error::Result;
use crate::event::ReadyEvent;
use crate::net::tcp::traits::ConnectionId;
use crate::poll::PollHandle;

/// What a registered token dispatches to.
///
/// The reactor stores one of these per registered source instead of a
/// reference to the owner, so a token can outlive its connection without
/// dangling: the owner looks the id up and finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Listener,
    Connection(ConnectionId),
}

/// Receives every readiness event the reactor observes.
///
/// Called synchronously on the reactor thread, one event at a time, in the
/// order the OS reported them. Implementations must not block. Returning an
/// error stops the reactor.
pub trait EventHandler {
    fn handle_event(
        &mut self,
        poll: &mut PollHandle,
        target: Target,
        event: &ReadyEvent,
    ) -> Result<()>;
}
