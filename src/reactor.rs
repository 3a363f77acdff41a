use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use mio::{Events, Waker};
use tracing::{debug, trace, warn};

use crate::{
    error::{NetworkError, Result},
    event::ReadyEvent,
    handler::EventHandler,
    poll::{PollHandle, WAKER_TOKEN},
};

pub const DEFAULT_EVENTS_CAPACITY: usize = 100;

/// Single-threaded readiness loop.
///
/// Each round blocks in the poller, then hands every reported event to the
/// handler together with the [`Target`](crate::handler::Target) its token
/// was registered with.
pub struct Reactor {
    poll_handle: PollHandle,
    events: Events,
    running: Arc<AtomicBool>,
}

/// Stops a running [`Reactor`] from any thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Err(e) = self.waker.wake() {
            warn!(error = %e, "failed to wake reactor for shutdown");
        }
    }
}

impl Reactor {
    pub fn new(events_capacity: usize) -> Result<Self> {
        Ok(Self {
            poll_handle: PollHandle::new()?,
            events: Events::with_capacity(events_capacity),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn poll_handle(&mut self) -> &mut PollHandle {
        &mut self.poll_handle
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
            waker: self.poll_handle.waker(),
        }
    }

    /// Runs until [`ShutdownHandle::shutdown`] is called or an error escapes
    /// a handler or the poller.
    pub fn run<H: EventHandler>(&mut self, handler: &mut H) -> Result<()> {
        while self.running.load(Ordering::SeqCst) {
            self.run_once(handler, None)?;
        }
        debug!("reactor stopped");
        Ok(())
    }

    /// One poll-and-dispatch round. Returns the number of events dispatched.
    pub fn run_once<H: EventHandler>(
        &mut self,
        handler: &mut H,
        timeout: Option<Duration>,
    ) -> Result<usize> {
        match self.poll_handle.poll(&mut self.events, timeout) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(0),
            Err(e) => return Err(NetworkError::Poll(e)),
        }

        let mut dispatched = 0;
        for event in self.events.iter() {
            let token = event.token();
            if token == WAKER_TOKEN {
                continue;
            }
            // A handler earlier in this batch may have closed the source.
            let Some(target) = self.poll_handle.target(token) else {
                trace!(?token, "skipping event for unregistered token");
                continue;
            };
            handler.handle_event(&mut self.poll_handle, target, &ReadyEvent::from(event))?;
            dispatched += 1;
        }
        Ok(dispatched)
    }
}
