use std::{collections::HashMap, io, sync::Arc, time::Duration};

use mio::{event::Source, Events, Interest, Poll, Token, Waker};
use tracing::trace;

use crate::{
    error::{NetworkError, Result},
    handler::Target,
};

/// Reserved for the reactor's waker.
pub const WAKER_TOKEN: Token = Token(0);

/// The readiness context plus the table that says who owns each token.
pub struct PollHandle {
    poller: Poll,
    registry: HashMap<Token, Target>,
    waker: Arc<Waker>,
}

impl PollHandle {
    pub fn new() -> Result<Self> {
        let poller = Poll::new().map_err(NetworkError::Poll)?;
        let waker = Waker::new(poller.registry(), WAKER_TOKEN).map_err(NetworkError::Poll)?;
        Ok(PollHandle {
            poller,
            registry: HashMap::new(),
            waker: Arc::new(waker),
        })
    }

    /// Adds `src` to the poller and records `token -> target`.
    pub fn register<S>(
        &mut self,
        src: &mut S,
        token: Token,
        interest: Interest,
        target: Target,
    ) -> Result<()>
    where
        S: Source + ?Sized,
    {
        if token == WAKER_TOKEN || self.registry.contains_key(&token) {
            return Err(NetworkError::TokenInUse(token));
        }
        self.poller
            .registry()
            .register(src, token, interest)
            .map_err(|source| NetworkError::Register { token, source })?;
        self.registry.insert(token, target);
        trace!(?token, ?interest, ?target, "registered");
        Ok(())
    }

    /// Replaces the interest set of an already registered source.
    pub fn modify<S>(&mut self, src: &mut S, token: Token, interest: Interest) -> Result<()>
    where
        S: Source + ?Sized,
    {
        if !self.registry.contains_key(&token) {
            return Err(NetworkError::UnknownToken(token));
        }
        self.poller
            .registry()
            .reregister(src, token, interest)
            .map_err(|source| NetworkError::Modify { token, source })?;
        trace!(?token, ?interest, "modified");
        Ok(())
    }

    /// Removes `src` from the poller and forgets its target.
    pub fn deregister<S>(&mut self, src: &mut S, token: Token) -> Result<()>
    where
        S: Source + ?Sized,
    {
        if self.registry.remove(&token).is_none() {
            return Err(NetworkError::UnknownToken(token));
        }
        self.poller
            .registry()
            .deregister(src)
            .map_err(|source| NetworkError::Deregister { token, source })?;
        trace!(?token, "deregistered");
        Ok(())
    }

    pub fn target(&self, token: Token) -> Option<Target> {
        self.registry.get(&token).copied()
    }

    pub fn is_registered(&self, token: Token) -> bool {
        self.registry.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn poll(&mut self, events: &mut Events, timeout: Option<Duration>) -> io::Result<usize> {
        self.poller.poll(events, timeout)?;
        Ok(events.iter().count())
    }

    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }
}
