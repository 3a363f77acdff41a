use std::collections::HashMap;

use crate::error::{NetworkError, Result};
use crate::net::tcp::connection::Connection;
use crate::net::tcp::traits::ConnectionId;

/// Ids below this are reserved for the waker and listener tokens.
pub const FIRST_CONNECTION_ID: u64 = 2;

/// Owns every live connection, keyed by an id that is never handed out twice.
pub struct ConnectionRegistry<S> {
    connections: HashMap<ConnectionId, Connection<S>>,
    next_id: u64,
}

impl<S> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ConnectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            next_id: FIRST_CONNECTION_ID,
        }
    }

    /// Reserves the next id. Ids are not reused even if the connection they
    /// were reserved for never gets inserted.
    pub fn next_id(&mut self) -> ConnectionId {
        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, conn: Connection<S>) -> Result<()> {
        let id = conn.id();
        if self.connections.contains_key(&id) {
            return Err(NetworkError::DuplicateConnection(id));
        }
        self.connections.insert(id, conn);
        Ok(())
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection<S>> {
        self.connections.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection<S>> {
        self.connections.get_mut(&id)
    }

    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection<S>> {
        self.connections.remove(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = ConnectionRegistry::<()>::new();
        let a = registry.next_id();
        let b = registry.next_id();
        assert_eq!(a, ConnectionId::new(FIRST_CONNECTION_ID));
        assert!(b > a);
    }

    #[test]
    fn test_removed_id_is_not_reused() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.next_id();
        registry.insert(Connection::new(id, (), None)).unwrap();
        assert!(registry.remove(id).is_some());

        assert_ne!(registry.next_id(), id);
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.next_id();
        registry.insert(Connection::new(id, (), None)).unwrap();

        let err = registry.insert(Connection::new(id, (), None)).unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateConnection(dup) if dup == id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup() {
        let mut registry = ConnectionRegistry::new();
        let first = registry.next_id();
        let second = registry.next_id();
        registry.insert(Connection::new(first, (), None)).unwrap();
        registry.insert(Connection::new(second, (), None)).unwrap();

        assert_eq!(registry.get(first).map(|c| c.id()), Some(first));
        assert!(registry.get_mut(second).is_some());
        let mut ids: Vec<_> = registry.ids().collect();
        ids.sort();
        assert_eq!(ids, vec![first, second]);
    }
}
