use crate::net::tcp::traits::ConnectionId;
use mio::Token;
use std::io;
use thiserror::Error;

/// Everything that can go wrong inside the reactor and the TCP server.
///
/// Would-block and interrupted results never show up here: they are absorbed
/// where the I/O call is made. Read and write failures are scoped to a single
/// connection (see [`NetworkError::is_connection_scoped`]); every other variant
/// means the server can no longer make progress.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Poll Error: {0}")]
    Poll(#[source] io::Error),

    #[error("Failed to register {token:?}: {source}")]
    Register {
        token: Token,
        #[source]
        source: io::Error,
    },

    #[error("Failed to modify interest of {token:?}: {source}")]
    Modify {
        token: Token,
        #[source]
        source: io::Error,
    },

    #[error("Failed to deregister {token:?}: {source}")]
    Deregister {
        token: Token,
        #[source]
        source: io::Error,
    },

    #[error("Token {0:?} is already registered")]
    TokenInUse(Token),

    #[error("Token {0:?} is not registered")]
    UnknownToken(Token),

    #[error("Connection {0:?} is already in the registry")]
    DuplicateConnection(ConnectionId),

    #[error("Read Error on {id:?}: {source}")]
    Read {
        id: ConnectionId,
        #[source]
        source: io::Error,
    },

    #[error("Write Error on {id:?}: {source}")]
    Write {
        id: ConnectionId,
        #[source]
        source: io::Error,
    },

    #[error("Failed to bind to wildcard address on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Invalid port or unknown service: {0}")]
    InvalidPort(String),

    #[error("Cannot look up service {name}: failed to read {path}: {source}")]
    ServiceTable {
        name: String,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Signal Error: {0}")]
    Signal(#[from] nix::Error),
}

impl NetworkError {
    /// True when the failure only concerns one connection, so the server can
    /// drop that connection and keep serving the rest.
    pub fn is_connection_scoped(&self) -> bool {
        matches!(self, NetworkError::Read { .. } | NetworkError::Write { .. })
    }

    /// The connection the failure belongs to, if any.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        match self {
            NetworkError::Read { id, .. }
            | NetworkError::Write { id, .. }
            | NetworkError::DuplicateConnection(id) => Some(*id),
            _ => None,
        }
    }
}
