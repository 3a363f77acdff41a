pub use crate::net::errors::NetworkError;

pub type Result<T> = std::result::Result<T, NetworkError>;
