use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use mio::net::TcpListener;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::debug;

use crate::error::{NetworkError, Result};

/// Binds a non-blocking listening socket on the wildcard address.
///
/// Prefers a dual-stack `[::]` socket and falls back to `0.0.0.0` when IPv6
/// is unavailable. `SO_REUSEADDR` is set on every candidate.
pub fn bind_wildcard(port: u16, backlog: i32) -> Result<TcpListener> {
    let candidates = [
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
    ];

    let mut last_err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no address to bind");
    for addr in candidates {
        match bind_one(addr, backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                debug!(%addr, error = %e, "bind candidate failed");
                last_err = e;
            }
        }
    }
    Err(NetworkError::Bind {
        port,
        source: last_err,
    })
}

fn bind_one(addr: SocketAddr, backlog: i32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    Ok(TcpListener::from_std(socket.into()))
}
