use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{NetworkError, Result};
use crate::reactor::DEFAULT_EVENTS_CAPACITY;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKLOG: i32 = 50;
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

const SERVICES_PATH: &str = "/etc/services";

/// Configuration for the TCP server.
///
/// Use TcpServerConfig::builder() for ergonomic construction.
///
/// ## Socket Options
///
/// - backlog: Length of the kernel's pending-connection queue
/// - no_delay: When enabled, disables Nagle's algorithm on accepted sockets
///
/// ## Buffers
///
/// - buffer_size: Size of the scratch buffer each read goes through
/// - events_capacity: Maximum readiness events taken per poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpServerConfig {
    /// Port to bind on the wildcard address
    pub port: u16,
    /// Listen backlog
    pub backlog: i32,
    /// Size of the read scratch buffer
    pub buffer_size: usize,
    /// Events per poll
    pub events_capacity: usize,
    /// Enable TCP_NODELAY
    pub no_delay: bool,
}

impl TcpServerConfig {
    /// Create a new builder for TcpServerConfig
    pub fn builder() -> TcpServerConfigBuilder {
        TcpServerConfigBuilder::new()
    }
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            buffer_size: DEFAULT_BUFFER_SIZE,
            events_capacity: DEFAULT_EVENTS_CAPACITY,
            no_delay: false,
        }
    }
}

/// Builder for TcpServerConfig.
///
/// Unset fields fall back to TcpServerConfig::default(). Zero sizes are
/// raised to one.
#[derive(Debug, Default)]
pub struct TcpServerConfigBuilder {
    port: Option<u16>,
    backlog: Option<i32>,
    buffer_size: Option<usize>,
    events_capacity: Option<usize>,
    no_delay: Option<bool>,
}

impl TcpServerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the port to listen on (0 picks an ephemeral port)
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Set the read scratch buffer size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Set the number of events taken per poll
    pub fn events_capacity(mut self, capacity: usize) -> Self {
        self.events_capacity = Some(capacity);
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.no_delay = Some(enabled);
        self
    }

    pub fn build(self) -> TcpServerConfig {
        let default = TcpServerConfig::default();
        TcpServerConfig {
            port: self.port.unwrap_or(default.port),
            backlog: self.backlog.unwrap_or(default.backlog),
            buffer_size: self.buffer_size.unwrap_or(default.buffer_size).max(1),
            events_capacity: self
                .events_capacity
                .unwrap_or(default.events_capacity)
                .max(1),
            no_delay: self.no_delay.unwrap_or(default.no_delay),
        }
    }
}

/// Resolves a port argument: a decimal port number or a TCP service name
/// from `/etc/services`.
pub fn resolve_port(service: &str) -> Result<u16> {
    resolve_port_with(Path::new(SERVICES_PATH), service)
}

/// Like [`resolve_port`], reading service names from `services`.
pub fn resolve_port_with(services: &Path, service: &str) -> Result<u16> {
    if let Ok(port) = service.parse::<u16>() {
        return Ok(port);
    }
    let table = fs::read_to_string(services).map_err(|source| {
        debug!(path = %services.display(), error = %source, "cannot read services table");
        NetworkError::ServiceTable {
            name: service.to_string(),
            path: services.display().to_string(),
            source,
        }
    })?;
    lookup_service(&table, service).ok_or_else(|| NetworkError::InvalidPort(service.to_string()))
}

/// Finds the TCP port of `name` (or one of its aliases) in a table with
/// `/etc/services` syntax.
pub fn lookup_service(table: &str, name: &str) -> Option<u16> {
    table.lines().find_map(|line| {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let service = fields.next()?;
        let (port, proto) = fields.next()?.split_once('/')?;
        if proto != "tcp" {
            return None;
        }
        let matches = service == name || fields.any(|alias| alias == name);
        if matches {
            port.parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = "\
# Network services, Internet style
tcpmux          1/tcp                           # TCP port service multiplexer
http            80/tcp          www             # WorldWideWeb HTTP
http            80/udp
domain          53/udp
https           443/tcp
";

    #[test]
    fn test_defaults() {
        let config = TcpServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.backlog, 50);
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.events_capacity, 100);
        assert!(!config.no_delay);
        assert_eq!(TcpServerConfig::builder().build(), config);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TcpServerConfig::builder()
            .port(0)
            .backlog(8)
            .buffer_size(0)
            .events_capacity(16)
            .no_delay(true)
            .build();
        assert_eq!(config.port, 0);
        assert_eq!(config.backlog, 8);
        assert_eq!(config.buffer_size, 1);
        assert_eq!(config.events_capacity, 16);
        assert!(config.no_delay);
    }

    #[test]
    fn test_numeric_port() {
        assert_eq!(resolve_port("8080").unwrap(), 8080);
        assert_eq!(resolve_port("0").unwrap(), 0);
    }

    #[test]
    fn test_out_of_range_port_is_not_a_service() {
        let path = std::env::temp_dir().join(format!("mill-services-{}", std::process::id()));
        fs::write(&path, SERVICES).unwrap();
        let result = resolve_port_with(&path, "70000-not-a-service");
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(NetworkError::InvalidPort(_))));
    }

    #[test]
    fn test_service_name_from_table_file() {
        let path = std::env::temp_dir().join(format!("mill-services-www-{}", std::process::id()));
        fs::write(&path, SERVICES).unwrap();
        let result = resolve_port_with(&path, "www");
        fs::remove_file(&path).unwrap();
        assert_eq!(result.unwrap(), 80);
    }

    #[test]
    fn test_unreadable_services_table_is_reported() {
        let missing = Path::new("/nonexistent/mill-reactor/services");
        match resolve_port_with(missing, "http") {
            Err(NetworkError::ServiceTable { name, source, .. }) => {
                assert_eq!(name, "http");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected a services table error, got {other:?}"),
        }
        // Numeric ports never touch the table.
        assert_eq!(resolve_port_with(missing, "8080").unwrap(), 8080);
    }

    #[test]
    fn test_lookup_service() {
        assert_eq!(lookup_service(SERVICES, "http"), Some(80));
        assert_eq!(lookup_service(SERVICES, "www"), Some(80));
        assert_eq!(lookup_service(SERVICES, "https"), Some(443));
        assert_eq!(lookup_service(SERVICES, "tcpmux"), Some(1));
        // udp-only entries do not count
        assert_eq!(lookup_service(SERVICES, "domain"), None);
        assert_eq!(lookup_service(SERVICES, "Network"), None);
    }
}
