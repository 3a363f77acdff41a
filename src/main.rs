use anyhow::Context;
use clap::Parser;
use mill_reactor::net::tcp::{config, CannedResponse, Listener, TcpServerConfig};
use mill_reactor::reactor::Reactor;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port number or TCP service name to listen on
    port: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = config::resolve_port(&cli.port)?;
    let config = TcpServerConfig::builder().port(port).build();

    let mut reactor =
        Reactor::new(config.events_capacity).context("failed to create the event loop")?;
    let mut listener = Listener::bind(config, CannedResponse)?;
    listener
        .register(reactor.poll_handle())
        .context("failed to register the listener")?;
    info!(port = %cli.port, addr = ?listener.local_addr().ok(), "listening");

    reactor.run(&mut listener).context("event loop failed")?;
    Ok(())
}
