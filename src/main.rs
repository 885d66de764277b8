//! Chat Relay - Entry Point
//!
//! Starts the TCP listener and Relay actor, accepting connections.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::config::DEFAULT_ADDR;
use chat_relay::{Acceptor, Relay, RelayConfig, SharedSecret};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Bind address from command line, secret and name from the environment
    let addr: SocketAddr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string())
        .parse()?;

    let mut config = RelayConfig::new(addr);
    if let Ok(passphrase) = env::var("RELAY_PASSPHRASE") {
        config = config.with_passphrase(passphrase);
    }
    if let Ok(name) = env::var("RELAY_NAME") {
        config = config.with_server_name(name);
    }
    config.validate()?;

    info!("Welcome to '{}' chat relay!", config.server_name);

    let listener = TcpListener::bind(config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    let (relay, handle) = Relay::new(&config.server_name, config.inbound_capacity);
    tokio::spawn(relay.run());

    let auth = Arc::new(SharedSecret::new(config.passphrase.clone()));
    let acceptor = Acceptor::new(handle, auth, config);

    tokio::select! {
        _ = acceptor.serve(listener) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
        }
    }

    info!("Goodbye!");
    Ok(())
}
