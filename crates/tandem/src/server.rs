//! `TandemServer` builder and accept loop.
//!
//! This is the entry point for running a broker. It ties the layers
//! together: transport → protocol → room core.

use std::sync::Arc;

use tandem_protocol::JsonCodec;
use tandem_room::Broker;
use tandem_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::TandemError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The broker
/// sits behind a single `Mutex`; every handler mutates room state through
/// it, one operation at a time, which is what makes the broker's
/// check-then-mutate sequences atomic under a multi-threaded runtime.
pub(crate) struct ServerState {
    pub(crate) broker: Mutex<Broker>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Tandem server.
pub struct TandemServerBuilder {
    bind_addr: String,
}

impl TandemServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<TandemServer, TandemError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            broker: Mutex::new(Broker::new()),
            codec: JsonCodec,
        });

        Ok(TandemServer { transport, state })
    }
}

impl Default for TandemServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Tandem broker server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TandemServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TandemServer {
    /// Creates a new builder.
    pub fn builder() -> TandemServerBuilder {
        TandemServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), TandemError> {
        tracing::info!("Tandem broker running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
