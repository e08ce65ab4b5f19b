//! Broker server for Match Pairs, a two-player memory game.
//!
//! One player creates a room with the shuffled board as its layout, the
//! other joins and receives the same layout, and from then on the broker
//! relays their tile-flip, match, and reset messages. The game rules live
//! entirely in the clients; the server only brokers the session.
//!
//! Run with an optional bind address:
//!
//! ```text
//! match-pairs 0.0.0.0:8080
//! ```

use tandem::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), TandemError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let server = TandemServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "match-pairs broker ready");
    server.run().await
}
