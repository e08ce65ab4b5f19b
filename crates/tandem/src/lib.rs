//! # Tandem
//!
//! Real-time two-party session broker over WebSockets.
//!
//! Clients create or join a named room; once exactly two connections occupy
//! it, opaque application messages (game moves, state snapshots, unlock
//! signals) are relayed between them. Messages never cross room boundaries.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tandem::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TandemError> {
//!     let server = TandemServer::builder()
//!         .bind("0.0.0.0:8080")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::TandemError;
pub use server::{TandemServer, TandemServerBuilder};

/// Commonly used types, re-exported for one-line imports.
pub mod prelude {
    pub use crate::{TandemError, TandemServer, TandemServerBuilder};
    pub use tandem_protocol::{
        Ack, ClientEnvelope, ClientEvent, Codec, JsonCodec, RoomKey,
        ServerEvent,
    };
    pub use tandem_room::{Broker, PeerNotice, RelayOutcome, RoomError};
    pub use tandem_transport::ConnectionId;
}
