//! Wire protocol for Tandem.
//!
//! This crate defines the "language" that clients and the broker speak:
//!
//! - **Types** ([`ClientEnvelope`], [`ClientEvent`], [`ServerEvent`],
//!   [`Ack`], [`RoomKey`]) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the broker
//! (room membership). It doesn't know about connections or rooms; it only
//! knows how to name events and serialize them.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Broker (room state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{Ack, ClientEnvelope, ClientEvent, RoomKey, ServerEvent};
