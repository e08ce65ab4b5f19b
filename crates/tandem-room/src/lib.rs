//! The Room Session Core for Tandem.
//!
//! This crate is the single source of truth for room existence and
//! membership. It owns the in-memory [`Registry`] of rooms, implements the
//! admission protocol that caps every room at two participants, reacts to
//! disconnects, and forwards opaque application messages between the members
//! of a room and nowhere else.
//!
//! # Key types
//!
//! - [`Broker`] — admission, lifecycle, and relay operations
//! - [`Registry`] — the room map plus the connection→room side table
//! - [`Room`] — member set and optional layout metadata
//! - [`PeerNotice`] — outbound signals pushed to a room's other member
//! - [`RoomError`] — the recoverable failure taxonomy
//!
//! # Concurrency
//!
//! Every mutating operation on [`Broker`] is a synchronous method with no
//! suspension points, so a check-then-mutate sequence (capacity check,
//! member insert) can never interleave with another admission attempt.
//! Callers on a multi-threaded runtime serialize access through a single
//! `tokio::sync::Mutex<Broker>`; nothing here requires a lock of its own.

mod broker;
mod error;
mod registry;
mod room;

pub use broker::{Broker, PeerNotice, PeerSender, RelayOutcome};
pub use error::RoomError;
pub use registry::{Registry, Vacancy};
pub use room::{ROOM_CAPACITY, Room};
