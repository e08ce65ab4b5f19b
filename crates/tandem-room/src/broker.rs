//! The broker: admission, disconnect handling, and room-scoped relay.
//!
//! A `Broker` owns the [`Registry`] and the per-connection outbound
//! channels. It is an explicitly constructed value, not a process-wide
//! singleton, so independent brokers can coexist (one per test, one per
//! server).
//!
//! Every mutating method runs to completion synchronously. The capacity
//! check and the member insert in [`join_room`](Broker::join_room) happen
//! with no suspension point between them, which is what keeps two
//! concurrent joins on a one-slot room from both passing the check.

use std::collections::HashMap;

use serde_json::Value;
use tandem_protocol::RoomKey;
use tandem_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{Registry, Room, RoomError, Vacancy};

/// An outbound signal from the broker to a room member's connection task.
///
/// These are the only ways the broker ever speaks to a connection other
/// than through a request acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerNotice {
    /// A second participant joined the recipient's room; the session is
    /// now fully occupied.
    PeerJoined { room: RoomKey },

    /// The recipient's peer left the room. Distinct from relay traffic so
    /// the surviving client can reset instead of waiting indefinitely.
    PeerLeft { room: RoomKey },

    /// An opaque application message from the room's other member.
    Relay { event: String, data: Value },
}

/// Channel sender for delivering notices to a connection.
///
/// Unbounded so that delivery is a synchronous, non-suspending send from
/// inside broker operations; per-sender ordering is the channel's FIFO
/// ordering.
pub type PeerSender = mpsc::UnboundedSender<PeerNotice>;

/// The result of a relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The payload was forwarded to this many room peers.
    Forwarded(usize),
    /// The sender occupies no room; the payload was dropped.
    NoRoom,
}

/// Admission, lifecycle, and relay operations over a private [`Registry`].
///
/// The registry is never handed out by reference. Callers observe it only
/// through the read-only queries below, and mutate it only through the
/// operations, so the membership invariants are enforced in one place.
#[derive(Debug, Default)]
pub struct Broker {
    registry: Registry,
    /// Outbound channel per attached connection.
    peers: HashMap<ConnectionId, PeerSender>,
}

impl Broker {
    /// Creates a broker with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound channel.
    ///
    /// Must be called before the connection can receive peer notices;
    /// admission does not require it.
    pub fn attach(&mut self, conn: ConnectionId, sender: PeerSender) {
        self.peers.insert(conn, sender);
        tracing::debug!(%conn, "connection attached");
    }

    /// Creates a room with the requester as its sole member.
    ///
    /// The room is immediately open for one join; there is no separate
    /// "waiting" state.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] / [`RoomError::InRoomElsewhere`] if
    ///   the requester already holds a room association
    /// - [`RoomError::AlreadyExists`] if the identifier is taken
    pub fn create_room(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
        layout: Option<Value>,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.registry.room_of(conn) {
            return Err(if *current == key {
                RoomError::AlreadyInRoom(key)
            } else {
                RoomError::InRoomElsewhere(current.clone())
            });
        }

        self.registry.insert(key.clone(), Room::new(conn, layout))?;
        tracing::info!(room = %key, %conn, "room created");
        Ok(())
    }

    /// Adds the requester to an existing room.
    ///
    /// Validation order: existence, then the requester's current
    /// association, then capacity. On success the member already present
    /// receives [`PeerNotice::PeerJoined`], and the room's layout
    /// descriptor (if any) is returned for the joiner's acknowledgment.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if no room has this identifier
    /// - [`RoomError::AlreadyInRoom`] if the requester is in this room
    /// - [`RoomError::InRoomElsewhere`] if the requester is in another
    /// - [`RoomError::Full`] if the room is at capacity
    pub fn join_room(
        &mut self,
        conn: ConnectionId,
        key: RoomKey,
    ) -> Result<Option<Value>, RoomError> {
        if !self.registry.contains(&key) {
            return Err(RoomError::NotFound(key));
        }

        if let Some(current) = self.registry.room_of(conn) {
            return Err(if *current == key {
                RoomError::AlreadyInRoom(key)
            } else {
                RoomError::InRoomElsewhere(current.clone())
            });
        }

        self.registry.add_member(&key, conn)?;

        let room = self
            .registry
            .get(&key)
            .expect("room inserted into on the line above");
        let layout = room.layout().cloned();
        let peers = room.peers_of(conn);

        tracing::info!(
            room = %key,
            %conn,
            members = room.member_count(),
            "member joined"
        );

        for peer in peers {
            self.notify(peer, PeerNotice::PeerJoined { room: key.clone() });
        }

        Ok(layout)
    }

    /// Removes the connection from its current room, if it has one.
    ///
    /// Deletes the room when the member set empties; otherwise the
    /// surviving member receives [`PeerNotice::PeerLeft`]. Leaving while
    /// unjoined is a no-op, not an error.
    pub fn leave_room(&mut self, conn: ConnectionId) {
        let Some(key) = self.registry.room_of(conn).cloned() else {
            return;
        };

        match self.registry.remove_member(&key, conn) {
            Vacancy::Deleted => {
                tracing::info!(room = %key, %conn, "last member left, room deleted");
            }
            Vacancy::Occupied(members) => {
                tracing::info!(room = %key, %conn, members, "member left");
                let survivors: Vec<ConnectionId> = self
                    .registry
                    .get(&key)
                    .map(|room| room.members().collect())
                    .unwrap_or_default();
                for survivor in survivors {
                    self.notify(
                        survivor,
                        PeerNotice::PeerLeft { room: key.clone() },
                    );
                }
            }
        }
    }

    /// Handles a transport-level disconnect: leaves the room (with the
    /// same cleanup and survivor notification as an explicit leave) and
    /// drops the connection's outbound channel.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.leave_room(conn);
        self.peers.remove(&conn);
        tracing::debug!(%conn, "connection detached");
    }

    /// Forwards an opaque payload to every other member of the sender's
    /// room.
    ///
    /// The sender never receives its own message, and no connection
    /// outside the sender's room can ever receive it. A sender with no
    /// room association gets [`RelayOutcome::NoRoom`] and the payload is
    /// dropped; relay is meaningless outside a session.
    pub fn relay(
        &self,
        conn: ConnectionId,
        event: &str,
        data: Value,
    ) -> RelayOutcome {
        let Some(key) = self.registry.room_of(conn) else {
            tracing::debug!(%conn, event, "relay from unjoined connection dropped");
            return RelayOutcome::NoRoom;
        };

        let peers = self
            .registry
            .get(key)
            .map(|room| room.peers_of(conn))
            .unwrap_or_default();

        for peer in &peers {
            self.notify(
                *peer,
                PeerNotice::Relay {
                    event: event.to_string(),
                    data: data.clone(),
                },
            );
        }

        RelayOutcome::Forwarded(peers.len())
    }

    /// Returns the room a connection currently occupies, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomKey> {
        self.registry.room_of(conn).cloned()
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    /// Returns a room's current member count, or `None` if it does not
    /// exist.
    pub fn occupancy(&self, key: &RoomKey) -> Option<usize> {
        self.registry.get(key).map(Room::member_count)
    }

    /// Sends a notice to a single connection. Silently drops if the
    /// receiver is gone (the connection is tearing down).
    fn notify(&self, conn: ConnectionId, notice: PeerNotice) {
        if let Some(sender) = self.peers.get(&conn) {
            let _ = sender.send(notice);
        }
    }
}
