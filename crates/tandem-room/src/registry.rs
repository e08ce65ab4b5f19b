//! The room registry: the authoritative map of rooms and memberships.
//!
//! The registry is a pure data structure with no admission rules. It
//! maintains two maps that must never diverge:
//!
//! - `rooms` — every live room, keyed by its caller-supplied identifier
//! - `occupants` — the side table from connection to current room
//!
//! A connection appears in `occupants` if and only if it is in the member
//! set of the room it points at. Both maps are mutated together inside this
//! module and nowhere else, which is what makes the invariant enforceable.

use std::collections::HashMap;

use tandem_protocol::RoomKey;
use tandem_transport::ConnectionId;

use crate::{Room, RoomError};

/// What a member removal left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vacancy {
    /// The member set emptied and the room was deleted.
    Deleted,
    /// The room remains with this many members.
    Occupied(usize),
}

/// Maps room identifiers to rooms and connections to their current room.
///
/// The registry is exclusively owned by the [`Broker`](crate::Broker);
/// it is never handed out by reference, so all mutation flows through the
/// operations below.
#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<RoomKey, Room>,
    occupants: HashMap<ConnectionId, RoomKey>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a room with this identifier exists.
    pub fn contains(&self, key: &RoomKey) -> bool {
        self.rooms.contains_key(key)
    }

    /// Looks up a room by identifier.
    pub fn get(&self, key: &RoomKey) -> Option<&Room> {
        self.rooms.get(key)
    }

    /// Inserts a new room under `key`.
    ///
    /// The room's members are recorded in the occupancy side table.
    ///
    /// # Errors
    /// Returns [`RoomError::AlreadyExists`] if the identifier is taken.
    pub fn insert(&mut self, key: RoomKey, room: Room) -> Result<(), RoomError> {
        if self.rooms.contains_key(&key) {
            return Err(RoomError::AlreadyExists(key));
        }
        for member in room.members() {
            self.occupants.insert(member, key.clone());
        }
        self.rooms.insert(key, room);
        Ok(())
    }

    /// Adds a connection to an existing room's member set.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`] if no room has this identifier
    /// - [`RoomError::Full`] if the member set is at capacity
    pub fn add_member(
        &mut self,
        key: &RoomKey,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        let room = self
            .rooms
            .get_mut(key)
            .ok_or_else(|| RoomError::NotFound(key.clone()))?;

        if room.is_full() {
            return Err(RoomError::Full(key.clone()));
        }

        room.insert_member(conn);
        self.occupants.insert(conn, key.clone());
        Ok(())
    }

    /// Removes a connection from a room's member set, deleting the room if
    /// the set empties.
    ///
    /// Returns the occupancy left behind so callers can decide whether a
    /// surviving member needs notifying. Removing a connection that is not
    /// a member (or naming a room that does not exist) mutates nothing
    /// beyond clearing the connection's side-table entry.
    pub fn remove_member(
        &mut self,
        key: &RoomKey,
        conn: ConnectionId,
    ) -> Vacancy {
        // Only clear the side-table entry that points at this room, so a
        // mismatched call cannot desync a membership held elsewhere.
        if self.occupants.get(&conn) == Some(key) {
            self.occupants.remove(&conn);
        }

        let Some(room) = self.rooms.get_mut(key) else {
            return Vacancy::Deleted;
        };
        room.remove_member(conn);

        if room.is_empty() {
            self.rooms.remove(key);
            Vacancy::Deleted
        } else {
            Vacancy::Occupied(room.member_count())
        }
    }

    /// Returns the room a connection currently occupies, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&RoomKey> {
        self.occupants.get(&conn)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn key(name: &str) -> RoomKey {
        RoomKey::from(name)
    }

    #[test]
    fn test_insert_records_room_and_occupancy() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();

        assert!(reg.contains(&key("lobby")));
        assert_eq!(reg.room_of(conn(1)), Some(&key("lobby")));
        assert_eq!(reg.room_count(), 1);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();

        let result = reg.insert(key("lobby"), Room::new(conn(2), None));
        assert!(matches!(result, Err(RoomError::AlreadyExists(_))));
        // The losing room's creator must not appear in the side table.
        assert_eq!(reg.room_of(conn(2)), None);
    }

    #[test]
    fn test_add_member_updates_side_table() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();

        reg.add_member(&key("lobby"), conn(2)).unwrap();

        assert_eq!(reg.room_of(conn(2)), Some(&key("lobby")));
        assert_eq!(reg.get(&key("lobby")).unwrap().member_count(), 2);
    }

    #[test]
    fn test_add_member_to_missing_room_fails() {
        let mut reg = Registry::new();
        let result = reg.add_member(&key("nowhere"), conn(1));
        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[test]
    fn test_add_member_to_full_room_fails() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();
        reg.add_member(&key("lobby"), conn(2)).unwrap();

        let result = reg.add_member(&key("lobby"), conn(3));

        assert!(matches!(result, Err(RoomError::Full(_))));
        assert_eq!(reg.room_of(conn(3)), None);
        assert_eq!(reg.get(&key("lobby")).unwrap().member_count(), 2);
    }

    #[test]
    fn test_remove_member_reports_remaining_occupancy() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();
        reg.add_member(&key("lobby"), conn(2)).unwrap();

        let vacancy = reg.remove_member(&key("lobby"), conn(1));

        assert_eq!(vacancy, Vacancy::Occupied(1));
        assert!(reg.contains(&key("lobby")));
        assert_eq!(reg.room_of(conn(1)), None);
        assert_eq!(reg.room_of(conn(2)), Some(&key("lobby")));
    }

    #[test]
    fn test_remove_last_member_deletes_the_room() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();

        let vacancy = reg.remove_member(&key("lobby"), conn(1));

        assert_eq!(vacancy, Vacancy::Deleted);
        assert!(!reg.contains(&key("lobby")));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_member_from_missing_room_is_harmless() {
        let mut reg = Registry::new();
        let vacancy = reg.remove_member(&key("nowhere"), conn(1));
        assert_eq!(vacancy, Vacancy::Deleted);
    }

    #[test]
    fn test_deleted_identifier_is_reusable() {
        let mut reg = Registry::new();
        reg.insert(key("lobby"), Room::new(conn(1), None)).unwrap();
        reg.remove_member(&key("lobby"), conn(1));

        // Same identifier, fresh room.
        reg.insert(key("lobby"), Room::new(conn(2), None)).unwrap();
        assert!(reg.get(&key("lobby")).unwrap().contains(conn(2)));
    }
}
