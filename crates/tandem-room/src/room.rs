//! The `Room` type: a named session container capped at two participants.

use std::collections::HashSet;

use serde_json::Value;
use tandem_transport::ConnectionId;

/// Maximum participants in a room.
///
/// Capacity checks derive from the member set's size against this constant
/// alone. There is deliberately no separate occupancy counter to keep in
/// step with the set.
pub const ROOM_CAPACITY: usize = 2;

/// A single room: its member set and optional layout metadata.
///
/// A `Room` exists only while it has members. It is created with its first
/// member already inside and the [`Registry`](crate::Registry) deletes it
/// the moment its member set empties, so an empty `Room` is never
/// observable.
#[derive(Debug, Clone)]
pub struct Room {
    members: HashSet<ConnectionId>,
    layout: Option<Value>,
}

impl Room {
    /// Creates a room containing its creator.
    pub fn new(creator: ConnectionId, layout: Option<Value>) -> Self {
        Self {
            members: HashSet::from([creator]),
            layout,
        }
    }

    /// Returns the current member count.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the member set is at [`ROOM_CAPACITY`].
    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    /// Returns `true` if the connection is a member.
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }

    /// Iterates over all members.
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    /// Returns every member except `conn`, the relay recipient set.
    pub fn peers_of(&self, conn: ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .copied()
            .filter(|member| *member != conn)
            .collect()
    }

    /// The opaque layout descriptor supplied at creation, if any.
    pub fn layout(&self) -> Option<&Value> {
        self.layout.as_ref()
    }

    pub(crate) fn insert_member(&mut self, conn: ConnectionId) {
        self.members.insert(conn);
    }

    pub(crate) fn remove_member(&mut self, conn: ConnectionId) -> bool {
        self.members.remove(&conn)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_new_room_contains_its_creator() {
        let room = Room::new(conn(1), None);
        assert_eq!(room.member_count(), 1);
        assert!(room.contains(conn(1)));
        assert!(!room.is_full());
    }

    #[test]
    fn test_room_full_at_capacity() {
        let mut room = Room::new(conn(1), None);
        room.insert_member(conn(2));
        assert!(room.is_full());
        assert_eq!(room.member_count(), ROOM_CAPACITY);
    }

    #[test]
    fn test_peers_of_excludes_the_asker() {
        let mut room = Room::new(conn(1), None);
        room.insert_member(conn(2));

        assert_eq!(room.peers_of(conn(1)), vec![conn(2)]);
        assert_eq!(room.peers_of(conn(2)), vec![conn(1)]);
    }

    #[test]
    fn test_peers_of_nonmember_sees_all_members() {
        let room = Room::new(conn(1), None);
        assert_eq!(room.peers_of(conn(9)), vec![conn(1)]);
    }

    #[test]
    fn test_layout_is_preserved() {
        let layout = serde_json::json!([[1, 0], [0, 1]]);
        let room = Room::new(conn(1), Some(layout.clone()));
        assert_eq!(room.layout(), Some(&layout));
    }
}
