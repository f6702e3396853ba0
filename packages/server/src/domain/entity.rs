//! Entities of the relay domain.

use std::collections::BTreeSet;

use super::value_object::{ConnectionId, RoomId, UserId, UserName};

/// A joined connection and the metadata it announced in `join`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub user_name: UserName,
}

impl Connection {
    pub fn new(id: ConnectionId, room_id: RoomId, user_id: UserId, user_name: UserName) -> Self {
        Self {
            id,
            room_id,
            user_id,
            user_name,
        }
    }
}

/// A broadcast group
///
/// A room only lives in the registry while it has at least one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    members: BTreeSet<ConnectionId>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
        }
    }

    /// Returns `false` if the connection was already a member.
    pub fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        self.members.insert(connection_id)
    }

    /// Returns `false` if the connection was not a member.
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }

    pub fn participant_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every member except `connection_id`
    pub fn peers_of(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|id| *id != connection_id)
            .copied()
            .collect()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            participants: self.participant_count(),
        }
    }
}

/// Result of a join or a leave, used to notify the rest of the room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    /// The connection that joined or left
    pub connection: Connection,
    /// Member count of the room after the change
    pub participants: usize,
    /// Members of the room other than `connection`
    pub peers: Vec<ConnectionId>,
}

/// Read-only view of a live room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub participants: usize,
}
