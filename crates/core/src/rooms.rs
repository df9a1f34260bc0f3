//! Typed broadcast room identifiers.
//!
//! A room is a logical broadcast scope identified by entity kind and id.
//! The wire format (`workspace:<id>`, `project:<id>`, `issue:<id>`,
//! `user:<id>`) is part of the client protocol and must not change. All
//! room names are formed through this type; handlers never concatenate
//! room strings by hand.

use std::fmt;
use std::str::FromStr;

use crate::types::DbId;

/// A logical broadcast scope.
///
/// Two rooms are equal iff their kind and id are equal, which matches
/// string equality of their wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// All members of a workspace.
    Workspace(DbId),
    /// All members of a project; `task_*` events are published here.
    Project(DbId),
    /// Followers of a single issue; `comment_added` events are published here.
    Issue(DbId),
    /// A single user's notification channel.
    User(DbId),
}

impl RoomId {
    /// The user id this room is private to, if it is a user room.
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            RoomId::User(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Workspace(id) => write!(f, "workspace:{id}"),
            RoomId::Project(id) => write!(f, "project:{id}"),
            RoomId::Issue(id) => write!(f, "issue:{id}"),
            RoomId::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Error returned when a client-supplied room string is not a valid room.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid room identifier: {0}")]
pub struct InvalidRoom(pub String);

impl FromStr for RoomId {
    type Err = InvalidRoom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or_else(|| InvalidRoom(s.to_string()))?;
        let id: DbId = id.parse().map_err(|_| InvalidRoom(s.to_string()))?;
        match kind {
            "workspace" => Ok(RoomId::Workspace(id)),
            "project" => Ok(RoomId::Project(id)),
            "issue" => Ok(RoomId::Issue(id)),
            "user" => Ok(RoomId::User(id)),
            _ => Err(InvalidRoom(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_kind_colon_id() {
        assert_eq!(RoomId::Workspace(1).to_string(), "workspace:1");
        assert_eq!(RoomId::Project(42).to_string(), "project:42");
        assert_eq!(RoomId::Issue(7).to_string(), "issue:7");
        assert_eq!(RoomId::User(99).to_string(), "user:99");
    }

    #[test]
    fn parse_round_trips() {
        for room in [
            RoomId::Workspace(3),
            RoomId::Project(12),
            RoomId::Issue(5),
            RoomId::User(8),
        ] {
            let parsed: RoomId = room.to_string().parse().unwrap();
            assert_eq!(parsed, room);
        }
    }

    #[test]
    fn rooms_equal_iff_wire_forms_equal() {
        assert_eq!(RoomId::Project(1), RoomId::Project(1));
        assert_ne!(RoomId::Project(1), RoomId::Project(2));
        // Same id, different kind: distinct rooms.
        assert_ne!(RoomId::Project(1), RoomId::Issue(1));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("team:1".parse::<RoomId>().is_err());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("project".parse::<RoomId>().is_err());
        assert!("project:".parse::<RoomId>().is_err());
        assert!("project:abc".parse::<RoomId>().is_err());
        assert!("".parse::<RoomId>().is_err());
    }

    #[test]
    fn user_id_only_for_user_rooms() {
        assert_eq!(RoomId::User(4).user_id(), Some(4));
        assert_eq!(RoomId::Project(4).user_id(), None);
    }
}
