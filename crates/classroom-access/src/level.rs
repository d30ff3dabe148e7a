//! Permission levels and resource identifiers on the access-control platform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission level of a user on a group or project
///
/// Levels are totally ordered; the numeric values are the platform's wire
/// representation. Ordering is only used for comparison and audit, never
/// to derive one level from another.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[repr(u8)]
pub enum PermissionLevel {
    /// No access at all (not a member)
    #[default]
    NoAccess = 0,

    /// Minimal access (can see the group exists)
    Minimal = 5,

    /// Guest access
    Guest = 10,

    /// Reporter access (read-only on code)
    Reporter = 20,

    /// Developer access (push rights)
    Developer = 30,

    /// Maintainer access
    Maintainer = 40,

    /// Owner access
    Owner = 50,

    /// Instance administrator
    Admin = 60,
}

impl PermissionLevel {
    /// Numeric wire value used by the platform API
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the platform's numeric wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoAccess),
            5 => Some(Self::Minimal),
            10 => Some(Self::Guest),
            20 => Some(Self::Reporter),
            30 => Some(Self::Developer),
            40 => Some(Self::Maintainer),
            50 => Some(Self::Owner),
            60 => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoAccess => "no access",
            Self::Minimal => "minimal",
            Self::Guest => "guest",
            Self::Reporter => "reporter",
            Self::Developer => "developer",
            Self::Maintainer => "maintainer",
            Self::Owner => "owner",
            Self::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

/// A group or project on the access-control platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// A group (classroom or team)
    Group(i64),

    /// A project (assignment repository)
    Project(i64),
}

impl Resource {
    /// The platform id of the underlying group or project
    pub fn id(&self) -> i64 {
        match self {
            Self::Group(id) | Self::Project(id) => *id,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group {}", id),
            Self::Project(id) => write!(f, "project {}", id),
        }
    }
}

/// Visibility of a newly created subgroup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl Visibility {
    /// The platform's string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }
}

/// A group as returned by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Platform id of the group
    pub id: i64,

    /// Group name
    pub name: String,

    /// Full path of the group (parent paths included)
    pub full_path: String,
}

/// Name and description of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetails {
    pub name: String,
    pub description: String,
}

/// A member of a group with their permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// User id on the platform
    pub user_id: i64,

    /// Permission level of the user on the group
    pub level: PermissionLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(PermissionLevel::NoAccess < PermissionLevel::Minimal);
        assert!(PermissionLevel::Guest < PermissionLevel::Reporter);
        assert!(PermissionLevel::Reporter < PermissionLevel::Developer);
        assert!(PermissionLevel::Owner < PermissionLevel::Admin);
    }

    #[test]
    fn test_wire_value_round_trip() {
        for level in [
            PermissionLevel::NoAccess,
            PermissionLevel::Minimal,
            PermissionLevel::Guest,
            PermissionLevel::Reporter,
            PermissionLevel::Developer,
            PermissionLevel::Maintainer,
            PermissionLevel::Owner,
            PermissionLevel::Admin,
        ] {
            assert_eq!(PermissionLevel::from_u8(level.as_u8()), Some(level));
        }

        assert_eq!(PermissionLevel::from_u8(15), None);
    }
}
