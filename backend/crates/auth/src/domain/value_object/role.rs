//! Editorial Role
//!
//! Three-tier role model for the newsroom: administrators manage the
//! system, editors manage content across the desk, authors manage
//! their own articles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// Stored as a smallint in the database; serialized as its code
/// string (`admin` / `editor` / `author`) on the wire and inside
/// token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
    Author,
}

impl Role {
    /// Convert from database ID
    ///
    /// Returns `None` for IDs outside the role table; the caller
    /// decides whether that is a data integrity error.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Admin),
            1 => Some(Self::Editor),
            2 => Some(Self::Author),
            _ => None,
        }
    }

    /// Convert to database ID
    pub fn to_id(self) -> i16 {
        match self {
            Self::Admin => 0,
            Self::Editor => 1,
            Self::Author => 2,
        }
    }

    /// Parse from the wire code (`admin` / `editor` / `author`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "author" => Some(Self::Author),
            _ => None,
        }
    }

    /// Wire code
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Desk-wide content management (publish, schedule, reassign)
    pub fn can_manage_content(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for role in [Role::Admin, Role::Editor, Role::Author] {
            assert_eq!(Role::from_id(role.to_id()), Some(role));
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert_eq!(Role::from_id(3), None);
        assert_eq!(Role::from_id(-1), None);
    }

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(Role::from_code("admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("editor"), Some(Role::Editor));
        assert_eq!(Role::from_code("author"), Some(Role::Author));
        assert_eq!(Role::from_code("superuser"), None);
    }

    #[test]
    fn test_permissions() {
        assert!(Role::Admin.is_admin());
        assert!(Role::Admin.can_manage_content());
        assert!(Role::Editor.can_manage_content());
        assert!(!Role::Author.can_manage_content());
        assert!(!Role::Editor.is_admin());
    }

    #[test]
    fn test_serde_as_code_string() {
        let json = serde_json::to_string(&Role::Editor).unwrap();
        assert_eq!(json, "\"editor\"");
        let back: Role = serde_json::from_str("\"author\"").unwrap();
        assert_eq!(back, Role::Author);
    }
}
