//! Login Identifier
//!
//! A single form field accepts either a user name or an email.
//! The presence of `@` decides the interpretation once, at the edge;
//! `@` is not a legal user-name character so the split is unambiguous.

use kernel::error::app_error::AppResult;

use super::email::Email;
use super::user_name::UserName;

/// How the caller identified themselves at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    UserName(UserName),
    Email(Email),
}

impl LoginIdentifier {
    /// Parse a raw identifier field
    ///
    /// Validation failures surface as bad-request errors here; the
    /// login flow maps them to invalid-credentials so the response
    /// does not reveal which field was malformed.
    pub fn parse(raw: &str) -> AppResult<Self> {
        if raw.contains('@') {
            Ok(Self::Email(Email::new(raw)?))
        } else {
            Ok(Self::UserName(UserName::new(raw)?))
        }
    }
}

impl std::fmt::Display for LoginIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserName(u) => write!(f, "{u}"),
            Self::Email(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_branch() {
        let id = LoginIdentifier::parse("karim@example.com").unwrap();
        assert!(matches!(id, LoginIdentifier::Email(_)));
    }

    #[test]
    fn test_user_name_branch() {
        let id = LoginIdentifier::parse("karim_h").unwrap();
        assert!(matches!(id, LoginIdentifier::UserName(_)));
    }

    #[test]
    fn test_invalid_either_way() {
        // Looks like an email, fails email validation
        assert!(LoginIdentifier::parse("not-an@email").is_err());
        // No '@', fails user-name validation
        assert!(LoginIdentifier::parse("x").is_err());
    }
}
