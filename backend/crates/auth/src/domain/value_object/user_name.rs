//! User Name Value Object
//!
//! ユーザー名は、編集部メンバーを識別するための公開識別子（ハンドル）。
//! ログイン、記事の署名欄、管理画面で使用される。
//!
//! ## 設計方針
//! - ASCII文字のみ許可（a-z, 0-9, _ . -）
//! - 大文字入力は受け付けるが、canonical（正規形）は小文字
//! - NFKC正規化 → 検証 → 小文字化 の順で処理
//!
//! ## 不変条件
//! - 長さ: 3〜30文字（正規化後）
//! - 先頭・末尾: 英数字または `_`
//! - 連続ドット禁止（`..`）
//! - 英数字を最低1文字含む（記号のみ禁止）

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Reserved words that cannot be used as user names
///
/// Route segments and operational terms that would collide with the
/// CMS URL space or confuse the audit trail.
const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "moderator",
    "staff",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "refresh",
    "register",
    "password",
    "me",
    "user",
    "users",
    "account",
    "accounts",
    "dashboard",
    "editor",
    "author",
    "news",
    "article",
    "articles",
    "category",
    "categories",
    "anonymous",
    "guest",
    "null",
    "undefined",
];

/// User name value object
///
/// Keeps the original casing for display and a lowercased canonical
/// form for uniqueness checks and lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserName {
    /// As entered (casing preserved, for display)
    original: String,
    /// Lowercased canonical form (for uniqueness and lookups)
    canonical: String,
}

impl UserName {
    /// Create a new user name with validation
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let normalized: String = raw.into().trim().nfkc().collect();

        let char_count = normalized.chars().count();
        if char_count < USER_NAME_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "User name must be at least {} characters",
                USER_NAME_MIN_LENGTH
            )));
        }
        if char_count > USER_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "User name must be at most {} characters",
                USER_NAME_MAX_LENGTH
            )));
        }

        for ch in normalized.chars() {
            if !ch.is_ascii_alphanumeric() && !ALLOWED_SPECIAL_CHARS.contains(&ch) {
                return Err(AppError::bad_request(
                    "User name may only contain letters, digits, '_', '.' and '-'",
                ));
            }
        }

        // 先頭・末尾は英数字または `_`
        let first = normalized.chars().next().unwrap_or(' ');
        let last = normalized.chars().last().unwrap_or(' ');
        if !(first.is_ascii_alphanumeric() || first == '_')
            || !(last.is_ascii_alphanumeric() || last == '_')
        {
            return Err(AppError::bad_request(
                "User name must start and end with a letter, digit or '_'",
            ));
        }

        if normalized.contains("..") {
            return Err(AppError::bad_request(
                "User name must not contain consecutive dots",
            ));
        }

        if !normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::bad_request(
                "User name must contain at least one letter or digit",
            ));
        }

        let canonical = normalized.to_lowercase();
        if RESERVED_WORDS.contains(&canonical.as_str()) {
            return Err(AppError::bad_request("This user name is reserved"));
        }

        Ok(Self {
            original: normalized,
            canonical,
        })
    }

    /// Create from database values (assumed already validated)
    pub fn from_db(original: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            canonical: canonical.into(),
        }
    }

    /// Display form (casing preserved)
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Canonical form (lowercased, for lookups)
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for UserName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for UserName {}

impl std::hash::Hash for UserName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_names() {
        assert!(UserName::new("karim_h").is_ok());
        assert!(UserName::new("layla.saad").is_ok());
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("a-b_c.d1").is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("ab").is_err());
        assert!(UserName::new("a".repeat(31)).is_err());
        assert!(UserName::new("a".repeat(30)).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(UserName::new("user name").is_err());
        assert!(UserName::new("user@name").is_err());
        assert!(UserName::new("كريم").is_err()); // non-ASCII handles are rejected
    }

    #[test]
    fn test_edge_shapes() {
        assert!(UserName::new(".user").is_err());
        assert!(UserName::new("user.").is_err());
        assert!(UserName::new("us..er").is_err());
        assert!(UserName::new("_user_").is_ok());
        assert!(UserName::new("---").is_err()); // no alphanumeric
    }

    #[test]
    fn test_reserved_words() {
        assert!(UserName::new("admin").is_err());
        assert!(UserName::new("Admin").is_err()); // canonical form is checked
        assert!(UserName::new("login").is_err());
        assert!(UserName::new("admiral").is_ok());
    }

    #[test]
    fn test_canonical_equality() {
        let a = UserName::new("Karim_H").unwrap();
        let b = UserName::new("karim_h").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Karim_H");
        assert_eq!(a.canonical(), "karim_h");
    }
}
