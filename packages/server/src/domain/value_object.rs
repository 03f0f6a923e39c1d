//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum accepted username length.
pub const USERNAME_MAX_LEN: usize = 100;

/// Server identifier value object.
///
/// Unique within a snapshot and stable across snapshots for the same running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerId(u32);

impl ServerId {
    /// Create a new ServerId.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the inner value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player username value object.
///
/// Unique within one server's roster at a point in time, not globally unique over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// # Arguments
    ///
    /// * `name` - The username string
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = name.chars().count();
        if len > USERNAME_MAX_LEN {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter country code, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    /// Create a new CountryCode.
    ///
    /// Accepts exactly two ASCII letters in any case.
    pub fn new(code: &str) -> Result<Self, ValueObjectError> {
        let trimmed = code.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValueObjectError::CountryCodeInvalid(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Regional-indicator flag for this country.
    pub fn flag(&self) -> String {
        kartwatch_shared::format::country_flag(&self.0)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a notification subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(i64);

impl SubscriberId {
    /// Create a new SubscriberId.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_new_success() {
        // テスト項目: 有効なユーザー名を作成できる
        // given (前提条件):
        let name = "alice".to_string();

        // when (操作):
        let result = Username::new(name);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_username_new_empty_fails() {
        // テスト項目: 空のユーザー名は作成できない
        // when (操作):
        let result = Username::new(String::new());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::UsernameEmpty);
    }

    #[test]
    fn test_username_new_too_long_fails() {
        // テスト項目: 101 文字以上のユーザー名は作成できない
        // given (前提条件):
        let name = "a".repeat(101);

        // when (操作):
        let result = Username::new(name);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::UsernameTooLong {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn test_country_code_normalized_to_lowercase() {
        // テスト項目: 国コードは小文字に正規化される
        // when (操作):
        let code = CountryCode::new("FI").unwrap();

        // then (期待する結果):
        assert_eq!(code.as_str(), "fi");
        assert_eq!(code, CountryCode::new("fi").unwrap());
        assert_eq!(code.flag(), "🇫🇮");
    }

    #[test]
    fn test_country_code_invalid() {
        // テスト項目: 2 文字の英字以外は国コードとして受け付けない
        for raw in ["", "f", "fin", "f1", "  "] {
            assert_eq!(
                CountryCode::new(raw).unwrap_err(),
                ValueObjectError::CountryCodeInvalid(raw.to_string())
            );
        }
    }

    #[test]
    fn test_server_id_ordering() {
        // テスト項目: サーバー ID は値で比較・順序付けできる
        assert_eq!(ServerId::new(7), ServerId::new(7));
        assert!(ServerId::new(1) < ServerId::new(2));
        assert_eq!(ServerId::new(42).to_string(), "42");
    }
}
