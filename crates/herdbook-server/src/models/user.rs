//! User accounts

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::UserId;

/// An email-keyed account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub is_active: bool,
    pub is_staff: bool,
    #[serde(skip)]
    pub is_superuser: bool,
    #[serde(skip)]
    pub created: DateTime<Utc>,
}

/// Row to insert; the email must already be normalized and the password hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Profile changes; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

/// Lowercase the domain part of an address, keeping the local part as typed
///
/// Surrounding whitespace is dropped. Addresses without an `@` are returned
/// trimmed and otherwise unchanged; validation rejects them separately.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Minimal shape check: non-empty local part and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("test@HOLMEGROWN.com"), "test@holmegrown.com");
        assert_eq!(normalize_email("Nick.Smith@Example.COM"), "Nick.Smith@example.com");
    }

    #[test]
    fn test_normalize_email_trims() {
        assert_eq!(normalize_email("  farmer@Farm.io "), "farmer@farm.io");
    }

    #[test]
    fn test_normalize_email_without_at() {
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("test@holmegrown.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("@holmegrown.com"));
        assert!(!is_valid_email("test@"));
        assert!(!is_valid_email("test@localhost"));
        assert!(!is_valid_email("te st@holmegrown.com"));
    }

    #[test]
    fn test_user_serialization_hides_secrets() {
        let user = User {
            id: 1,
            email: "test@holmegrown.com".to_string(),
            name: "Test".to_string(),
            phone: None,
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("is_superuser").is_none());
        assert_eq!(json["email"], "test@holmegrown.com");
    }
}
