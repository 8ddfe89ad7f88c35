//! Identity, credential and locale types for authenticated sessions.

use crate::error::ValidationError;
use crate::key::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A display locale, `language` plus optional `country` (`en`, `en_US`).
///
/// Locale affects message formatting in collaborating components only; it
/// never influences mirrored row data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Parse a locale literal such as `en` or `en_US`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let fail = |reason: &str| ValidationError::InvalidLocale {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (language, country) = match value.split_once('_') {
            Some((lang, country)) => (lang, Some(country)),
            None => (value, None),
        };
        if language.len() < 2
            || language.len() > 8
            || !language.chars().all(|c| c.is_ascii_lowercase())
        {
            return Err(fail("language must be 2-8 lowercase ASCII letters"));
        }
        if let Some(country) = country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(fail("country must be 2 uppercase ASCII letters"));
            }
        }
        Ok(Self {
            language: language.to_string(),
            country: country.map(str::to_string),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            country: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => f.write_str(&self.language),
        }
    }
}

/// A password, cleared of accidental exposure: `Debug` and `Display` redact.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Deliberately explicit accessor for the one place that sends the
    /// password over the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Selects which daemon a session should target when an account spans
/// several physical hosts. Opaque to the pool beyond equality and hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaemonQualifier(String);

impl DaemonQualifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DaemonQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The immutable (connect-as, authenticate-as) pair of one session.
///
/// `connect_as` is the identity that opened the wire connection;
/// `authenticate_as` is the identity whose permissions apply. They differ
/// when an administrator switches into a customer account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    connect_as: UserId,
    authenticate_as: UserId,
}

impl SessionIdentity {
    pub fn new(connect_as: UserId, authenticate_as: UserId) -> Self {
        Self {
            connect_as,
            authenticate_as,
        }
    }

    pub fn connect_as(&self) -> &UserId {
        &self.connect_as
    }

    pub fn authenticate_as(&self) -> &UserId {
        &self.authenticate_as
    }

    /// True when the session runs with switched permissions.
    pub fn is_switched(&self) -> bool {
        self.connect_as != self.authenticate_as
    }
}

/// The pool key: at most one live session exists per distinct tuple.
///
/// Locale is deliberately not part of the key; a pool hit updates the
/// existing session's locale in place instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub connect_as: UserId,
    pub authenticate_as: UserId,
    pub password: Password,
    pub daemon: Option<DaemonQualifier>,
}

impl CredentialKey {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(self.connect_as.clone(), self.authenticate_as.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::new(name).expect("valid user id")
    }

    #[test]
    fn test_locale_parse_language_only() {
        let locale = Locale::parse("fr").expect("valid locale");
        assert_eq!(locale.language(), "fr");
        assert_eq!(locale.country(), None);
        assert_eq!(locale.to_string(), "fr");
    }

    #[test]
    fn test_locale_parse_with_country() {
        let locale = Locale::parse("en_US").expect("valid locale");
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.country(), Some("US"));
        assert_eq!(locale.to_string(), "en_US");
    }

    #[test]
    fn test_locale_parse_rejects_malformed() {
        for value in ["", "E", "en_us", "en_USA", "EN_US", "e"] {
            assert!(Locale::parse(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn test_locale_default_is_en_us() {
        assert_eq!(Locale::default().to_string(), "en_US");
    }

    #[test]
    fn test_password_debug_redacts() {
        let password = Password::new("hunter2");
        assert_eq!(format!("{:?}", password), "Password(***)");
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn test_session_identity_switched() {
        let same = SessionIdentity::new(user("joe"), user("joe"));
        assert!(!same.is_switched());

        let switched = SessionIdentity::new(user("admin"), user("joe"));
        assert!(switched.is_switched());
    }

    #[test]
    fn test_credential_key_equality() {
        let key = CredentialKey {
            connect_as: user("admin"),
            authenticate_as: user("joe"),
            password: Password::new("hunter2"),
            daemon: Some(DaemonQualifier::new("rack1")),
        };
        assert_eq!(key, key.clone());

        let other_daemon = CredentialKey {
            daemon: Some(DaemonQualifier::new("rack2")),
            ..key.clone()
        };
        assert_ne!(key, other_daemon);

        let other_password = CredentialKey {
            password: Password::new("swordfish"),
            ..key.clone()
        };
        assert_ne!(key, other_password);
    }

    #[test]
    fn test_credential_key_identity() {
        let key = CredentialKey {
            connect_as: user("admin"),
            authenticate_as: user("joe"),
            password: Password::new("hunter2"),
            daemon: None,
        };
        let identity = key.identity();
        assert_eq!(identity.connect_as(), &user("admin"));
        assert_eq!(identity.authenticate_as(), &user("joe"));
        assert!(identity.is_switched());
    }
}
