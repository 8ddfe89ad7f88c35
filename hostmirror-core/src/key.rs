//! Validated key types for mirrored table rows.
//!
//! Every mirrored row is addressed by exactly one key. Plain integer row ids
//! (`i32`, `i16`) are keys as-is; name-shaped keys are interned; structured
//! domain values validate their format once, in their constructor, and are
//! immutable after. Equal keys are `Eq`-equal and hash-consistent, which the
//! table cache relies on when building its key index.

use crate::error::ValidationError;
use crate::intern::intern;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Capabilities a type must supply to act as a table-cache key.
///
/// Equality and hashing drive the key index; ordering drives nothing today
/// but keeps keys usable in sorted collections alongside entities.
pub trait TableKey:
    Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
}

impl TableKey for i32 {}
impl TableKey for i16 {}
impl TableKey for InternedName {}
impl TableKey for AccountCode {}
impl TableKey for UserId {}
impl TableKey for GroupId {}
impl TableKey for PosixPath {}

// ============================================================================
// INTERNED NAME
// ============================================================================

/// An interned name-shaped key (hostnames, zone names, service names).
///
/// Construction goes through the process-wide interner, so equality can
/// short-circuit on pointer identity before falling back to a string compare.
#[derive(Clone)]
pub struct InternedName(Arc<str>);

impl InternedName {
    /// Intern and wrap a name. Names carry no format rules of their own;
    /// tables with format-constrained keys use the structured types below.
    pub fn new(value: &str) -> Self {
        Self(intern(value))
    }

    /// The interned string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for InternedName {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for InternedName {}

impl Hash for InternedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for InternedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for InternedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternedName({:?})", &*self.0)
    }
}

impl fmt::Display for InternedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for InternedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for InternedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}

// ============================================================================
// STRUCTURED DOMAIN KEYS
// ============================================================================

static ACCOUNT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]{1,31}$").expect("account code pattern"));

static USER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,31}$").expect("user id pattern"));

/// An account code: the billing-level identifier for one hosting account.
///
/// Format: 2 to 32 characters, uppercase letters, digits and underscore,
/// starting with a letter (e.g. `ACME`, `ACME_WEB2`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountCode(InternedName);

impl AccountCode {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        if ACCOUNT_CODE_RE.is_match(value) {
            Ok(Self(InternedName::new(value)))
        } else {
            Err(ValidationError::InvalidAccountCode {
                value: value.to_string(),
                reason: "must be 2-32 chars of [A-Z0-9_], starting with a letter".to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A platform user identifier (shell accounts, database users, mail users).
///
/// Format: 1 to 32 characters, lowercase letters, digits and underscore,
/// starting with a letter.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(InternedName);

impl UserId {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        if USER_ID_RE.is_match(value) {
            Ok(Self(InternedName::new(value)))
        } else {
            Err(ValidationError::InvalidUserId {
                value: value.to_string(),
                reason: "must be 1-32 chars of [a-z0-9_], starting with a letter".to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A platform group identifier. Same lexical rules as [`UserId`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(InternedName);

impl GroupId {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        if USER_ID_RE.is_match(value) {
            Ok(Self(InternedName::new(value)))
        } else {
            Err(ValidationError::InvalidGroupId {
                value: value.to_string(),
                reason: "must be 1-32 chars of [a-z0-9_], starting with a letter".to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// An absolute, normalized POSIX path key (home directories, doc roots).
///
/// Rules: starts with `/`, no NUL bytes, no empty segments (`//`), no `.`
/// or `..` segments, and no trailing slash except for the root itself.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PosixPath(String);

impl PosixPath {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let fail = |reason: &str| ValidationError::InvalidPosixPath {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if value.is_empty() {
            return Err(fail("must not be empty"));
        }
        if !value.starts_with('/') {
            return Err(fail("must be absolute"));
        }
        if value.contains('\0') {
            return Err(fail("must not contain NUL"));
        }
        if value == "/" {
            return Ok(Self(value.to_string()));
        }
        if value.ends_with('/') {
            return Err(fail("must not end with a slash"));
        }
        for segment in value[1..].split('/') {
            match segment {
                "" => return Err(fail("must not contain empty segments")),
                "." | ".." => return Err(fail("must not contain . or .. segments")),
                _ => {}
            }
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_key_impls {
    ($($name:ident),*) => {
        $(
            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($name), "({:?})"), self.as_str())
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl TryFrom<String> for $name {
                type Error = ValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(&value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.as_str().to_string()
                }
            }
        )*
    };
}

string_key_impls!(AccountCode, UserId, GroupId, PosixPath);

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_code_accepts_valid() {
        for value in ["ACME", "A1", "ACME_WEB2", "ZZ_9"] {
            assert!(AccountCode::new(value).is_ok(), "rejected {value:?}");
        }
    }

    #[test]
    fn test_account_code_rejects_invalid() {
        for value in ["", "A", "acme", "1ACME", "_ACME", "ACME-WEB", "ACME WEB"] {
            assert!(AccountCode::new(value).is_err(), "accepted {value:?}");
        }
        // 33 chars, one over the limit
        let long = format!("A{}", "B".repeat(32));
        assert!(AccountCode::new(&long).is_err());
    }

    #[test]
    fn test_user_id_accepts_valid() {
        for value in ["a", "joe", "web_user9", "x123"] {
            assert!(UserId::new(value).is_ok(), "rejected {value:?}");
        }
    }

    #[test]
    fn test_user_id_rejects_invalid() {
        for value in ["", "Joe", "9lives", "_joe", "joe.smith", "joe smith"] {
            assert!(UserId::new(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn test_group_id_same_rules_as_user_id() {
        assert!(GroupId::new("webgrp").is_ok());
        assert!(GroupId::new("WebGrp").is_err());
    }

    #[test]
    fn test_posix_path_accepts_valid() {
        for value in ["/", "/home", "/home/joe", "/var/www/site_1"] {
            assert!(PosixPath::new(value).is_ok(), "rejected {value:?}");
        }
    }

    #[test]
    fn test_posix_path_rejects_invalid() {
        for value in [
            "",
            "home/joe",
            "/home/",
            "/home//joe",
            "/home/./joe",
            "/home/../etc",
            "/home/\0joe",
        ] {
            assert!(PosixPath::new(value).is_err(), "accepted {value:?}");
        }
    }

    #[test]
    fn test_interned_name_equality_and_pointer_identity() {
        let a = InternedName::new("www3.example.com");
        let b = InternedName::new("www3.example.com");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_equal_keys_hash_consistently() {
        use std::collections::hash_map::DefaultHasher;

        let a = AccountCode::new("ACME").expect("valid code");
        let b = AccountCode::new("ACME").expect("valid code");
        let hash = |key: &AccountCode| {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_ordering_is_lexical() {
        let a = UserId::new("alice").expect("valid");
        let b = UserId::new("bob").expect("valid");
        assert!(a < b);
    }

    #[test]
    fn test_display_matches_input() {
        let code = AccountCode::new("ACME_WEB2").expect("valid");
        assert_eq!(code.to_string(), "ACME_WEB2");
        let path = PosixPath::new("/var/www").expect("valid");
        assert_eq!(path.to_string(), "/var/www");
    }

    #[test]
    fn test_serde_roundtrip_rejects_invalid() {
        let code: AccountCode = serde_json::from_str("\"ACME\"").expect("valid code");
        assert_eq!(code.as_str(), "ACME");
        assert_eq!(serde_json::to_string(&code).expect("serialize"), "\"ACME\"");

        let bad: Result<AccountCode, _> = serde_json::from_str("\"lowercase\"");
        assert!(bad.is_err());
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every string the account-code pattern generates is accepted, and
        /// construction preserves the literal exactly.
        #[test]
        fn prop_account_code_accepts_its_grammar(value in "[A-Z][A-Z0-9_]{1,31}") {
            let code = AccountCode::new(&value);
            prop_assert!(code.is_ok());
            let code = code.expect("valid");
            prop_assert_eq!(code.as_str(), value.as_str());
        }

        /// Strings containing characters outside the account-code alphabet
        /// are always rejected.
        #[test]
        fn prop_account_code_rejects_foreign_chars(
            prefix in "[A-Z]{1,4}",
            bad in "[^A-Z0-9_]{1}",
            suffix in "[A-Z0-9_]{0,4}",
        ) {
            let value = format!("{prefix}{bad}{suffix}");
            prop_assert!(AccountCode::new(&value).is_err());
        }

        /// User ids within the grammar always construct and roundtrip.
        #[test]
        fn prop_user_id_accepts_its_grammar(value in "[a-z][a-z0-9_]{0,31}") {
            let id = UserId::new(&value);
            prop_assert!(id.is_ok());
            prop_assert_eq!(id.expect("valid").to_string(), value);
        }

        /// Valid paths survive construction unchanged; equal literals compare
        /// equal and hash into the same bucket.
        #[test]
        fn prop_posix_path_roundtrip(segments in prop::collection::vec("[a-z0-9_]{1,8}", 1..6)) {
            let value = format!("/{}", segments.join("/"));
            let a = PosixPath::new(&value);
            prop_assert!(a.is_ok());
            let a = a.expect("valid");
            let b = PosixPath::new(&value).expect("valid");
            prop_assert_eq!(a.as_str(), value.as_str());
            prop_assert_eq!(a, b);
        }

        /// Interned names constructed from equal strings are always equal.
        #[test]
        fn prop_interned_name_equality(value in "[a-z0-9.]{1,24}") {
            let a = InternedName::new(&value);
            let b = InternedName::new(&value);
            prop_assert_eq!(a, b);
        }
    }
}
