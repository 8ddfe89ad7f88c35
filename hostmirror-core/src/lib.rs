//! Hostmirror Core - Key, Identity and Table Types
//!
//! Pure data types with validation at construction. The client crate depends
//! on this; this crate contains no caching or session logic.
//!
//! Every remote row mirrored by the client is addressed by a key from this
//! crate: plain integer row ids, interned names, or one of the structured
//! domain values (account codes, user and group identifiers, POSIX paths).
//! Keys validate their format in their constructor and are immutable after.

pub mod error;
pub mod identity;
pub mod intern;
pub mod key;
pub mod table;

pub use error::{
    AuthError, HostmirrorError, HostmirrorResult, IntegrityError, LookupError, RemoteError,
    StateError, ValidationError,
};
pub use identity::{CredentialKey, DaemonQualifier, Locale, Password, SessionIdentity};
pub use intern::intern;
pub use key::{AccountCode, GroupId, InternedName, PosixPath, TableKey, UserId};
pub use table::{MirroredEntity, TableEntity, TableName};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
