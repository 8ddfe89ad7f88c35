//! Logical table names and the entity traits the cache is generic over.

use crate::key::TableKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named, server-authoritative relational collection.
///
/// This is the dispatch token for everything table-shaped: cache directory
/// lookups inside a session and routing of server change notifications to
/// the right cache's `invalidate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Accounts,
    Users,
    Groups,
    Hosts,
    Databases,
    DatabaseUsers,
    Domains,
    Zones,
    ZoneRecords,
    MailAddresses,
    MailLists,
    Packages,
    Resources,
    Permissions,
}

impl TableName {
    /// All logical tables, in stable declaration order.
    pub const ALL: [TableName; 14] = [
        TableName::Accounts,
        TableName::Users,
        TableName::Groups,
        TableName::Hosts,
        TableName::Databases,
        TableName::DatabaseUsers,
        TableName::Domains,
        TableName::Zones,
        TableName::ZoneRecords,
        TableName::MailAddresses,
        TableName::MailLists,
        TableName::Packages,
        TableName::Resources,
        TableName::Permissions,
    ];

    /// The wire spelling of this table name.
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Accounts => "accounts",
            TableName::Users => "users",
            TableName::Groups => "groups",
            TableName::Hosts => "hosts",
            TableName::Databases => "databases",
            TableName::DatabaseUsers => "database_users",
            TableName::Domains => "domains",
            TableName::Zones => "zones",
            TableName::ZoneRecords => "zone_records",
            TableName::MailAddresses => "mail_addresses",
            TableName::MailLists => "mail_lists",
            TableName::Packages => "packages",
            TableName::Resources => "resources",
            TableName::Permissions => "permissions",
        }
    }

    /// Parse a wire spelling back to a table name.
    ///
    /// Returns `None` for unknown names; a notification for a table this
    /// client version does not know about is dropped by the caller, not an
    /// error here.
    pub fn from_str(value: &str) -> Option<TableName> {
        TableName::ALL
            .iter()
            .copied()
            .find(|table| table.as_str() == value)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable snapshot of one remote row, associated with exactly one key.
///
/// `Ord` supplies the natural ordering used by the sorted row view. Within
/// one table snapshot the server guarantees at most one entity per key; the
/// cache enforces this at index-build time.
pub trait TableEntity: Clone + Ord + Send + Sync + 'static {
    type Key: TableKey;

    /// The key addressing this row within its table.
    fn key(&self) -> Self::Key;
}

/// A [`TableEntity`] pinned to the logical table it mirrors.
///
/// The session directory registers caches under `Self::TABLE`, replacing the
/// per-table subclass explosion of older clients with one generic cache and
/// a declarative registration list.
pub trait MirroredEntity: TableEntity {
    const TABLE: TableName;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_roundtrip_all() {
        for table in TableName::ALL {
            assert_eq!(TableName::from_str(table.as_str()), Some(table));
        }
    }

    #[test]
    fn test_table_name_from_str_unknown() {
        assert_eq!(TableName::from_str("flux_capacitors"), None);
        assert_eq!(TableName::from_str(""), None);
    }

    #[test]
    fn test_table_name_display_matches_as_str() {
        assert_eq!(TableName::DatabaseUsers.to_string(), "database_users");
        assert_eq!(TableName::Hosts.to_string(), "hosts");
    }

    #[test]
    fn test_table_name_all_distinct() {
        use std::collections::HashSet;
        let names: HashSet<&str> = TableName::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names.len(), TableName::ALL.len());
    }
}
