//! The remote table-access boundary the cache populates from.

use hostmirror_core::{HostmirrorResult, TableEntity};

/// Fetches the full current row set for one logical table.
///
/// One instance exists per mirrored table, selected at session-construction
/// time. Implementations live in the protocol layer; the cache only requires
/// that a fetch return a *complete*, internally key-unique snapshot or fail.
/// Partial results are not supported: a failed fetch leaves the cache
/// unpopulated and the next read retries.
///
/// Timeout and retry policy belong here, not in the cache; the cache calls
/// `fetch_all` synchronously under the lock of the view being populated.
pub trait RemoteTableSource<E: TableEntity>: Send + Sync {
    /// Fetch the complete current snapshot of the table.
    fn fetch_all(&self) -> HostmirrorResult<Vec<E>>;
}
