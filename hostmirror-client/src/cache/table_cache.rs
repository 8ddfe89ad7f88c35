//! The per-table caching unit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use hostmirror_core::{
    HostmirrorResult, IntegrityError, StateError, TableEntity, TableName, Timestamp,
};

use super::source::RemoteTableSource;
use super::stats::{CacheStats, StatCounters};

/// Caches one logical table's full row set.
///
/// Three views are cached under three independent locks so that, for
/// example, a sorted-view read never blocks on an index rebuild:
///
/// - the raw row set, in server order;
/// - a sorted view in the entities' natural (`Ord`) order;
/// - a key -> entity index.
///
/// Each view populates lazily; the first read after construction or after
/// [`invalidate`](TableCache::invalidate) performs exactly one blocking
/// full-table fetch, and concurrent first readers block on that fetch rather
/// than issuing their own. A failed fetch leaves the cache unpopulated so
/// the next read retries.
///
/// All published views are immutable `Arc`s. A reader holding a view across
/// an invalidation keeps its coherent pre-invalidation snapshot; it is never
/// torn, only stale.
///
/// A panic inside `fetch_all` poisons the lock of the view being populated.
/// Reads on a poisoned view surface [`StateError::LockPoisoned`] rather
/// than panicking, and keep doing so: a std `Mutex` never un-poisons, so
/// this failure is one-way and the table has to be remirrored through a
/// fresh cache. [`invalidate`](TableCache::invalidate) still clears the
/// slots through the poison.
pub struct TableCache<E: TableEntity> {
    table: TableName,
    source: Arc<dyn RemoteTableSource<E>>,
    rows: Mutex<Option<Arc<Vec<E>>>>,
    sorted: Mutex<Option<Arc<Vec<E>>>>,
    index: Mutex<Option<Arc<HashMap<E::Key, E>>>>,
    populated_at: Mutex<Option<Timestamp>>,
    counters: StatCounters,
}

impl<E: TableEntity> TableCache<E> {
    /// Create an unpopulated cache wired to its remote source.
    pub fn new(table: TableName, source: Arc<dyn RemoteTableSource<E>>) -> Self {
        Self {
            table,
            source,
            rows: Mutex::new(None),
            sorted: Mutex::new(None),
            index: Mutex::new(None),
            populated_at: Mutex::new(None),
            counters: StatCounters::default(),
        }
    }

    /// The logical table this cache mirrors.
    pub fn table_name(&self) -> TableName {
        self.table
    }

    /// The raw row set, fetching it from the remote source if unpopulated.
    ///
    /// The fetch happens while holding the row-set lock, so a second caller
    /// arriving mid-fetch blocks and receives the result of that single
    /// fetch. On fetch failure the error propagates and the cache stays
    /// unpopulated.
    pub fn rows(&self) -> HostmirrorResult<Arc<Vec<E>>> {
        let mut slot = self.rows.lock().map_err(|_| StateError::LockPoisoned)?;
        if let Some(rows) = slot.as_ref() {
            self.counters.record_hit();
            return Ok(Arc::clone(rows));
        }

        self.counters.record_miss();
        let rows = Arc::new(self.source.fetch_all()?);
        self.counters.record_fetch();
        *slot = Some(Arc::clone(&rows));
        *self
            .populated_at
            .lock()
            .map_err(|_| StateError::LockPoisoned)? = Some(Utc::now());
        tracing::debug!(table = %self.table, rows = rows.len(), "fetched table snapshot");
        Ok(rows)
    }

    /// The row set in the entities' natural ascending order.
    ///
    /// Derived from [`rows`](TableCache::rows) on first call and cached
    /// under its own lock, so populating the sorted view and the unsorted
    /// view never contend.
    pub fn sorted_rows(&self) -> HostmirrorResult<Arc<Vec<E>>> {
        let mut slot = self.sorted.lock().map_err(|_| StateError::LockPoisoned)?;
        if let Some(sorted) = slot.as_ref() {
            self.counters.record_hit();
            return Ok(Arc::clone(sorted));
        }

        self.counters.record_miss();
        let rows = self.rows()?;
        let mut sorted: Vec<E> = rows.as_ref().clone();
        sorted.sort();
        let sorted = Arc::new(sorted);
        *slot = Some(Arc::clone(&sorted));
        Ok(sorted)
    }

    /// Look up one entity by key.
    ///
    /// The key index is built from the row set on first call and cached;
    /// after that this is a pure map lookup. A key absent from the table is
    /// `Ok(None)`.
    ///
    /// Two entities with equal keys in one snapshot are a fatal
    /// internal-consistency fault ([`IntegrityError::DuplicateKey`]): the
    /// server guarantees key uniqueness, so a violation is a protocol or
    /// server defect, and the index is left unpopulated rather than built
    /// with a silently dropped row.
    pub fn get(&self, key: &E::Key) -> HostmirrorResult<Option<E>> {
        let mut slot = self.index.lock().map_err(|_| StateError::LockPoisoned)?;
        let index = match slot.as_ref() {
            Some(index) => {
                self.counters.record_hit();
                Arc::clone(index)
            }
            None => {
                self.counters.record_miss();
                let rows = self.rows()?;
                let mut index: HashMap<E::Key, E> = HashMap::with_capacity(rows.len());
                for entity in rows.iter() {
                    let entity_key = entity.key();
                    if index.insert(entity_key.clone(), entity.clone()).is_some() {
                        return Err(IntegrityError::DuplicateKey {
                            table: self.table,
                            key: entity_key.to_string(),
                        }
                        .into());
                    }
                }
                let index = Arc::new(index);
                *slot = Some(Arc::clone(&index));
                index
            }
        };
        Ok(index.get(key).cloned())
    }

    /// Discard all cached views.
    ///
    /// Never fetches; the next read on any view repopulates lazily. Safe to
    /// call from any thread concurrently with in-flight reads. Clearing
    /// proceeds through poisoned locks: dropping cached state is always
    /// valid, whatever a panicked reader left behind.
    pub fn invalidate(&self) {
        *self.rows.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.sorted.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.index.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self
            .populated_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.counters.record_invalidation();
        tracing::debug!(table = %self.table, "cache invalidated");
    }

    /// Whether the raw row set is currently populated.
    pub fn is_populated(&self) -> bool {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// When the current row set was fetched, if populated.
    pub fn populated_at(&self) -> Option<Timestamp> {
        *self
            .populated_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of this cache's usage counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }
}

/// Type-erased view of one [`TableCache`].
///
/// The component that maps server "table changed" notifications to caches
/// dispatches through this, without knowing entity types.
pub trait CacheHandle: Send + Sync {
    /// The logical table the underlying cache mirrors.
    fn table_name(&self) -> TableName;

    /// Discard all cached views of the underlying cache.
    fn invalidate(&self);

    /// Whether the underlying cache currently holds a snapshot.
    fn is_populated(&self) -> bool;

    /// Usage counters of the underlying cache.
    fn stats(&self) -> CacheStats;
}

impl<E: TableEntity> CacheHandle for TableCache<E> {
    fn table_name(&self) -> TableName {
        TableCache::table_name(self)
    }

    fn invalidate(&self) {
        TableCache::invalidate(self)
    }

    fn is_populated(&self) -> bool {
        TableCache::is_populated(self)
    }

    fn stats(&self) -> CacheStats {
        TableCache::stats(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
