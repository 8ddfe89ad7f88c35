//! Per-table caching with at-most-one-fetch-per-epoch semantics.
//!
//! A [`TableCache`] owns three independently locked views over one table's
//! row set: the raw snapshot, a natural-order sorted view, and a key index.
//! All three populate lazily from a single full-table fetch and are cleared
//! together by [`TableCache::invalidate`]. Published views are immutable
//! `Arc`s, so a reader that started before an invalidation keeps a coherent
//! snapshot while later readers trigger a fresh fetch.

pub mod source;
pub mod stats;
pub mod table_cache;

pub use source::RemoteTableSource;
pub use stats::CacheStats;
pub use table_cache::{CacheHandle, TableCache};
