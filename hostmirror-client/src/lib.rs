//! Hostmirror Client - cached table mirror and session pool.
//!
//! This crate mirrors server-authoritative relational tables of a remote
//! hosting-management platform. Each logical table is fetched whole exactly
//! once, indexed by key, and served from memory until a server-originated
//! change notification invalidates it. Live sessions are deduplicated per
//! credential tuple, so repeated lookups across an entire process share one
//! authenticated identity and one set of caches.
//!
//! # Layering
//!
//! - [`cache`] - the per-table caching unit ([`cache::TableCache`]) and the
//!   [`cache::RemoteTableSource`] boundary it populates from.
//! - [`session`] - one authenticated identity's bundle of caches
//!   ([`session::Session`]) and the process-wide [`session::SessionPool`].
//!
//! The remote protocol itself (fetch RPCs, wire encoding, notification
//! delivery) lives behind the [`cache::RemoteTableSource`] and
//! [`session::SessionOpener`] traits; this crate never implements it.

pub mod cache;
pub mod session;

pub use cache::{CacheHandle, CacheStats, RemoteTableSource, TableCache};
pub use session::{LocaleSink, Session, SessionBuilder, SessionOpener, SessionPool};
