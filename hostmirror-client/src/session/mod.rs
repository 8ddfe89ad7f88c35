//! Authenticated sessions: one identity's bundle of table caches.
//!
//! A [`Session`] ("connector") owns one [`TableCache`] per mirrored logical
//! table, a frozen name -> cache directory, and the locale of its
//! authenticated identity. Sessions are built declaratively: the protocol
//! layer registers one [`RemoteTableSource`] per table on a
//! [`SessionBuilder`], and `build()` freezes the directory. Only the caches
//! behind the directory mutate after that.

pub mod pool;

pub use pool::{SessionOpener, SessionPool};

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hostmirror_core::{
    HostmirrorResult, Locale, LookupError, MirroredEntity, SessionIdentity, StateError, TableName,
};
use uuid::Uuid;

use crate::cache::{CacheHandle, RemoteTableSource, TableCache};

/// Receives locale changes for one authenticated wire identity.
///
/// Implemented by the protocol layer; the platform formats error messages
/// server-side in the session's locale, so changes must reach the wire.
pub trait LocaleSink: Send + Sync {
    fn locale_changed(&self, locale: &Locale) -> HostmirrorResult<()>;
}

/// One registered table: the typed cache and its type-erased handle.
struct RegisteredTable {
    typed: Arc<dyn Any + Send + Sync>,
    handle: Arc<dyn CacheHandle>,
}

/// Builder for a [`Session`]; the session's "constructing" state.
///
/// Registration is declarative: one call per (table, entity type, source)
/// triple. Registering the same logical table twice is a
/// [`LookupError::DuplicateRegistration`].
pub struct SessionBuilder {
    identity: SessionIdentity,
    locale: Locale,
    locale_sink: Option<Arc<dyn LocaleSink>>,
    tables: HashMap<TableName, RegisteredTable>,
}

impl SessionBuilder {
    pub fn new(identity: SessionIdentity, locale: Locale) -> Self {
        Self {
            identity,
            locale,
            locale_sink: None,
            tables: HashMap::new(),
        }
    }

    /// Wire the sink that propagates locale changes to the remote identity.
    pub fn locale_sink(mut self, sink: Arc<dyn LocaleSink>) -> Self {
        self.locale_sink = Some(sink);
        self
    }

    /// Register the cache for `E::TABLE`, wired to its remote source.
    pub fn register<E: MirroredEntity>(
        mut self,
        source: Arc<dyn RemoteTableSource<E>>,
    ) -> HostmirrorResult<Self> {
        if self.tables.contains_key(&E::TABLE) {
            return Err(LookupError::DuplicateRegistration { table: E::TABLE }.into());
        }
        let cache = Arc::new(TableCache::new(E::TABLE, source));
        self.tables.insert(
            E::TABLE,
            RegisteredTable {
                typed: Arc::clone(&cache) as Arc<dyn Any + Send + Sync>,
                handle: cache,
            },
        );
        Ok(self)
    }

    /// Freeze the directory and move to the "ready" state.
    pub fn build(self) -> Session {
        let session_id = Uuid::now_v7();
        tracing::info!(
            %session_id,
            connect_as = %self.identity.connect_as(),
            authenticate_as = %self.identity.authenticate_as(),
            tables = self.tables.len(),
            "session ready"
        );
        Session {
            session_id,
            identity: self.identity,
            locale: RwLock::new(self.locale),
            locale_sink: self.locale_sink,
            tables: self.tables,
        }
    }
}

/// An authenticated identity's collection of table caches.
///
/// The name -> cache directory is immutable for the session's lifetime;
/// only cache contents change. There is no "closed" state: a session lives
/// until process teardown.
pub struct Session {
    session_id: Uuid,
    identity: SessionIdentity,
    locale: RwLock<Locale>,
    locale_sink: Option<Arc<dyn LocaleSink>>,
    tables: HashMap<TableName, RegisteredTable>,
}

impl Session {
    /// Start building a session for the given identity.
    pub fn builder(identity: SessionIdentity, locale: Locale) -> SessionBuilder {
        SessionBuilder::new(identity, locale)
    }

    /// Unique id of this session, for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The immutable (connect-as, authenticate-as) pair established at
    /// construction.
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// The typed cache mirroring `E::TABLE`.
    ///
    /// Requesting a table that was never wired into this session is
    /// programmer misuse and fails with [`LookupError::TableNotWired`].
    pub fn cache<E: MirroredEntity>(&self) -> HostmirrorResult<Arc<TableCache<E>>> {
        let registered = self
            .tables
            .get(&E::TABLE)
            .ok_or(LookupError::TableNotWired { table: E::TABLE })?;
        Arc::clone(&registered.typed)
            .downcast::<TableCache<E>>()
            .map_err(|_| LookupError::EntityTypeMismatch { table: E::TABLE }.into())
    }

    /// The type-erased handle for one table, for notification dispatch.
    pub fn handle(&self, table: TableName) -> HostmirrorResult<Arc<dyn CacheHandle>> {
        let registered = self
            .tables
            .get(&table)
            .ok_or(LookupError::TableNotWired { table })?;
        Ok(Arc::clone(&registered.handle))
    }

    /// Invalidate one table's cache by name.
    pub fn invalidate(&self, table: TableName) -> HostmirrorResult<()> {
        self.handle(table)?.invalidate();
        Ok(())
    }

    /// Invalidate every cache in this session.
    pub fn invalidate_all(&self) {
        for registered in self.tables.values() {
            registered.handle.invalidate();
        }
        tracing::debug!(session_id = %self.session_id, "all caches invalidated");
    }

    /// The logical tables wired into this session, in stable order.
    pub fn registered_tables(&self) -> Vec<TableName> {
        let mut tables: Vec<TableName> = self.tables.keys().copied().collect();
        tables.sort();
        tables
    }

    /// The session's current locale.
    pub fn locale(&self) -> HostmirrorResult<Locale> {
        Ok(self
            .locale
            .read()
            .map_err(|_| StateError::LockPoisoned)?
            .clone())
    }

    /// Change the session's locale.
    ///
    /// A no-op when unchanged. Otherwise the change is propagated to the
    /// underlying authenticated identity first, then recorded; caches are
    /// never touched, since locale affects message formatting only.
    pub fn set_locale(&self, locale: Locale) -> HostmirrorResult<()> {
        {
            let current = self.locale.read().map_err(|_| StateError::LockPoisoned)?;
            if *current == locale {
                return Ok(());
            }
        }
        if let Some(sink) = &self.locale_sink {
            sink.locale_changed(&locale)?;
        }
        let mut current = self.locale.write().map_err(|_| StateError::LockPoisoned)?;
        let previous = current.clone();
        *current = locale.clone();
        drop(current);
        tracing::debug!(session_id = %self.session_id, from = %previous, to = %locale, "locale changed");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
