//! Process-wide session deduplication by credential tuple.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hostmirror_core::{
    CredentialKey, DaemonQualifier, HostmirrorResult, Locale, Password, StateError, UserId,
};

use super::Session;

/// The external collaborator that authenticates a credential tuple and wires
/// the resulting session's table sources.
///
/// `open` performs the underlying authentication and returns a ready
/// [`Session`] (typically via [`super::SessionBuilder`], one registered
/// [`crate::cache::RemoteTableSource`] per mirrored table). An error means
/// authentication or wiring failed; the pool registers nothing in that case.
pub trait SessionOpener: Send + Sync {
    fn open(&self, credentials: &CredentialKey, locale: &Locale) -> HostmirrorResult<Arc<Session>>;
}

/// Deduplicates live sessions per credential tuple ("connector factory").
///
/// At most one session exists per (connect-as, authenticate-as, password,
/// daemon-qualifier) tuple. The whole lookup-or-create sequence runs under
/// one pool-wide lock: session creation already performs a comparatively
/// expensive authentication call and identities are few relative to cache
/// reads, so a coarse lock that rules out lost-creation races outweighs
/// fine-grained parallelism here.
///
/// The pool is process-scoped and never evicts; a session lives until
/// process teardown.
pub struct SessionPool {
    opener: Arc<dyn SessionOpener>,
    sessions: Mutex<HashMap<CredentialKey, Arc<Session>>>,
}

impl SessionPool {
    pub fn new(opener: Arc<dyn SessionOpener>) -> Self {
        Self {
            opener,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session for a credential tuple, creating it on first use.
    ///
    /// A pool hit updates the existing session's locale in place (locale is
    /// not part of the tuple) and returns it. A miss authenticates via the
    /// opener, registers the new session under the tuple and returns it;
    /// a failed open registers nothing, so the next call retries.
    pub fn session(
        &self,
        locale: Locale,
        connect_as: UserId,
        authenticate_as: UserId,
        password: Password,
        daemon: Option<DaemonQualifier>,
    ) -> HostmirrorResult<Arc<Session>> {
        let key = CredentialKey {
            connect_as,
            authenticate_as,
            password,
            daemon,
        };
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| StateError::LockPoisoned)?;

        if let Some(existing) = sessions.get(&key) {
            existing.set_locale(locale)?;
            tracing::debug!(session_id = %existing.session_id(), "session reused from pool");
            return Ok(Arc::clone(existing));
        }

        let session = self.opener.open(&key, &locale)?;
        tracing::info!(session_id = %session.session_id(), "session created");
        sessions.insert(key, Arc::clone(&session));
        Ok(session)
    }

    /// Force creation of a fresh session, replacing any pooled entry for the
    /// tuple.
    ///
    /// Used when a caller requires a session with no inherited cache state,
    /// regardless of what the pool holds.
    pub fn new_session(
        &self,
        locale: Locale,
        connect_as: UserId,
        authenticate_as: UserId,
        password: Password,
        daemon: Option<DaemonQualifier>,
    ) -> HostmirrorResult<Arc<Session>> {
        let key = CredentialKey {
            connect_as,
            authenticate_as,
            password,
            daemon,
        };
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| StateError::LockPoisoned)?;

        let session = self.opener.open(&key, &locale)?;
        let replaced = sessions.insert(key, Arc::clone(&session));
        tracing::info!(
            session_id = %session.session_id(),
            replaced = replaced.is_some(),
            "session force-created"
        );
        Ok(session)
    }

    /// Number of live sessions currently pooled.
    pub fn session_count(&self) -> HostmirrorResult<usize> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| StateError::LockPoisoned)?
            .len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
