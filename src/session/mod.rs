//! Dashboard session state machine
//!
//! [`DashboardSession`] interprets the persisted session record and
//! conversation history to decide whether the dashboard runs in
//! [`Mode::Interactive`] or [`Mode::ReadOnly`], and owns the lifecycle
//! transitions that move between them:
//!
//! ```text
//!   (empty) --activate--> live --complete--> completed --read--> (empty)
//!      ^                   |                    |
//!      +------reset--------+-------reset--------+
//!      +------expiry (24h) cleanup on any read--+
//! ```
//!
//! Reads heal corrupt or stale state in place: a record that cannot be
//! decoded, or one older than the expiry window, is deleted together with
//! the conversation history and the dashboard falls back to read-only.
//! Corruption is never reported to the caller as an error.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::store::{KeyValueStore, CONVERSATION_STORAGE_KEY, SESSION_STATE_KEY};

pub mod cleanup;
pub mod clock;
pub mod mode;
pub mod permissions;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use mode::{Mode, ModeDescription, RouteQuery, Tone};
pub use permissions::{permissions_for, PermissionSet};
pub use record::{SessionId, SessionRecord};

use cleanup::expiry_of;
use record::Slot;

/// Options for [`DashboardSession::activate_interactive_mode`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateOptions {
    /// Server-side analysis session this dashboard run belongs to
    pub session_id: Option<SessionId>,
    /// Activation follows a voice upload
    pub from_upload: bool,
}

impl ActivateOptions {
    pub fn with_session_id(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }
}

/// Session-mode state machine over an injected key-value store.
///
/// # Examples
///
/// ```
/// use voxdash::session::{ActivateOptions, DashboardSession, Mode, RouteQuery};
/// use voxdash::store::MemoryStore;
///
/// # fn main() -> voxdash::error::Result<()> {
/// let session = DashboardSession::new(MemoryStore::new());
/// assert_eq!(session.derive_mode(&RouteQuery::default()), Mode::ReadOnly);
///
/// session.activate_interactive_mode(ActivateOptions::with_session_id("s1"))?;
/// assert_eq!(session.derive_mode(&RouteQuery::default()), Mode::Interactive);
///
/// session.complete_conversation()?;
/// assert_eq!(session.derive_mode(&RouteQuery::default()), Mode::ReadOnly);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DashboardSession<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> DashboardSession<S> {
    /// Create a state machine reading wall-clock time
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a state machine with an explicit time source
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Derive the current dashboard mode.
    ///
    /// Evaluation order, first match wins:
    ///
    /// 1. Expired or corrupt state is purged.
    /// 2. A `fromUpload` route hint means interactive.
    /// 3. A malformed record is purged (read-only); a completed record is
    ///    purged because the user is revisiting a finished session
    ///    (read-only); a live record means interactive.
    /// 4. A non-empty conversation history means interactive.
    /// 5. Otherwise read-only.
    pub fn derive_mode(&self, route: &RouteQuery) -> Mode {
        if self.cleanup_expired_sessions() {
            tracing::debug!("Stale session state purged before deriving mode");
        }

        if route.from_upload {
            return Mode::Interactive;
        }

        match self.read_record() {
            Slot::Malformed(reason) => {
                tracing::warn!("Session state is malformed, resetting: {}", reason);
                self.purge();
                return Mode::ReadOnly;
            }
            Slot::Present(record) if record.is_completed => {
                tracing::info!(
                    session_id = ?record.session_id(),
                    "Revisiting a completed session, clearing it"
                );
                self.purge();
                return Mode::ReadOnly;
            }
            Slot::Present(record) if record.is_live() => return Mode::Interactive,
            Slot::Present(_) | Slot::Absent => {}
        }

        if self.conversation_len() > 0 {
            return Mode::Interactive;
        }

        Mode::ReadOnly
    }

    /// Re-derive the mode after an external change to the store.
    pub fn refresh_mode(&self, route: &RouteQuery) -> Mode {
        let mode = self.derive_mode(route);
        tracing::debug!(%mode, "Dashboard mode refreshed");
        mode
    }

    pub fn is_interactive(&self, route: &RouteQuery) -> bool {
        self.derive_mode(route).is_interactive()
    }

    pub fn is_read_only(&self, route: &RouteQuery) -> bool {
        self.derive_mode(route).is_read_only()
    }

    /// Capabilities for the mode the route currently derives to
    pub fn permissions(&self, route: &RouteQuery) -> PermissionSet {
        permissions_for(self.derive_mode(route))
    }

    /// Purge session state that is corrupt or past the expiry window.
    ///
    /// Returns `true` when state was deleted. Runs at the start of every
    /// [`derive_mode`](Self::derive_mode) so no external scheduler is needed.
    pub fn cleanup_expired_sessions(&self) -> bool {
        match self.read_record() {
            Slot::Absent => false,
            Slot::Malformed(reason) => {
                tracing::warn!("Discarding unreadable session state: {}", reason);
                self.purge();
                true
            }
            Slot::Present(record) => match expiry_of(&record, self.clock.now_millis()) {
                Some(expiry) => {
                    tracing::info!(?expiry, "Session state expired, clearing it");
                    self.purge();
                    true
                }
                None => false,
            },
        }
    }

    /// Start a live session, overwriting any existing record.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the record cannot be written
    pub fn activate_interactive_mode(&self, options: ActivateOptions) -> Result<()> {
        let record = SessionRecord::activated(
            self.clock.now_millis(),
            options.session_id,
            options.from_upload,
        );
        self.write_record(&record)?;
        tracing::info!(
            session_id = ?record.session_id(),
            from_upload = options.from_upload,
            "Interactive mode activated"
        );
        Ok(())
    }

    /// Finish the conversation and switch to read-only on the next read.
    ///
    /// The conversation history is dropped. An existing record is marked
    /// completed; an absent or unreadable one is replaced by a minimal
    /// completed record. Completing an already completed record keeps its
    /// original completion time, so retries have no further effect.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the store rejects a write
    pub fn complete_conversation(&self) -> Result<()> {
        self.store.remove(CONVERSATION_STORAGE_KEY)?;

        let now = self.clock.now_millis();
        let record = match self.read_record() {
            Slot::Present(mut record) => {
                if !(record.is_completed && record.completed_time.is_some()) {
                    record.is_completed = true;
                    record.completed_time = Some(now);
                }
                record
            }
            Slot::Absent => SessionRecord::completed_at(now),
            Slot::Malformed(reason) => {
                tracing::warn!("Replacing unreadable session state on completion: {}", reason);
                SessionRecord::completed_at(now)
            }
        };

        self.write_record(&record)?;
        tracing::info!("Conversation completed, dashboard switches to read-only");
        Ok(())
    }

    /// Drop all session state.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the store rejects a removal
    pub fn reset_to_read_only_mode(&self) -> Result<()> {
        self.store.remove(CONVERSATION_STORAGE_KEY)?;
        self.store.remove(SESSION_STATE_KEY)?;
        tracing::info!("Dashboard reset to read-only mode");
        Ok(())
    }

    /// Decoded session record, without any cleanup side effects.
    ///
    /// Returns `None` when the record is absent or unreadable.
    pub fn session_record(&self) -> Option<SessionRecord> {
        match self.read_record() {
            Slot::Present(record) => Some(record),
            Slot::Absent | Slot::Malformed(_) => None,
        }
    }

    /// Append one chat message to the conversation history.
    ///
    /// An unreadable history is replaced. Returns the new history length.
    ///
    /// # Errors
    ///
    /// Returns `VoxdashError::Storage` if the store rejects the write
    pub fn append_conversation_message(&self, message: Value) -> Result<usize> {
        let mut history = match self.read_history() {
            Slot::Present(history) => history,
            Slot::Absent => Vec::new(),
            Slot::Malformed(reason) => {
                tracing::warn!("Replacing unreadable conversation history: {}", reason);
                Vec::new()
            }
        };
        history.push(message);
        self.store
            .set(CONVERSATION_STORAGE_KEY, &serde_json::to_string(&history)?)?;
        Ok(history.len())
    }

    /// Number of messages in the stored conversation history.
    ///
    /// Absent or unreadable history counts as empty; it is left in place.
    pub fn conversation_len(&self) -> usize {
        match self.read_history() {
            Slot::Present(history) => history.len(),
            Slot::Absent => 0,
            Slot::Malformed(reason) => {
                tracing::warn!("Conversation history is unreadable: {}", reason);
                0
            }
        }
    }

    fn read_record(&self) -> Slot<SessionRecord> {
        Slot::decode(self.read_raw(SESSION_STATE_KEY))
    }

    fn read_history(&self) -> Slot<Vec<Value>> {
        Slot::decode(self.read_raw(CONVERSATION_STORAGE_KEY))
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read '{}' from store: {:#}", key, e);
                None
            }
        }
    }

    fn write_record(&self, record: &SessionRecord) -> Result<()> {
        self.store
            .set(SESSION_STATE_KEY, &serde_json::to_string(record)?)
    }

    fn purge(&self) {
        for key in [SESSION_STATE_KEY, CONVERSATION_STORAGE_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to remove '{}' from store: {:#}", key, e);
            }
        }
    }
}
