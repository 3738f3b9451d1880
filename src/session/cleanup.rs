//! Expiry rules for persisted session state
//!
//! A record expires 24 hours after it completed, or 24 hours after it
//! started if it never completed. The comparison is strict: a record exactly
//! 24 hours old is kept.

use crate::session::SessionRecord;

/// Expiry window in milliseconds (24 hours)
pub const EXPIRY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Why a stored record should be purged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Completed more than [`EXPIRY_WINDOW_MS`] ago
    CompletedLongAgo,
    /// Started more than [`EXPIRY_WINDOW_MS`] ago and never completed
    Abandoned,
}

/// Classify a decoded record against `now_millis`.
///
/// Returns `None` while the record is within its window, or when it lacks
/// the timestamp its state would be measured from.
///
/// # Examples
///
/// ```
/// use voxdash::session::cleanup::{expiry_of, Expiry, EXPIRY_WINDOW_MS};
/// use voxdash::session::SessionRecord;
///
/// let record = SessionRecord::completed_at(0);
/// assert_eq!(expiry_of(&record, EXPIRY_WINDOW_MS), None);
/// assert_eq!(expiry_of(&record, EXPIRY_WINDOW_MS + 1), Some(Expiry::CompletedLongAgo));
/// ```
pub fn expiry_of(record: &SessionRecord, now_millis: i64) -> Option<Expiry> {
    if record.is_completed {
        let completed = record.completed_time?;
        return elapsed_beyond_window(completed, now_millis).then_some(Expiry::CompletedLongAgo);
    }

    let started = record.start_time?;
    elapsed_beyond_window(started, now_millis).then_some(Expiry::Abandoned)
}

fn elapsed_beyond_window(since: i64, now_millis: i64) -> bool {
    now_millis.saturating_sub(since) > EXPIRY_WINDOW_MS
}
