//! Shared forum data model observed by every UI surface.
//!
//! # Responsibility
//! - Define the records held in store slices (communities, posts, comments,
//!   session user, votes).
//! - Keep JSON field naming stable, since rendered snapshots are compared
//!   byte-for-byte across prerender and first client paint.
//!
//! # Invariants
//! - Ids are opaque strings; cross-record references (`community_id`,
//!   `post_id`) are soft and may dangle.
//! - Timestamps are Unix epoch milliseconds.

pub mod community;
pub mod content;
pub mod user;
pub mod vote;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in epoch milliseconds.
///
/// Falls back to `0` if the system clock is set before the Unix epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Generates a fresh opaque record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
