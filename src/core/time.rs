//! Shared timestamp helpers for message freshness and audit events.

use ulid::Ulid;

/// Current unix-epoch seconds.
pub fn now_epoch_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    format!("{}Z", now_epoch_secs())
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// True when a message sent at `sent_at` is older than `threshold_secs` at `now`.
///
/// A zero threshold disables the check. Timestamps from the future count as fresh.
pub fn is_stale(sent_at: u64, now: u64, threshold_secs: u64) -> bool {
    threshold_secs > 0 && now.saturating_sub(sent_at) > threshold_secs
}
