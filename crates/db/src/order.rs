//! Ordering keys for calendar task lists
//!
//! Entries in a calendar are ordered by an optional signed 64-bit key. A null
//! key means "unordered": such an entry falls back to its creation instant,
//! expressed in the same epoch as the keys, when a list is sorted.
//!
//! Keys are seconds since the Apple reference date (2001-01-01T00:00:00Z), so
//! a key derived from a timestamp and a key stored explicitly can be compared
//! directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Milliseconds between the Unix epoch and 2001-01-01T00:00:00Z
pub const APPLE_EPOCH_MILLIS: i64 = 978_307_200_000;

/// Convert an instant to whole seconds since the Apple reference date.
///
/// Truncates toward zero, so all instants within the same second map to the
/// same value.
pub fn to_apple_epoch(instant: DateTime<Utc>) -> i64 {
    (instant.timestamp_millis() - APPLE_EPOCH_MILLIS) / 1000
}

/// Convert seconds since the Apple reference date back to an instant.
///
/// Returns `None` if the value is outside chrono's representable range.
pub fn from_apple_epoch(seconds: i64) -> Option<DateTime<Utc>> {
    seconds
        .checked_mul(1000)
        .and_then(|millis| millis.checked_add(APPLE_EPOCH_MILLIS))
        .and_then(DateTime::from_timestamp_millis)
}

/// Sort key of an entry within a calendar.
///
/// Wraps an optional `i64`. Comparison places every null key after every
/// non-null key; two null keys compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(Option<i64>);

impl OrderKey {
    /// The null key
    pub const UNORDERED: OrderKey = OrderKey(None);

    /// Create a non-null key
    pub const fn new(value: i64) -> Self {
        OrderKey(Some(value))
    }

    /// The raw key value, `None` when unordered
    pub const fn value(&self) -> Option<i64> {
        self.0
    }

    /// Whether this key is null
    pub const fn is_unordered(&self) -> bool {
        self.0.is_none()
    }

    /// Effective position of an entry with this key and the given creation instant.
    pub fn position(&self, created: DateTime<Utc>) -> i64 {
        self.0.unwrap_or_else(|| to_apple_epoch(created))
    }
}

impl From<Option<i64>> for OrderKey {
    fn from(value: Option<i64>) -> Self {
        OrderKey(value)
    }
}

impl From<i64> for OrderKey {
    fn from(value: i64) -> Self {
        OrderKey(Some(value))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "-"),
        }
    }
}

/// The entry a new key is computed against.
///
/// Reference values are effective positions (see [`OrderKey::position`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// The list has no other entries
    None,
    /// Insert directly before the entry at `reference`
    Above(i64),
    /// Insert directly after the entry at `reference`
    Below {
        reference: i64,
        /// Whether the reference entry is the last one in the list
        last: bool,
    },
}

/// Compute the ordering key for an entry created at `created`.
///
/// - With no neighbor the key is null.
/// - Above a reference the key is `reference - 1`, whatever the creation
///   instant, so the entry strictly precedes it.
/// - Below the last entry the key stays null when the creation instant already
///   sorts after the reference; otherwise it is `reference + 1`.
/// - Below an entry that has a successor the key is always `reference + 1`.
///   The caller keeps the successor at least two past the reference so the
///   key lands strictly between them.
pub fn compute_key(created: DateTime<Utc>, neighbor: Neighbor) -> OrderKey {
    match neighbor {
        Neighbor::None => OrderKey::UNORDERED,
        Neighbor::Above(reference) => OrderKey::new(reference.saturating_sub(1)),
        Neighbor::Below {
            reference,
            last: true,
        } if to_apple_epoch(created) > reference => OrderKey::UNORDERED,
        Neighbor::Below { reference, .. } => OrderKey::new(reference.saturating_add(1)),
    }
}
