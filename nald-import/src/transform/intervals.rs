//! Temporal interval merging
//!
//! NALD stores one row per historical edit, so the same logical association
//! (say, an address held across several licence-version edits) appears as a
//! pile of overlapping date ranges. This module collapses them into the
//! widest range each entity was known to be valid for: per partition key,
//! start is the earliest observed start and end the latest observed
//! termination.
//!
//! End-combination rule: a merged end is open (`None`) only when every
//! contributing row is open. A present end date always wins over an absent
//! one, and two present end dates take the maximum. The legacy
//! implementation let an open row reset an already-closed interval back to
//! open when rows arrived out of chronological order; that made the result
//! order-dependent and is deliberately not reproduced. With min/max
//! accumulation the merge is order-independent and idempotent.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::hash::Hash;

/// A possibly half-open date interval. `end_date = None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A row's own end date: the earliest of its candidate termination events
/// (effective-end, expiry, revocation, lapse). An entity stops being valid
/// at the first terminating event recorded against it. All candidates
/// absent means the row is open-ended.
pub fn row_end_date<I>(candidates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    candidates.into_iter().flatten().min()
}

/// Combine two merged end dates. `None` survives only when both sides are
/// open; otherwise the latest known termination wins.
pub fn merge_end_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (None, None) => None,
        (Some(date), None) | (None, Some(date)) => Some(date),
        (Some(a), Some(b)) => Some(a.max(b)),
    }
}

/// Combine two merged start dates, keeping the earliest
pub fn merge_start_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (None, None) => None,
        (Some(date), None) | (None, Some(date)) => Some(date),
        (Some(a), Some(b)) => Some(a.min(b)),
    }
}

/// Collapse a set of rows into one merged interval per partition key.
///
/// Rows are processed in start-date order (ties keep arrival order), each
/// contributing its start and its own end date (see [`row_end_date`]) to the
/// accumulator for its key. Keys with no rows are absent from the output,
/// never defaulted.
pub fn merge_intervals<R, K, FK, FS, FE>(
    rows: &[R],
    key_fn: FK,
    start_fn: FS,
    end_fn: FE,
) -> HashMap<K, DateRange>
where
    K: Eq + Hash,
    FK: Fn(&R) -> K,
    FS: Fn(&R) -> Option<NaiveDate>,
    FE: Fn(&R) -> Option<NaiveDate>,
{
    let mut ordered: Vec<&R> = rows.iter().collect();
    // Stable sort: rows with equal (or absent) start dates keep arrival order
    ordered.sort_by_key(|row| start_fn(row));

    let mut merged: HashMap<K, DateRange> = HashMap::new();
    for row in ordered {
        let entry = merged.entry(key_fn(row)).or_default();
        entry.start_date = merge_start_date(entry.start_date, start_fn(row));
        entry.end_date = merge_end_date(entry.end_date, end_fn(row));
    }
    merged
}
