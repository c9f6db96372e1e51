//! Derived views - pure functions over collection snapshots.
//!
//! Nothing here mutates its input or fails; results are recomputed on demand
//! and never persisted.

use std::cmp::Ordering;
use std::hash::Hash;

use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;

use crate::record::{FieldValue, Record};

/// Sort order for [`sort_by`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Case-insensitive substring match over the named text fields.
///
/// List fields (e.g. `tags`) match when any element matches. An empty or
/// whitespace-only query returns every record in original order.
pub fn filter_by_text<R: Record>(records: &[R], query: &str, fields: &[&str]) -> Vec<R> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            fields.iter().any(|name| {
                record
                    .field(name)
                    .map(|value| {
                        value
                            .texts()
                            .iter()
                            .any(|text| text.to_lowercase().contains(&needle))
                    })
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect()
}

/// Exact-match equality on one field. Unknown fields match nothing.
pub fn filter_by_field<R: Record>(records: &[R], field: &str, value: &FieldValue<'_>) -> Vec<R> {
    records
        .iter()
        .filter(|record| record.field(field).as_ref() == Some(value))
        .cloned()
        .collect()
}

/// Group records by key. Groups appear in the order their first member was
/// seen, and members keep their original relative order.
pub fn group_by<R, K, F>(records: &[R], key_fn: F) -> IndexMap<K, Vec<R>>
where
    R: Clone,
    K: Hash + Eq,
    F: Fn(&R) -> K,
{
    let mut groups: IndexMap<K, Vec<R>> = IndexMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().push(record.clone());
    }
    groups
}

/// Number of records matching `predicate`.
pub fn aggregate_count<R, P>(records: &[R], predicate: P) -> usize
where
    P: Fn(&R) -> bool,
{
    records.iter().filter(|record| predicate(record)).count()
}

/// Stable sort by key. Ties keep their original relative order in both
/// directions.
pub fn sort_by<R, K, F>(records: &[R], key_fn: F, direction: SortDirection) -> Vec<R>
where
    R: Clone,
    K: PartialOrd,
    F: Fn(&R) -> K,
{
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = key_fn(a).partial_cmp(&key_fn(b)).unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

/// `YYYY-MM` for an RFC 3339 instant or a `YYYY-MM-DD` date string.
pub fn month_key(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.format("%Y-%m").to_string());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m").to_string())
}
