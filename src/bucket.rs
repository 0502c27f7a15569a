//! Day bucketing: raw timestamped records into per-day activity counts.
//!
//! Every timestamp is normalised to a UTC calendar day so the same input
//! produces the same map on every device. Records whose date cannot be read
//! are skipped and counted, never fatal.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::level::Classifier;
use crate::types::{ActivityCount, Level};

/// Canonical day key format (`YYYY-MM-DD`).
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Naive date-time layouts accepted in addition to RFC 3339 / RFC 2822.
/// These carry no offset and are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Format a date as its canonical day key.
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a canonical day key.
#[must_use]
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT).ok()
}

// ============================================================================
// Timestamps
// ============================================================================

/// A record timestamp as it arrives from the events collaborator.
///
/// Deserializes from a JSON string or number (milliseconds since the Unix
/// epoch). Anything else becomes [`Timestamp::Invalid`] so one bad record
/// does not fail the whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Invalid(IgnoredAny),
}

impl Timestamp {
    /// The UTC calendar day this timestamp falls on.
    #[must_use]
    pub fn utc_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Millis(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.date_naive()),
            Self::FractionalMillis(ms) => fractional_millis_day(*ms),
            Self::Text(text) => parse_utc_day(text),
            Self::Invalid(_) => None,
        }
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self::Millis(ms)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Millis(dt.timestamp_millis())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fractional_millis_day(ms: f64) -> Option<NaiveDate> {
    // i64 range is far wider than chrono's, so the saturating cast is rejected below
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.trunc() as i64).map(|dt| dt.date_naive())
}

/// Parse a textual timestamp into its UTC calendar day.
#[must_use]
pub fn parse_utc_day(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DAY_KEY_FORMAT) {
        return Some(date);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

// ============================================================================
// Records
// ============================================================================

/// Anything that can be bucketed by day.
pub trait Dated {
    /// The record's timestamp, if it has one.
    fn timestamp(&self) -> Option<&Timestamp>;

    /// How much this record adds to its day.
    fn weight(&self) -> ActivityCount {
        ActivityCount::new(1)
    }

    /// The UTC calendar day of this record.
    fn utc_day(&self) -> Option<NaiveDate> {
        self.timestamp().and_then(Timestamp::utc_day)
    }
}

impl<T: Dated + ?Sized> Dated for &T {
    fn timestamp(&self) -> Option<&Timestamp> {
        (**self).timestamp()
    }

    fn weight(&self) -> ActivityCount {
        (**self).weight()
    }
}

impl Dated for Timestamp {
    fn timestamp(&self) -> Option<&Timestamp> {
        Some(self)
    }
}

/// A report or event as supplied by the caller.
///
/// Only `date` and the optional `weight` are read; fields such as `id` or
/// `title` are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub date: Option<Timestamp>,

    #[serde(default)]
    pub weight: Option<u64>,
}

impl EventRecord {
    /// A single event at the given timestamp.
    pub fn new(date: impl Into<Timestamp>) -> Self {
        Self {
            date: Some(date.into()),
            weight: None,
        }
    }

    /// Several events coalesced into one record.
    pub fn weighted(date: impl Into<Timestamp>, weight: u64) -> Self {
        Self {
            date: Some(date.into()),
            weight: Some(weight),
        }
    }
}

impl Dated for EventRecord {
    fn timestamp(&self) -> Option<&Timestamp> {
        self.date.as_ref()
    }

    fn weight(&self) -> ActivityCount {
        ActivityCount::new(self.weight.unwrap_or(1))
    }
}

/// One calendar day's aggregated activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    pub count: ActivityCount,
}

impl ActivityRecord {
    /// Canonical day key for this record.
    #[must_use]
    pub fn key(&self) -> String {
        day_key(self.date)
    }
}

/// A day with its count and classified level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassifiedDay {
    pub date: NaiveDate,
    pub count: ActivityCount,
    pub level: Level,
}

// ============================================================================
// ActivityMap
// ============================================================================

/// Per-day activity counts keyed by calendar day.
///
/// Iteration is always in ascending date order. Days that are absent have a
/// count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityMap {
    days: BTreeMap<NaiveDate, ActivityCount>,
}

impl ActivityMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(day key, count)` pairs.
    ///
    /// Pairs whose key is not a valid `YYYY-MM-DD` day are skipped and
    /// counted in [`Bucketed::skipped`].
    pub fn from_day_counts<K, I>(pairs: I) -> Bucketed
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, u64)>,
    {
        let mut activities = Self::new();
        let mut skipped = 0;
        for (key, count) in pairs {
            if let Some(date) = parse_day_key(key.as_ref()) {
                activities.add(date, ActivityCount::new(count));
            } else {
                debug!("skipping invalid day key {:?}", key.as_ref());
                skipped += 1;
            }
        }
        Bucketed {
            activities,
            skipped,
        }
    }

    /// Add `weight` to the count for `date`.
    pub fn add(&mut self, date: NaiveDate, weight: ActivityCount) {
        *self.days.entry(date).or_default() += weight;
    }

    /// Count for a day, zero if absent.
    #[must_use]
    pub fn count_on(&self, date: NaiveDate) -> ActivityCount {
        self.days.get(&date).copied().unwrap_or_default()
    }

    /// Record for a day, if any events fell on it.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<ActivityRecord> {
        self.days
            .get(&date)
            .map(|&count| ActivityRecord { date, count })
    }

    /// Record for a canonical day key.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<ActivityRecord> {
        parse_day_key(key).and_then(|date| self.get(date))
    }

    /// Number of distinct days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the map has no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Records in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = ActivityRecord> + '_ {
        self.days
            .iter()
            .map(|(&date, &count)| ActivityRecord { date, count })
    }

    /// Records within `[start, end]`, ascending.
    pub fn range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = ActivityRecord> + '_ {
        // BTreeMap::range panics on an inverted range
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.days
            .range(lo..=hi)
            .map(|(&date, &count)| ActivityRecord { date, count })
    }

    /// Largest single-day count, zero for an empty map.
    #[must_use]
    pub fn max_count(&self) -> ActivityCount {
        self.days.values().copied().max().unwrap_or_default()
    }

    /// Largest single-day count within `[start, end]`.
    #[must_use]
    pub fn max_in(&self, start: NaiveDate, end: NaiveDate) -> ActivityCount {
        if start > end {
            return ActivityCount::ZERO;
        }
        self.range(start, end)
            .map(|r| r.count)
            .max()
            .unwrap_or_default()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> ActivityCount {
        self.days.values().copied().sum()
    }

    /// First and last day with activity.
    #[must_use]
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.days.keys().next()?;
        let last = self.days.keys().next_back()?;
        Some((*first, *last))
    }

    /// Every day with its level, ascending.
    #[must_use]
    pub fn classified(&self, classifier: &Classifier) -> Vec<ClassifiedDay> {
        self.iter()
            .map(|r| ClassifiedDay {
                date: r.date,
                count: r.count,
                level: classifier.classify(r.count),
            })
            .collect()
    }
}

impl FromIterator<(NaiveDate, ActivityCount)> for ActivityMap {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, ActivityCount)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (date, count) in iter {
            map.add(date, count);
        }
        map
    }
}

impl Serialize for ActivityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (date, count) in &self.days {
            map.serialize_entry(&day_key(*date), count)?;
        }
        map.end()
    }
}

// ============================================================================
// Bucketing
// ============================================================================

/// Result of a bucketing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucketed {
    pub activities: ActivityMap,
    /// Records dropped because their date could not be read.
    pub skipped: usize,
}

/// Bucket records by UTC day, dropping unreadable dates.
pub fn bucket<I>(records: I) -> ActivityMap
where
    I: IntoIterator,
    I::Item: Dated,
{
    bucket_with_report(records).activities
}

/// Bucket records by UTC day and report how many were skipped.
///
/// Aggregation is a plain sum per key, so the result does not depend on the
/// order of `records`.
pub fn bucket_with_report<I>(records: I) -> Bucketed
where
    I: IntoIterator,
    I::Item: Dated,
{
    let mut activities = ActivityMap::new();
    let mut skipped = 0;

    for (index, record) in records.into_iter().enumerate() {
        match record.utc_day() {
            Some(day) => activities.add(day, record.weight()),
            None => {
                debug!("skipping record {} with unreadable date {:?}", index, record.timestamp());
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        info!(
            "bucketed {} days, skipped {} records with invalid dates",
            activities.len(),
            skipped
        );
    } else {
        debug!("bucketed {} days", activities.len());
    }

    Bucketed {
        activities,
        skipped,
    }
}

/// One element of a records array: a full record or a bare timestamp.
///
/// Each element is read on its own, so a malformed element is skipped
/// without affecting its neighbours.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InputItem {
    Event(EventRecord),
    Stamp(Timestamp),
}

impl Dated for InputItem {
    fn timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::Event(record) => record.timestamp(),
            Self::Stamp(stamp) => Some(stamp),
        }
    }

    fn weight(&self) -> ActivityCount {
        match self {
            Self::Event(record) => record.weight(),
            Self::Stamp(_) => ActivityCount::new(1),
        }
    }
}

/// The JSON shapes accepted as heatmap input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActivityInput {
    /// `[{ "date": ..., "weight": ... }, "2025-09-01T10:00:00Z", 1727000000000, ...]`
    Records(Vec<InputItem>),
    /// `{ "2025-09-01": 3, ... }`
    DayCounts(BTreeMap<String, u64>),
}

impl ActivityInput {
    /// Parse input from JSON text.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Bucket the input whatever its shape.
    #[must_use]
    pub fn into_bucketed(self) -> Bucketed {
        match self {
            Self::Records(items) => bucket_with_report(items),
            Self::DayCounts(counts) => ActivityMap::from_day_counts(counts),
        }
    }
}
