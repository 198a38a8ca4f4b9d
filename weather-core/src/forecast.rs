//! Reduction of a 3-hourly forecast into one entry per calendar day.
//!
//! A single time zone drives both the day a reading belongs to and the hour
//! compared against noon.

use std::collections::HashMap;

use chrono::{FixedOffset, Local, NaiveDate, TimeZone, Timelike, Utc};

use crate::model::{DailySummary, ForecastEntry, ForecastSet};

const NOON: u32 = 12;

/// One summary per calendar day in `tz`, in order of first appearance.
///
/// Each day is represented by the entry whose hour is closest to noon; on a
/// tie the earlier entry in input order wins. Empty input yields an empty list.
pub fn daily_summaries<Tz: TimeZone>(set: &ForecastSet, tz: &Tz) -> Vec<DailySummary> {
    let mut days: Vec<(NaiveDate, Vec<&ForecastEntry>)> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in &set.entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            days.push((date, Vec::new()));
            days.len() - 1
        });
        days[slot].1.push(entry);
    }

    days.into_iter()
        .filter_map(|(date, entries)| {
            // min_by_key keeps the first of several equal minima.
            let closest = entries.into_iter().min_by_key(|e| noon_distance(e, tz))?;
            Some(DailySummary {
                date,
                representative_entry: closest.clone(),
            })
        })
        .collect()
}

/// Summaries using the device's local zone.
pub fn daily_summaries_local(set: &ForecastSet) -> Vec<DailySummary> {
    daily_summaries(set, &Local)
}

/// Summaries in the forecast location's own zone, as reported upstream.
///
/// Falls back to UTC when no offset was reported or the offset is invalid.
pub fn daily_summaries_at_location(set: &ForecastSet) -> Vec<DailySummary> {
    match set.utc_offset_seconds.and_then(FixedOffset::east_opt) {
        Some(offset) => daily_summaries(set, &offset),
        None => daily_summaries(set, &Utc),
    }
}

fn noon_distance<Tz: TimeZone>(entry: &ForecastEntry, tz: &Tz) -> u32 {
    entry.timestamp.with_timezone(tz).hour().abs_diff(NOON)
}
