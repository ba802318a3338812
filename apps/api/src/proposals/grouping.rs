//! History grouping: partitions proposals into day, week or month buckets.
//!
//! Records keep their input order inside a bucket and buckets appear in first-seen
//! order, so a newest-first history yields newest-first buckets. Every record lands
//! in exactly one bucket.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::proposal::ProposalRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryBucket {
    pub label: String,
    pub records: Vec<ProposalRow>,
}

/// Groups `records` relative to `now`. Calendar boundaries are taken in `now`'s
/// time zone; weeks start on Sunday.
pub fn group_records<Tz: TimeZone>(
    records: Vec<ProposalRow>,
    mode: GroupMode,
    now: &DateTime<Tz>,
) -> Vec<HistoryBucket> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut buckets: Vec<HistoryBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let date = record.created_at.with_timezone(&tz).date_naive();
        let label = bucket_label(date, today, mode);
        match index.get(&label) {
            Some(&i) => buckets[i].records.push(record),
            None => {
                index.insert(label.clone(), buckets.len());
                buckets.push(HistoryBucket {
                    label,
                    records: vec![record],
                });
            }
        }
    }

    buckets
}

pub fn bucket_label(date: NaiveDate, today: NaiveDate, mode: GroupMode) -> String {
    match mode {
        GroupMode::Day => {
            if date == today {
                "Today".to_string()
            } else {
                date.format("%b %-d, %Y").to_string()
            }
        }
        GroupMode::Week => {
            let start = week_start(date);
            if start == week_start(today) {
                "This Week".to_string()
            } else {
                format!("Week of {}", start.format("%b %-d"))
            }
        }
        GroupMode::Month => {
            if date.year() == today.year() && date.month() == today.month() {
                "This Month".to_string()
            } else {
                date.format("%B %Y").to_string()
            }
        }
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}
