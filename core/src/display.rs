//! 表示用ヘルパー（相対時刻、日付グループ、集計）

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::types::{NotificationRecord, Priority};

/// 相対時刻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeTime {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Date(NaiveDate),
}

pub fn relative_time<Tz: TimeZone>(created_at: &DateTime<Utc>, now: &DateTime<Tz>) -> RelativeTime {
    let diff = now.with_timezone(&Utc) - *created_at;
    let secs = diff.num_seconds();

    if secs < 60 {
        RelativeTime::JustNow
    } else if secs < 3600 {
        RelativeTime::Minutes(secs / 60)
    } else if secs < 86400 {
        RelativeTime::Hours(secs / 3600)
    } else if secs < 7 * 86400 {
        RelativeTime::Days(secs / 86400)
    } else {
        RelativeTime::Date(created_at.with_timezone(&now.timezone()).date_naive())
    }
}

/// 日付グループ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayGroup {
    Today,
    Yesterday,
    ThisWeek,
    Older,
}

/// `now` のタイムゾーンで日付を比較する（未来の時刻は今日扱い）
pub fn day_group<Tz: TimeZone>(created_at: &DateTime<Utc>, now: &DateTime<Tz>) -> DayGroup {
    let today = now.date_naive();
    let day = created_at.with_timezone(&now.timezone()).date_naive();
    match (today - day).num_days() {
        i64::MIN..=0 => DayGroup::Today,
        1 => DayGroup::Yesterday,
        2..=6 => DayGroup::ThisWeek,
        _ => DayGroup::Older,
    }
}

/// 連続する同じグループをまとめる（並び順は保持）
pub fn group_by_day<'a, Tz: TimeZone>(
    records: &[&'a NotificationRecord],
    now: &DateTime<Tz>,
) -> Vec<(DayGroup, Vec<&'a NotificationRecord>)> {
    let mut groups: Vec<(DayGroup, Vec<&'a NotificationRecord>)> = Vec::new();
    for record in records {
        let group = day_group(&record.created_at, now);
        match groups.last_mut() {
            Some((last, items)) if *last == group => items.push(*record),
            _ => groups.push((group, vec![*record])),
        }
    }
    groups
}

/// extra_dataの整形（空なら None）
pub fn pretty_extra_data(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Object(map) if map.is_empty() => None,
        other => serde_json::to_string_pretty(other).ok(),
    }
}

/// 現在ページの集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub total: usize,
    pub unread: usize,
    pub by_priority: HashMap<Priority, usize>,
}

impl PageSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a NotificationRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.total += 1;
            if !record.is_read {
                summary.unread += 1;
            }
            *summary.by_priority.entry(record.priority).or_insert(0) += 1;
        }
        summary
    }

    pub fn count(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }
}
