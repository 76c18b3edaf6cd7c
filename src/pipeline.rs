//! # Feed pipeline
//! filter → score → sort → display-timestamp normalization → recency → slice.
//!
//! Everything here is synchronous and pure: the same items, view state,
//! `now` and policy always produce the same rows. Re-run it whenever any
//! of those inputs change.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use crate::format::{format_number, recency_label, PLACEHOLDER};
use crate::model::{Category, FeedItem};

/// Rows shown in the default (collapsed) leaderboard.
pub const TOP_ROWS: usize = 10;
/// Rows shown when "Show All" is toggled on.
pub const ALL_ROWS: usize = 50;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewParseError {
    #[error("unknown filter '{0}' (expected All, Earned, Creator, Exec or Owned)")]
    Filter(String),
    #[error("unknown sort key '{0}' (expected Engagement, Most Recent or Impressions)")]
    Sort(String),
}

/// Type filter: everything, or a single provenance category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    All,
    Only(Category),
}

impl Filter {
    /// Options in button order.
    pub fn options() -> [Filter; 5] {
        [
            Filter::All,
            Filter::Only(Category::Earned),
            Filter::Only(Category::Creator),
            Filter::Only(Category::Exec),
            Filter::Only(Category::Owned),
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Only(c) => c.as_str(),
        }
    }

    fn keeps(&self, item: &FeedItem) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(c) => item.category == *c,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(t))
            .map(Filter::Only)
            .ok_or_else(|| ViewParseError::Filter(s.to_string()))
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Engagement,
    #[serde(rename = "Most Recent")]
    MostRecent,
    Impressions,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Engagement, SortKey::MostRecent, SortKey::Impressions];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Engagement => "Engagement",
            SortKey::MostRecent => "Most Recent",
            SortKey::Impressions => "Impressions",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ViewParseError;

    /// Accepts the display names plus `most_recent` / `mostrecent` / `recent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "engagement" => Ok(SortKey::Engagement),
            "mostrecent" | "recent" => Ok(SortKey::MostRecent),
            "impressions" => Ok(SortKey::Impressions),
            _ => Err(ViewParseError::Sort(s.to_string())),
        }
    }
}

/// Leaderboard controls, threaded explicitly through every recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub show_all: bool,
}

impl ViewState {
    pub fn row_limit(&self) -> usize {
        if self.show_all {
            ALL_ROWS
        } else {
            TOP_ROWS
        }
    }
}

/// Closed interval `[start, end]` that fresh demo timestamps are remapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RolloutWindow {
    /// Bounds given in the wrong order are swapped.
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Synthetic instant for the row at `index`.
    ///
    /// `base = start + floor(((index*37) mod 100) / 100 * span)`, plus
    /// `(index*11) mod 24` hours, clamped into the window.
    pub fn synthetic_instant(&self, index: usize) -> DateTime<Utc> {
        let span_ms = (self.end - self.start).num_milliseconds() as i128;
        let step = ((index % 100) * 37 % 100) as i128;
        let offset_ms = (span_ms * step / 100) as i64;
        let extra_hours = ((index % 24) * 11 % 24) as i64;

        let ts = self.start + Duration::milliseconds(offset_ms) + Duration::hours(extra_hours);
        ts.clamp(self.start, self.end)
    }
}

/// When and where to remap display timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampPolicy {
    pub window: RolloutWindow,
    /// Real timestamps closer to now than this are considered "too fresh".
    pub fresh_threshold: Duration,
}

impl TimestampPolicy {
    pub fn new(window: RolloutWindow) -> Self {
        Self {
            window,
            fresh_threshold: Duration::hours(48),
        }
    }
}

/// One rendered leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// 1-based position in the sorted list.
    pub rank: usize,
    pub item: FeedItem,
    pub engagement: u64,
    pub engagement_label: String,
    pub impressions_label: String,
    pub source_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_timestamp: Option<String>,
    pub recency: String,
    pub sentiment_label: String,
}

/// likes + replies + reposts + clicks, absent terms counting as 0.
pub fn engagement(item: &FeedItem) -> u64 {
    let m = &item.metrics;
    [m.likes, m.replies, m.reposts, m.clicks]
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .fold(0u64, u64::saturating_add)
}

/// Parse an ISO-8601 instant. Offset-less values are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Display timestamp for the row at post-sort `index`.
///
/// Missing/invalid timestamps and ones within the fresh threshold of `now`
/// are replaced by the window's synthetic instant; older ones pass through.
pub fn normalize_display_timestamp(
    real: Option<DateTime<Utc>>,
    index: usize,
    now: DateTime<Utc>,
    policy: &TimestampPolicy,
) -> DateTime<Utc> {
    match real {
        Some(ts)
            if (now - ts).num_milliseconds().abs()
                >= policy.fresh_threshold.num_milliseconds() =>
        {
            ts
        }
        _ => policy.window.synthetic_instant(index),
    }
}

/// Filter, rank and slice `items` for display.
///
/// Sorting is stable and descending on the chosen key; ties keep input order.
/// Unparsable timestamps sort as the epoch under "Most Recent".
pub fn compute_view(
    items: &[FeedItem],
    view: &ViewState,
    now: DateTime<Utc>,
    policy: Option<&TimestampPolicy>,
) -> Vec<DisplayRow> {
    let mut ranked: Vec<(&FeedItem, u64, Option<DateTime<Utc>>)> = items
        .iter()
        .filter(|it| view.filter.keeps(it))
        .map(|it| (it, engagement(it), parse_timestamp(&it.timestamp_iso)))
        .collect();

    match view.sort {
        SortKey::Engagement => ranked.sort_by_key(|(_, eng, _)| Reverse(*eng)),
        SortKey::MostRecent => ranked.sort_by_key(|(_, _, ts)| {
            Reverse(ts.map(|t| t.timestamp_millis()).unwrap_or(0))
        }),
        SortKey::Impressions => {
            ranked.sort_by_key(|(it, _, _)| Reverse(it.metrics.impressions.unwrap_or(0)))
        }
    }

    ranked.truncate(view.row_limit());

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (item, eng, real_ts))| {
            let shown = match policy {
                Some(p) => Some(normalize_display_timestamp(real_ts, index, now, p)),
                None => real_ts,
            };
            DisplayRow {
                rank: index + 1,
                engagement: eng,
                engagement_label: format_number(Some(eng)),
                impressions_label: format_number(item.metrics.impressions),
                source_label: item.source_label().to_string(),
                display_timestamp: shown
                    .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
                recency: shown
                    .map(|t| recency_label(t, now))
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                sentiment_label: item
                    .sentiment
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                item: item.clone(),
            }
        })
        .collect()
}
