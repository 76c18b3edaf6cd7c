//! # Dashboard state
//! Latest snapshots of both sources plus assembly of the full view.
//!
//! Each slot has exactly one writer (its own fetch path). A write carries
//! the poll tick that issued the request; a completion from an older tick
//! than the one already stored is dropped, so a slow response can never
//! overwrite a newer one.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::format::{format_number, format_percent, recency_label, PLACEHOLDER};
use crate::model::{FeedItem, MetricsSnapshot};
use crate::pipeline::{compute_view, DisplayRow, Filter, SortKey, TimestampPolicy, ViewState};

pub const TITLE: &str = "Cash Bitcoin 2.0 GTM Command Center";
pub const SUBTITLE: &str =
    "Unified top-of-funnel performance readout across social, earned, and owned channels.";

#[derive(Debug, Clone)]
struct Stamped<T> {
    seq: u64,
    at: DateTime<Utc>,
    value: T,
}

/// Single-writer cell holding the latest accepted value.
#[derive(Debug)]
pub struct Slot<T> {
    inner: RwLock<Option<Stamped<T>>>,
}

impl<T: Clone> Slot<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Store `value` produced by tick `seq`. Returns `false` (and keeps the
    /// current value) when a newer tick has already been stored.
    pub fn offer(&self, seq: u64, value: T) -> bool {
        let mut g = self.inner.write();
        if let Some(cur) = g.as_ref() {
            if seq < cur.seq {
                return false;
            }
        }
        *g = Some(Stamped {
            seq,
            at: Utc::now(),
            value,
        });
        true
    }

    pub fn get(&self) -> Option<T> {
        self.inner.read().as_ref().map(|s| s.value.clone())
    }

    pub fn seq(&self) -> Option<u64> {
        self.inner.read().as_ref().map(|s| s.seq)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().as_ref().map(|s| s.at)
    }
}

impl<T: Clone> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    metrics: Slot<MetricsSnapshot>,
    feed: Slot<Arc<Vec<FeedItem>>>,
    policy: Option<TimestampPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOption {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub filters: Vec<ControlOption>,
    pub sorts: Vec<ControlOption>,
    /// Label of the toggle button ("Show All 50" / "Show Top 10").
    pub show_all_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub kpis: Vec<Kpi>,
    pub controls: Controls,
    pub view: ViewState,
    /// Items in the latest feed snapshot before filtering.
    pub total_items: usize,
    /// Age of each snapshot ("—" until the first one lands).
    pub metrics_age: String,
    pub feed_age: String,
    pub rows: Vec<DisplayRow>,
}

impl Dashboard {
    pub fn new(policy: Option<TimestampPolicy>) -> Self {
        Self {
            metrics: Slot::new(),
            feed: Slot::new(),
            policy,
        }
    }

    pub fn offer_metrics(&self, seq: u64, m: MetricsSnapshot) -> bool {
        self.metrics.offer(seq, m)
    }

    pub fn offer_feed(&self, seq: u64, items: Vec<FeedItem>) -> bool {
        self.feed.offer(seq, Arc::new(items))
    }

    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.metrics.get()
    }

    pub fn feed(&self) -> Option<Arc<Vec<FeedItem>>> {
        self.feed.get()
    }

    pub fn metrics_slot(&self) -> &Slot<MetricsSnapshot> {
        &self.metrics
    }

    pub fn feed_slot(&self) -> &Slot<Arc<Vec<FeedItem>>> {
        &self.feed
    }

    pub fn view(&self, state: &ViewState, now: DateTime<Utc>) -> DashboardView {
        let items = self.feed.get().unwrap_or_default();
        let rows = compute_view(&items, state, now, self.policy.as_ref());
        DashboardView {
            title: TITLE,
            subtitle: SUBTITLE,
            kpis: kpis(self.metrics.get().as_ref()),
            controls: controls(state),
            view: *state,
            total_items: items.len(),
            metrics_age: age(self.metrics.updated_at(), now),
            feed_age: age(self.feed.updated_at(), now),
            rows,
        }
    }
}

fn age(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    at.map(|t| recency_label(t, now))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// KPI cards; every value reads "—" until the first snapshot arrives.
pub fn kpis(m: Option<&MetricsSnapshot>) -> Vec<Kpi> {
    vec![
        Kpi {
            label: "Mentions",
            value: format_number(m.map(|m| m.mentions)),
        },
        Kpi {
            label: "Impressions",
            value: format_number(m.map(|m| m.impressions)),
        },
        Kpi {
            label: "Positive Sentiment",
            value: format_percent(m.map(|m| m.positive_sentiment)),
        },
        Kpi {
            label: "Engagements",
            value: format_number(m.map(|m| m.engagements)),
        },
    ]
}

fn controls(state: &ViewState) -> Controls {
    Controls {
        filters: Filter::options()
            .into_iter()
            .map(|f| ControlOption {
                label: f.as_str(),
                active: f == state.filter,
            })
            .collect(),
        sorts: SortKey::ALL
            .into_iter()
            .map(|s| ControlOption {
                label: s.as_str(),
                active: s == state.sort,
            })
            .collect(),
        show_all_label: if state.show_all {
            "Show Top 10"
        } else {
            "Show All 50"
        },
    }
}

impl DashboardView {
    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let kpi_line = self
            .kpis
            .iter()
            .map(|k| format!("{}: {}", k.label, k.value))
            .collect::<Vec<_>>()
            .join("  |  ");
        let _ = writeln!(out, "{kpi_line}");
        let _ = writeln!(
            out,
            "filter={} sort={} rows={}/{}  updated metrics={} feed={}",
            self.view.filter,
            self.view.sort,
            self.rows.len(),
            self.total_items,
            self.metrics_age,
            self.feed_age
        );
        for r in &self.rows {
            let _ = writeln!(
                out,
                "{:>3}  {:<50.50}  {:<18.18}  {:<7}  {:<5}  Eng: {:>7}  {:>4}  {}",
                r.rank,
                r.item.title,
                r.source_label,
                r.item.category.as_str(),
                r.item.platform.as_str(),
                r.engagement_label,
                r.recency,
                r.sentiment_label
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_tick_cannot_overwrite_newer() {
        let slot: Slot<u32> = Slot::new();
        assert!(slot.offer(2, 20));
        assert!(!slot.offer(1, 10));
        assert_eq!(slot.get(), Some(20));
        assert!(slot.offer(3, 30));
        assert_eq!(slot.seq(), Some(3));
    }

    #[test]
    fn empty_dashboard_renders_placeholders() {
        let d = Dashboard::new(None);
        let v = d.view(&ViewState::default(), Utc::now());
        assert!(v.rows.is_empty());
        assert_eq!(v.total_items, 0);
        assert!(v.kpis.iter().all(|k| k.value == "—"));
        assert_eq!(v.controls.show_all_label, "Show All 50");
        assert_eq!(v.controls.filters.iter().filter(|f| f.active).count(), 1);
        assert_eq!((v.metrics_age.as_str(), v.feed_age.as_str()), ("—", "—"));
    }

    #[test]
    fn snapshot_age_follows_the_slot_timestamp() {
        let d = Dashboard::new(None);
        assert!(d.metrics_slot().updated_at().is_none());
        d.offer_metrics(1, MetricsSnapshot::default());
        let at = d.metrics_slot().updated_at().unwrap();

        let v = d.view(&ViewState::default(), at + chrono::Duration::minutes(3));
        assert_eq!(v.metrics_age, "3m");
        assert_eq!(v.feed_age, "—");
        assert!(v.render_text().contains("updated metrics=3m feed=—"));
    }

    #[test]
    fn kpis_format_latest_snapshot() {
        let m = MetricsSnapshot {
            mentions: 2_912,
            impressions: 394_200_000,
            positive_sentiment: 63,
            engagements: 7_820,
        };
        let k = kpis(Some(&m));
        assert_eq!(k[0].value, "2.9K");
        assert_eq!(k[1].value, "394.2M");
        assert_eq!(k[2].value, "63%");
        assert_eq!(k[3].value, "7.8K");
    }
}
