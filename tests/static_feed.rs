// tests/static_feed.rs
//
// The pipeline over a pre-recorded feed served unmodified.

use chrono::{TimeZone, Utc};
use gtm_dashboard::model::Category;
use gtm_dashboard::pipeline::{compute_view, Filter, SortKey, ViewState};
use gtm_dashboard::sources::{FeedSource, StaticFeedSource};
use gtm_dashboard::DashboardConfig;

fn shown(ts: chrono::DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn source() -> StaticFeedSource {
    let raw: &str = include_str!("fixtures/feed_static.json");
    StaticFeedSource::from_json_str(raw).expect("fixture parses")
}

#[tokio::test]
async fn static_feed_ranks_by_engagement() {
    let items = source().fetch_feed().await.unwrap();
    assert_eq!(items.len(), 5);

    let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    let rows = compute_view(&items, &ViewState::default(), now, None);
    let order: Vec<&str> = rows.iter().map(|r| r.item.id.as_str()).collect();
    // rec-2 is clicks only (21000); rec-4 has no metrics at all
    assert_eq!(order, vec!["rec-2", "rec-3", "rec-1", "rec-5", "rec-4"]);
    assert_eq!(rows[0].engagement, 21_000);
    assert_eq!(rows[4].engagement, 0);
    assert_eq!(rows[4].recency, "—");
}

#[tokio::test]
async fn static_feed_most_recent_with_normalization() {
    let items = source().fetch_feed().await.unwrap();
    let policy = DashboardConfig::default().timestamp_policy().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 11, 7, 0, 0, 0).unwrap();

    let view = ViewState {
        sort: SortKey::MostRecent,
        ..Default::default()
    };
    let rows = compute_view(&items, &view, now, Some(&policy));
    let order: Vec<&str> = rows.iter().map(|r| r.item.id.as_str()).collect();
    assert_eq!(order, vec!["rec-3", "rec-5", "rec-1", "rec-2", "rec-4"]);

    // rec-3 (5h45m old) and rec-5 (37h old) are fresh -> remapped;
    // rec-1 (58h old) and rec-2 are older than 48h -> unchanged.
    assert_eq!(
        rows[0].display_timestamp.as_deref(),
        Some(shown(policy.window.synthetic_instant(0)).as_str())
    );
    assert_eq!(
        rows[2].display_timestamp.as_deref(),
        Some("2025-11-04T14:00:00.000Z")
    );
    assert_eq!(rows[2].recency, "2d");
    // broken timestamp is remapped too
    assert_eq!(
        rows[4].display_timestamp.as_deref(),
        Some(shown(policy.window.synthetic_instant(4)).as_str())
    );
}

#[tokio::test]
async fn static_feed_owned_filter() {
    let items = source().fetch_feed().await.unwrap();
    let view = ViewState {
        filter: Filter::Only(Category::Owned),
        sort: SortKey::Impressions,
        show_all: true,
    };
    let rows = compute_view(&items, &view, Utc::now(), None);
    let order: Vec<&str> = rows.iter().map(|r| r.item.id.as_str()).collect();
    assert_eq!(order, vec!["rec-5", "rec-2"]);
    assert_eq!(rows[1].source_label, "Open Letter");
    assert_eq!(rows[0].source_label, "@cashapp");
}
