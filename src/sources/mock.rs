//! # Mock sources
//! Demo data for `/metrics` and `/feed`.
//!
//! The variance arithmetic is kept as plain functions over explicit draws
//! (`MetricsVariance`, `ItemDraws`) so it can be checked without an RNG.
//! Only the sources themselves pull numbers from `rand`.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::{FeedSource, MetricsSource};
use crate::model::{Category, FeedItem, FeedMetrics, MetricsSnapshot, Platform, Sentiment};

pub const BASELINE: MetricsSnapshot = MetricsSnapshot {
    mentions: 2_900,
    impressions: 393_000_000,
    positive_sentiment: 64,
    engagements: 7_800,
};

pub const SENTIMENT_MIN: u32 = 45;
pub const SENTIMENT_MAX: u32 = 85;

/// Relative spread applied to every template metric.
const METRIC_JITTER: f64 = 0.08;

/// One draw of metric perturbations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsVariance {
    /// 0..=29
    pub mentions: u64,
    /// 0..3_500_000
    pub impressions: u64,
    /// -2..=2
    pub sentiment: i32,
    /// 0..=199
    pub engagements: u64,
}

impl MetricsVariance {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            mentions: rng.random_range(0..30),
            impressions: rng.random_range(0..3_500_000),
            sentiment: rng.random_range(-2..=2),
            engagements: rng.random_range(0..200),
        }
    }
}

/// Baseline plus variance, with sentiment clamped to [45, 85].
pub fn apply_variance(base: MetricsSnapshot, v: MetricsVariance) -> MetricsSnapshot {
    let sentiment = (base.positive_sentiment as i64 + v.sentiment as i64)
        .clamp(SENTIMENT_MIN as i64, SENTIMENT_MAX as i64) as u32;
    MetricsSnapshot {
        mentions: base.mentions.saturating_add(v.mentions),
        impressions: base.impressions.saturating_add(v.impressions),
        positive_sentiment: sentiment,
        engagements: base.engagements.saturating_add(v.engagements),
    }
}

#[derive(Debug, Clone)]
pub struct MockMetricsSource {
    baseline: MetricsSnapshot,
}

impl MockMetricsSource {
    pub fn new() -> Self {
        Self { baseline: BASELINE }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> MetricsSnapshot {
        apply_variance(self.baseline, MetricsVariance::sample(rng))
    }
}

impl Default for MockMetricsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetricsSource for MockMetricsSource {
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot> {
        let snap = self.generate(&mut rand::rng());
        Ok(snap)
    }

    fn name(&self) -> &'static str {
        "mock-metrics"
    }
}

// ---------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------

/// Unit draws (each in [0, 1)) consumed when expanding one template copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemDraws {
    pub sentiment: f64,
    /// impressions, likes, replies, reposts, clicks
    pub jitter: [f64; 5],
}

impl ItemDraws {
    /// Draws that leave every metric untouched and pick Positive.
    pub const NEUTRAL: ItemDraws = ItemDraws {
        sentiment: 0.0,
        jitter: [0.5; 5],
    };

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            sentiment: rng.random(),
            jitter: [
                rng.random(),
                rng.random(),
                rng.random(),
                rng.random(),
                rng.random(),
            ],
        }
    }
}

/// 62% Positive, 25% Neutral, 13% Negative.
pub fn pick_sentiment(u: f64) -> Sentiment {
    if u < 0.62 {
        Sentiment::Positive
    } else if u < 0.87 {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    }
}

/// Scale `v` by a factor in [0.92, 1.08] chosen by `u`, rounded, floored at 0.
pub fn jitter_value(v: u64, u: f64) -> u64 {
    let factor = 1.0 + (u.clamp(0.0, 1.0) * 2.0 - 1.0) * METRIC_JITTER;
    (v as f64 * factor).round().max(0.0) as u64
}

/// Age of the `index`-th expanded copy. Spread over roughly four days so
/// some rows are "fresh" and some are not.
pub fn synthesized_age(index: usize) -> Duration {
    let minutes = 12 + (index as i64 * 97) % 5_760;
    Duration::minutes(minutes)
}

fn jitter_metrics(m: &FeedMetrics, j: &[f64; 5]) -> FeedMetrics {
    FeedMetrics {
        impressions: m.impressions.map(|v| jitter_value(v, j[0])),
        likes: m.likes.map(|v| jitter_value(v, j[1])),
        replies: m.replies.map(|v| jitter_value(v, j[2])),
        reposts: m.reposts.map(|v| jitter_value(v, j[3])),
        clicks: m.clicks.map(|v| jitter_value(v, j[4])),
    }
}

/// One expanded copy of `template` at position `index`.
pub fn expand_item(
    template: &FeedItem,
    index: usize,
    now: DateTime<Utc>,
    draws: &ItemDraws,
) -> FeedItem {
    let ts = now - synthesized_age(index);
    FeedItem {
        id: format!("{}-{:02}", template.id, index + 1),
        timestamp_iso: ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        sentiment: Some(pick_sentiment(draws.sentiment)),
        metrics: jitter_metrics(&template.metrics, &draws.jitter),
        ..template.clone()
    }
}

/// Cycle through `catalog` until `size` items exist.
pub fn expand_catalog<R: Rng + ?Sized>(
    catalog: &[FeedItem],
    size: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<FeedItem> {
    if catalog.is_empty() {
        return Vec::new();
    }
    (0..size)
        .map(|i| {
            let draws = ItemDraws::sample(rng);
            expand_item(&catalog[i % catalog.len()], i, now, &draws)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn template(
    id: &str,
    category: Category,
    platform: Platform,
    author: &str,
    source: Option<&str>,
    title: &str,
    url: &str,
    metrics: FeedMetrics,
) -> FeedItem {
    FeedItem {
        id: id.to_string(),
        category,
        platform,
        author_name: author.to_string(),
        source_name: source.map(str::to_string),
        title: title.to_string(),
        url: url.to_string(),
        timestamp_iso: String::new(),
        sentiment: None,
        metrics,
    }
}

/// The six template items the demo feed is built from.
pub fn default_catalog() -> Vec<FeedItem> {
    vec![
        template(
            "earned-coindesk",
            Category::Earned,
            Platform::Web,
            "Staff Reporter",
            Some("CoinDesk"),
            "Cash App relaunches bitcoin with zero-fee buys",
            "https://www.coindesk.com/",
            FeedMetrics {
                impressions: Some(4_200_000),
                likes: Some(1_850),
                replies: Some(240),
                reposts: Some(610),
                clicks: Some(9_400),
            },
        ),
        template(
            "creator-x",
            Category::Creator,
            Platform::X,
            "@satstacker",
            None,
            "Tried the new Cash App bitcoin flow, it's fast",
            "https://x.com/",
            FeedMetrics {
                impressions: Some(880_000),
                likes: Some(5_300),
                replies: Some(410),
                reposts: Some(1_220),
                clicks: None,
            },
        ),
        template(
            "exec-x",
            Category::Exec,
            Platform::X,
            "@exec",
            Some("Exec Account"),
            "Bitcoin is for everyday payments. Today we ship.",
            "https://x.com/",
            FeedMetrics {
                impressions: Some(2_600_000),
                likes: Some(12_400),
                replies: Some(1_900),
                reposts: Some(3_100),
                clicks: None,
            },
        ),
        template(
            "owned-letter",
            Category::Owned,
            Platform::Web,
            "Cash App",
            Some("Open Letter"),
            "An open letter on bitcoin as money",
            "https://cash.app/",
            FeedMetrics {
                impressions: Some(640_000),
                likes: None,
                replies: None,
                reposts: None,
                clicks: Some(21_000),
            },
        ),
        template(
            "creator-nostr",
            Category::Creator,
            Platform::Nostr,
            "npub-builder",
            None,
            "Zapped my first coffee via Cash App lightning",
            "https://nostr.com/",
            FeedMetrics {
                impressions: Some(95_000),
                likes: Some(2_100),
                replies: Some(330),
                reposts: Some(480),
                clicks: None,
            },
        ),
        template(
            "earned-blog",
            Category::Earned,
            Platform::Web,
            "Guest Writer",
            Some("Bitcoin Magazine"),
            "What the Cash App relaunch means for self-custody",
            "https://bitcoinmagazine.com/",
            FeedMetrics {
                impressions: Some(1_300_000),
                likes: Some(760),
                replies: Some(95),
                reposts: None,
                clicks: Some(3_800),
            },
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct MockFeedSource {
    catalog: Vec<FeedItem>,
    size: usize,
}

impl MockFeedSource {
    pub fn new(size: usize) -> Self {
        Self::with_catalog(default_catalog(), size)
    }

    pub fn with_catalog(catalog: Vec<FeedItem>, size: usize) -> Self {
        Self { catalog, size }
    }

    pub fn generate<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> Vec<FeedItem> {
        expand_catalog(&self.catalog, self.size, now, rng)
    }
}

impl Default for MockFeedSource {
    fn default() -> Self {
        Self::new(crate::pipeline::ALL_ROWS)
    }
}

#[async_trait::async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        let items = self.generate(Utc::now(), &mut rand::rng());
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "mock-feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sentiment_clamps_at_both_ends() {
        let low = MetricsSnapshot {
            positive_sentiment: 46,
            ..BASELINE
        };
        let v = MetricsVariance {
            sentiment: -2,
            ..Default::default()
        };
        assert_eq!(apply_variance(low, v).positive_sentiment, 45);

        let high = MetricsSnapshot {
            positive_sentiment: 90,
            ..BASELINE
        };
        assert_eq!(
            apply_variance(high, MetricsVariance::default()).positive_sentiment,
            85
        );
    }

    #[test]
    fn sampled_metrics_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let src = MockMetricsSource::new();
        for _ in 0..500 {
            let m = src.generate(&mut rng);
            assert!((2_900..2_930).contains(&m.mentions));
            assert!((393_000_000..396_500_000).contains(&m.impressions));
            assert!((62..=66).contains(&m.positive_sentiment));
            assert!((7_800..8_000).contains(&m.engagements));
        }
    }

    #[test]
    fn sentiment_weights_cut_points() {
        assert_eq!(pick_sentiment(0.0), Sentiment::Positive);
        assert_eq!(pick_sentiment(0.6199), Sentiment::Positive);
        assert_eq!(pick_sentiment(0.62), Sentiment::Neutral);
        assert_eq!(pick_sentiment(0.8699), Sentiment::Neutral);
        assert_eq!(pick_sentiment(0.87), Sentiment::Negative);
        assert_eq!(pick_sentiment(0.9999), Sentiment::Negative);
    }

    #[test]
    fn jitter_is_bounded_to_eight_percent() {
        assert_eq!(jitter_value(1_000, 0.5), 1_000);
        assert_eq!(jitter_value(1_000, 0.0), 920);
        assert_eq!(jitter_value(1_000, 1.0), 1_080);
        assert_eq!(jitter_value(0, 0.0), 0);
        assert_eq!(jitter_value(3, 0.0), 3); // 2.76 rounds up
    }

    #[test]
    fn expansion_cycles_catalog_and_keeps_absent_metrics_absent() {
        let now = Utc::now();
        let catalog = default_catalog();
        let mut rng = StdRng::seed_from_u64(42);
        let items = expand_catalog(&catalog, 50, now, &mut rng);
        assert_eq!(items.len(), 50);

        let ids: std::collections::HashSet<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 50, "ids must be unique within one response");

        for (i, it) in items.iter().enumerate() {
            let tpl = &catalog[i % catalog.len()];
            assert_eq!(it.category, tpl.category);
            assert_eq!(it.title, tpl.title);
            assert!(it.sentiment.is_some());
            assert_eq!(it.metrics.clicks.is_some(), tpl.metrics.clicks.is_some());
            assert!(crate::pipeline::parse_timestamp(&it.timestamp_iso).unwrap() < now);
        }
    }

    #[test]
    fn custom_catalog_is_cycled_to_requested_size() {
        let now = Utc::now();
        let tpl = default_catalog()[2].clone();
        let mut rng = StdRng::seed_from_u64(3);

        let src = MockFeedSource::with_catalog(vec![tpl.clone()], 3);
        let items = src.generate(now, &mut rng);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.title == tpl.title && i.category == tpl.category));

        let empty = MockFeedSource::with_catalog(Vec::new(), 10);
        assert!(empty.generate(now, &mut rng).is_empty());
    }

    #[test]
    fn neutral_draws_reproduce_template_metrics() {
        let now = Utc::now();
        let tpl = &default_catalog()[0];
        let it = expand_item(tpl, 0, now, &ItemDraws::NEUTRAL);
        assert_eq!(it.metrics, tpl.metrics);
        assert_eq!(it.id, "earned-coindesk-01");
        assert_eq!(it.sentiment, Some(Sentiment::Positive));
    }
}
