//! Feedback aggregation and statistics.
//!
//! Pure functions over a snapshot of records: card counts, the category
//! breakdown and the sentiment distribution handed to the chart renderers.

use crate::models::{FeedbackRecord, Sentiment};
use crate::theme::{category_color, sentiment_color};
use indexmap::IndexMap;
use serde::Serialize;

/// Counts shown on the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackStats {
    /// Number of records in the snapshot.
    pub total: usize,
    /// Records whose classification has completed.
    pub processed: usize,
    /// Records still waiting for classification.
    pub pending: usize,
}

/// Per-category counts, kept in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryCounts {
    entries: IndexMap<String, usize>,
}

impl CategoryCounts {
    fn increment(&mut self, key: &str) {
        match self.entries.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.entries.insert(key.to_string(), 1);
            }
        }
    }

    /// Count for a category key, `None` if it never occurred.
    #[allow(dead_code)] // Utility for lookups by key
    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.get(key).copied()
    }

    /// Iterate `(key, count)` in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, count)| (k.as_str(), *count))
    }

    #[allow(dead_code)] // Utility for emptiness checks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Exact-match counts for the three recognised sentiments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    fn increment(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    /// Sum of the three buckets.
    pub fn sum(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// One bar of the category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBar {
    /// Display label (see [`category_display_label`]).
    pub name: String,
    pub value: usize,
    /// Category key as stored.
    pub original_key: String,
    /// Bar colour as hex.
    pub color: &'static str,
}

/// One segment of the sentiment chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentSlice {
    pub sentiment: Sentiment,
    pub name: String,
    pub value: usize,
    pub color: &'static str,
}

/// Aggregated view of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub stats: FeedbackStats,
    pub category_counts: CategoryCounts,
    pub sentiment_counts: SentimentCounts,
}

impl Aggregation {
    /// Aggregate a snapshot of records. Never fails: absent fields fall
    /// back to `uncategorized` / unclassified.
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let mut aggregation = Self::default();
        aggregation.stats.total = records.len();

        for record in records {
            if record.is_processed {
                aggregation.stats.processed += 1;
            }

            aggregation.category_counts.increment(record.category_key());

            if let Some(sentiment) = record.sentiment() {
                aggregation.sentiment_counts.increment(sentiment);
            }
        }

        aggregation.stats.pending = aggregation.stats.total - aggregation.stats.processed;
        aggregation
    }

    /// Bars for the category chart, in first-occurrence order.
    pub fn category_series(&self) -> Vec<CategoryBar> {
        self.category_counts
            .iter()
            .map(|(key, value)| CategoryBar {
                name: category_display_label(key),
                value,
                original_key: key.to_string(),
                color: category_color(key).hex,
            })
            .collect()
    }

    /// Segments for the sentiment chart. Zero-valued buckets are dropped so
    /// neither the segment nor its legend entry is rendered.
    pub fn sentiment_series(&self) -> Vec<SentimentSlice> {
        Sentiment::ALL
            .into_iter()
            .map(|sentiment| SentimentSlice {
                sentiment,
                name: sentiment.to_string(),
                value: self.sentiment_counts.get(sentiment),
                color: sentiment_color(sentiment).hex,
            })
            .filter(|slice| slice.value > 0)
            .collect()
    }
}

/// Display label for a category key.
///
/// Replaces only the first underscore: `feature_request` becomes
/// `feature request`, `a_b_c` becomes `a b_c`.
pub fn category_display_label(key: &str) -> String {
    key.replacen('_', " ", 1)
}
