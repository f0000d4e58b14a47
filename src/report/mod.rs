//! Dashboard rendering.
//!
//! Turns a [`DashboardState`] into terminal, Markdown or JSON output.

pub mod generator;
pub mod terminal;

use crate::analysis::{Aggregation, CategoryBar, CategoryCounts, FeedbackStats, SentimentCounts, SentimentSlice};
use crate::cli::OutputFormat;
use crate::config::ReportConfig;
use crate::dashboard::DashboardState;
use crate::models::FeedbackRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use generator::{generate_json_report, generate_markdown_report};
pub use terminal::render_terminal;

/// Title shown at the top of every rendering.
pub const TITLE: &str = "Feedback Funnel";
/// Subtitle under the title.
pub const SUBTITLE: &str = "AI-powered sentiment & category analysis";
/// Placeholder for a summary that is not displayable yet.
pub const PROCESSING_PLACEHOLDER: &str = "Processing AI...";
pub const LOADING_MESSAGE: &str = "Loading feedback data...";
pub const NO_SENTIMENT_DATA: &str = "No sentiment data yet";
pub const NO_RECORDS: &str = "No feedback records found.";
pub const NO_CATEGORY_DATA: &str = "No category data yet";

/// Layout options shared by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub chart_width: usize,
    pub content_width: usize,
    pub show_table: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for RenderOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            chart_width: config.chart_width,
            content_width: config.content_width,
            show_table: config.show_table,
        }
    }
}

/// Metadata about one rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Endpoint the snapshot was fetched from.
    pub api_url: String,
    /// When the rendering was produced.
    pub generated_at: DateTime<Utc>,
    /// Duration of the fetch in seconds.
    pub duration_seconds: f64,
}

/// One row of the feedback table.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRow {
    pub id: u64,
    pub source: String,
    pub content: String,
    /// `None` while the record is still being processed.
    pub summary: Option<String>,
    pub is_processed: bool,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&FeedbackRecord> for FeedbackRow {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            id: record.id,
            source: record.source.clone(),
            content: record.content.clone(),
            summary: record.displayable_summary().map(String::from),
            is_processed: record.is_processed,
            category: record.category.clone(),
            sentiment: record.sentiment.clone(),
            created_at: record.created_at,
        }
    }
}

/// Everything the dashboard shows for a ready snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub refreshing: bool,
    pub stats: FeedbackStats,
    pub category_counts: CategoryCounts,
    pub category_series: Vec<CategoryBar>,
    pub sentiment_counts: SentimentCounts,
    pub sentiment_series: Vec<SentimentSlice>,
    pub records: Vec<FeedbackRow>,
}

impl DashboardReport {
    pub fn new(metadata: ReportMetadata, records: &[FeedbackRecord], refreshing: bool) -> Self {
        let aggregation = Aggregation::from_records(records);

        Self {
            metadata,
            refreshing,
            stats: aggregation.stats,
            category_series: aggregation.category_series(),
            sentiment_series: aggregation.sentiment_series(),
            category_counts: aggregation.category_counts,
            sentiment_counts: aggregation.sentiment_counts,
            records: records.iter().map(FeedbackRow::from).collect(),
        }
    }
}

/// Render the current state in the requested format.
pub fn render_state(
    state: &DashboardState,
    metadata: ReportMetadata,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String> {
    let output = match format {
        OutputFormat::Terminal => render_terminal(state, metadata, options),
        OutputFormat::Markdown => generate_markdown_report(state, metadata, options),
        OutputFormat::Json => generate_json_report(state, metadata)?,
    };
    Ok(output)
}

/// Collapse a feedback text to a single line.
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_metadata() -> ReportMetadata {
        ReportMetadata {
            api_url: "http://localhost:8080/api/feedback".to_string(),
            generated_at: Utc::now(),
            duration_seconds: 0.2,
        }
    }

    pub(crate) fn test_records() -> Vec<FeedbackRecord> {
        vec![
            FeedbackRecord {
                id: 3,
                content: "Title: Crash on save\nBody: app closes".to_string(),
                source: "GitHub".to_string(),
                sentiment: Some("negative".to_string()),
                category: Some("bug".to_string()),
                summary: Some("App crashes when saving".to_string()),
                is_processed: true,
                created_at: None,
            },
            FeedbackRecord {
                id: 2,
                content: "Please add dark mode".to_string(),
                source: "Email".to_string(),
                sentiment: Some("neutral".to_string()),
                category: Some("feature_request".to_string()),
                summary: Some("Wants dark mode".to_string()),
                is_processed: true,
                created_at: None,
            },
            FeedbackRecord {
                id: 1,
                content: "Just arrived".to_string(),
                source: "App".to_string(),
                sentiment: None,
                category: None,
                summary: Some("Staged summary".to_string()),
                is_processed: false,
                created_at: None,
            },
        ]
    }

    #[test]
    fn test_row_hides_unprocessed_summary() {
        let records = test_records();
        let row = FeedbackRow::from(&records[2]);
        assert_eq!(row.summary, None);

        let row = FeedbackRow::from(&records[0]);
        assert_eq!(row.summary.as_deref(), Some("App crashes when saving"));
    }

    #[test]
    fn test_dashboard_report_counts() {
        let report = DashboardReport::new(test_metadata(), &test_records(), false);
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.pending, 1);
        assert_eq!(report.category_series.len(), 3);
        assert_eq!(report.sentiment_series.len(), 2);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\n b\t\tc "), "a b c");
    }
}
