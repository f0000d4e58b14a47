//! Markdown and JSON report generation.
//!
//! This module renders the dashboard state as a Markdown document or a
//! JSON object for piping into other tools.

use super::{
    single_line, DashboardReport, FeedbackRow, RenderOptions, ReportMetadata, LOADING_MESSAGE,
    NO_CATEGORY_DATA, NO_RECORDS, NO_SENTIMENT_DATA, PROCESSING_PLACEHOLDER, SUBTITLE, TITLE,
};
use crate::dashboard::DashboardState;
use crate::theme::{category_badge, sentiment_badge};
use anyhow::Result;
use serde::Serialize;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    state: &DashboardState,
    metadata: ReportMetadata,
    options: &RenderOptions,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", TITLE));
    output.push_str(&format!("*{}*\n\n", SUBTITLE));

    match state {
        DashboardState::Loading => {
            output.push_str(&format!("> {}\n", LOADING_MESSAGE));
        }
        DashboardState::Error(message) => {
            output.push_str("## Something went wrong\n\n");
            output.push_str(&format!("{}\n\n", message));
            output.push_str("Press t to try again, or run the command again.\n");
        }
        DashboardState::Ready {
            records,
            refreshing,
        } => {
            let report = DashboardReport::new(metadata, records, *refreshing);

            output.push_str(&generate_metadata_section(&report));
            output.push_str(&generate_stats_section(&report));
            output.push_str(&generate_category_section(&report));
            output.push_str(&generate_sentiment_section(&report));
            if options.show_table {
                output.push_str(&generate_table_section(&report.records, options));
            }
            output.push_str(&generate_footer());
        }
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &DashboardReport) -> String {
    let metadata = &report.metadata;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **API:** {}\n", metadata.api_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    if report.refreshing {
        section.push_str("- **Status:** Refreshing...\n");
    }
    section.push('\n');

    section
}

/// Generate the summary cards as a one-row table.
fn generate_stats_section(report: &DashboardReport) -> String {
    let stats = &report.stats;
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total Feedback | Processed | Pending AI |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        stats.total, stats.processed, stats.pending
    ));

    section
}

/// Generate the category breakdown.
fn generate_category_section(report: &DashboardReport) -> String {
    let mut section = String::new();

    section.push_str("## Category Breakdown\n\n");

    if report.category_series.is_empty() {
        section.push_str(&format!("_{}_\n\n", NO_CATEGORY_DATA));
        return section;
    }

    section.push_str("| Category | Count | Color |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for bar in &report.category_series {
        section.push_str(&format!(
            "| {} | {} | `{}` |\n",
            escape_cell(&bar.name),
            bar.value,
            bar.color
        ));
    }
    section.push('\n');

    section
}

/// Generate the sentiment distribution.
fn generate_sentiment_section(report: &DashboardReport) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Distribution\n\n");

    if report.sentiment_series.is_empty() {
        section.push_str(&format!("_{}_\n\n", NO_SENTIMENT_DATA));
        return section;
    }

    let total = report.sentiment_counts.sum();

    section.push_str("| Sentiment | Count | Share | Color |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for slice in &report.sentiment_series {
        let share = slice.value as f64 * 100.0 / total as f64;
        section.push_str(&format!(
            "| {} | {} | {:.0}% | `{}` |\n",
            slice.name, slice.value, share, slice.color
        ));
    }
    section.push('\n');

    section
}

/// Generate the recent feedback table.
fn generate_table_section(rows: &[FeedbackRow], options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Recent Feedback\n\n");

    if rows.is_empty() {
        section.push_str(&format!("_{}_\n\n", NO_RECORDS));
        return section;
    }

    section.push_str("| Source | Content & Summary | Category | Sentiment |\n");
    section.push_str("|:---|:---|:---|:---|\n");

    for row in rows {
        let headline = match row.summary.as_deref() {
            Some(summary) => format!("**{}**", escape_cell(summary)),
            None => format!("_{}_", PROCESSING_PLACEHOLDER),
        };
        let content = console::truncate_str(&single_line(&row.content), options.content_width, "...")
            .into_owned();

        section.push_str(&format!(
            "| `{}` | {}<br>\"{}\" | {} | {} |\n",
            escape_cell(&row.source),
            headline,
            escape_cell(&content),
            escape_cell(&category_badge(row.category.as_deref()).text),
            escape_cell(&sentiment_badge(row.sentiment.as_deref()).text),
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by feedback-funnel v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

/// JSON shape of each view state.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum JsonView<'a> {
    Loading,
    Error { message: &'a str },
    Ready(DashboardReport),
}

/// Generate a JSON report.
pub fn generate_json_report(state: &DashboardState, metadata: ReportMetadata) -> Result<String> {
    let view = match state {
        DashboardState::Loading => JsonView::Loading,
        DashboardState::Error(message) => JsonView::Error { message },
        DashboardState::Ready {
            records,
            refreshing,
        } => JsonView::Ready(DashboardReport::new(metadata, records, *refreshing)),
    };

    serde_json::to_string_pretty(&view).map_err(Into::into)
}
