//! Styled terminal rendering.
//!
//! Cards, charts and the table are drawn with box characters and
//! 256-colour styles from [`crate::theme`]. Padding goes through
//! `console` so escape codes never break column alignment.

use super::{
    single_line, DashboardReport, FeedbackRow, RenderOptions, ReportMetadata, LOADING_MESSAGE,
    NO_CATEGORY_DATA, NO_RECORDS, NO_SENTIMENT_DATA, PROCESSING_PLACEHOLDER, SUBTITLE, TITLE,
};
use crate::analysis::{CategoryBar, FeedbackStats, SentimentSlice};
use crate::dashboard::DashboardState;
use crate::theme::{self, category_badge, category_color, sentiment_badge, sentiment_color};
use console::{measure_text_width, pad_str, style, truncate_str, Alignment};

const INDENT: &str = "  ";
const CARD_WIDTH: usize = 20;
const SOURCE_WIDTH: usize = 10;
const CATEGORY_WIDTH: usize = 18;
const SENTIMENT_WIDTH: usize = 10;
/// Sentiment segments use distinct glyphs so the bar reads without colour.
const SEGMENT_GLYPHS: [char; 3] = ['█', '▓', '▒'];

/// Render the dashboard state for a terminal.
pub fn render_terminal(
    state: &DashboardState,
    metadata: ReportMetadata,
    options: &RenderOptions,
) -> String {
    let mut output = String::new();

    match state {
        DashboardState::Loading => {
            output.push_str(&render_header(false));
            output.push_str(&format!("{}{}\n", INDENT, style(LOADING_MESSAGE).dim()));
        }
        DashboardState::Error(message) => {
            output.push_str(&render_header(false));
            output.push_str(&render_error(message));
        }
        DashboardState::Ready {
            records,
            refreshing,
        } => {
            let report = DashboardReport::new(metadata, records, *refreshing);

            output.push_str(&render_header(report.refreshing));
            output.push_str(&render_cards(&report.stats));
            output.push_str(&render_category_chart(&report.category_series, options.chart_width));
            output.push_str(&render_sentiment_chart(&report.sentiment_series, options.chart_width));
            if options.show_table {
                output.push_str(&render_table(&report.records, options.content_width));
            }
            output.push_str(&format!(
                "\n{}{}\n",
                INDENT,
                style(format!(
                    "{} · fetched in {:.1}s · {}",
                    report.metadata.api_url,
                    report.metadata.duration_seconds,
                    report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
                ))
                .dim()
            ));
        }
    }

    output
}

fn render_header(refreshing: bool) -> String {
    let mut header = String::new();

    header.push('\n');
    header.push_str(&format!(
        "{}{}",
        INDENT,
        theme::BLUE_400.style().bold().apply_to(TITLE)
    ));
    if refreshing {
        header.push_str(&format!("   {}", style("↻ Refreshing...").dim()));
    }
    header.push('\n');
    header.push_str(&format!("{}{}\n\n", INDENT, style(SUBTITLE).dim()));

    header
}

fn render_error(message: &str) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "{}{}\n",
        INDENT,
        theme::RED_500.style().bold().apply_to("✖ Something went wrong")
    ));
    section.push_str(&format!("{}{}\n\n", INDENT, message));
    section.push_str(&format!(
        "{}{}\n",
        INDENT,
        style("Press t to try again, or run the command again.").dim()
    ));

    section
}

fn render_cards(stats: &FeedbackStats) -> String {
    let pending_value = if stats.pending > 0 {
        format!(
            "{} {}",
            theme::AMBER_500.style().bold().apply_to(stats.pending),
            theme::AMBER_500.style().apply_to("●")
        )
    } else {
        style(stats.pending).bold().to_string()
    };

    let cards = [
        (
            theme::BLUE_400.style().apply_to("Total Feedback").to_string(),
            style(stats.total).bold().to_string(),
        ),
        (
            theme::EMERALD_500.style().apply_to("Processed").to_string(),
            style(stats.processed).bold().to_string(),
        ),
        (
            theme::AMBER_500.style().apply_to("Pending AI").to_string(),
            pending_value,
        ),
    ];

    let inner = CARD_WIDTH - 2;
    let border = "─".repeat(inner);
    let mut top = String::from(INDENT);
    let mut labels = String::from(INDENT);
    let mut values = String::from(INDENT);
    let mut bottom = String::from(INDENT);

    for (label, value) in &cards {
        top.push_str(&format!("┌{}┐ ", border));
        labels.push_str(&format!(
            "│{}│ ",
            pad_str(&format!(" {}", label), inner, Alignment::Left, None)
        ));
        values.push_str(&format!(
            "│{}│ ",
            pad_str(&format!(" {}", value), inner, Alignment::Left, None)
        ));
        bottom.push_str(&format!("└{}┘ ", border));
    }

    format!(
        "{}\n{}\n{}\n{}\n\n",
        top.trim_end(),
        labels.trim_end(),
        values.trim_end(),
        bottom.trim_end()
    )
}

fn render_category_chart(bars: &[CategoryBar], width: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("{}{}\n", INDENT, style("Category Breakdown").bold()));

    if bars.is_empty() {
        section.push_str(&format!("{}{}\n\n", INDENT, style(NO_CATEGORY_DATA).dim()));
        return section;
    }

    let label_width = bars
        .iter()
        .map(|bar| measure_text_width(&bar.name))
        .max()
        .unwrap_or(0);
    let max = bars.iter().map(|bar| bar.value).max().unwrap_or(0);

    for bar in bars {
        let length = bar_length(bar.value, max, width);
        section.push_str(&format!(
            "{}{} {} {}\n",
            INDENT,
            pad_str(&bar.name, label_width, Alignment::Left, None),
            category_color(&bar.original_key)
                .style()
                .apply_to("█".repeat(length)),
            bar.value
        ));
    }
    section.push('\n');

    section
}

fn render_sentiment_chart(slices: &[SentimentSlice], width: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("{}{}\n", INDENT, style("Sentiment Distribution").bold()));

    if slices.is_empty() {
        section.push_str(&format!("{}{}\n\n", INDENT, style(NO_SENTIMENT_DATA).dim()));
        return section;
    }

    let values: Vec<usize> = slices.iter().map(|slice| slice.value).collect();
    let widths = proportional_widths(&values, width);

    let mut bar = String::from(INDENT);
    let mut legend = String::from(INDENT);
    for (slice, segment) in slices.iter().zip(widths) {
        let glyph = SEGMENT_GLYPHS[slice.sentiment as usize];
        let swatch = sentiment_color(slice.sentiment);
        bar.push_str(
            &swatch
                .style()
                .apply_to(glyph.to_string().repeat(segment))
                .to_string(),
        );
        legend.push_str(&format!(
            "{} {} ({})  ",
            swatch.style().apply_to(glyph),
            slice.name,
            slice.value
        ));
    }

    section.push_str(&bar);
    section.push('\n');
    section.push_str(legend.trim_end());
    section.push_str("\n\n");

    section
}

fn render_table(rows: &[FeedbackRow], content_width: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("{}{}\n", INDENT, style("Recent Feedback").bold()));

    if rows.is_empty() {
        section.push_str(&format!("{}{}\n", INDENT, style(NO_RECORDS).dim()));
        return section;
    }

    let content_column = content_width + 2;
    let header = format!(
        "{}{} {} {} {}",
        INDENT,
        pad_str("SOURCE", SOURCE_WIDTH, Alignment::Left, None),
        pad_str("CONTENT & SUMMARY", content_column, Alignment::Left, None),
        pad_str("CATEGORY", CATEGORY_WIDTH, Alignment::Left, None),
        "SENTIMENT"
    );
    section.push_str(&format!("{}\n", style(header).dim()));
    section.push_str(&format!(
        "{}{}\n",
        INDENT,
        style("─".repeat(SOURCE_WIDTH + content_column + CATEGORY_WIDTH + SENTIMENT_WIDTH + 3)).dim()
    ));

    for row in rows {
        let headline = match row.summary.as_deref() {
            Some(summary) => style(truncate_str(&single_line(summary), content_column, "..."))
                .bold()
                .to_string(),
            None => style(format!("⟳ {}", PROCESSING_PLACEHOLDER))
                .dim()
                .italic()
                .to_string(),
        };
        let content = format!(
            "\"{}\"",
            truncate_str(&single_line(&row.content), content_width, "...")
        );

        let category = category_badge(row.category.as_deref());
        let sentiment = sentiment_badge(row.sentiment.as_deref());

        section.push_str(&format!(
            "{}{} {} {} {}\n",
            INDENT,
            pad_str(&row.source, SOURCE_WIDTH, Alignment::Left, Some("…")),
            pad_str(&headline, content_column, Alignment::Left, None),
            pad_str(
                &category.swatch.style().apply_to(&category.text).to_string(),
                CATEGORY_WIDTH,
                Alignment::Left,
                Some("…")
            ),
            sentiment.swatch.style().bold().apply_to(&sentiment.text)
        ));
        section.push_str(&format!(
            "{}{} {}\n",
            INDENT,
            " ".repeat(SOURCE_WIDTH),
            style(content).dim()
        ));
    }

    section
}

/// Bar length for `value` on a chart whose longest bar is `width` columns.
/// Non-zero values always get at least one column.
pub(crate) fn bar_length(value: usize, max: usize, width: usize) -> usize {
    if value == 0 || max == 0 {
        return 0;
    }
    ((value * width * 2 + max) / (max * 2)).max(1)
}

/// Split `width` columns between `values` proportionally (largest
/// remainder). The result sums to `width` and every non-zero value keeps
/// at least one column when there is room.
pub(crate) fn proportional_widths(values: &[usize], width: usize) -> Vec<usize> {
    let total: usize = values.iter().sum();
    if total == 0 || width == 0 {
        return vec![0; values.len()];
    }

    let mut widths: Vec<usize> = values.iter().map(|v| v * width / total).collect();

    let mut remainders: Vec<(usize, usize)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (v * width % total, i))
        .collect();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let assigned: usize = widths.iter().sum();
    for (_, i) in remainders.into_iter().take(width - assigned) {
        widths[i] += 1;
    }

    for i in 0..values.len() {
        if values[i] > 0 && widths[i] == 0 {
            let donor = (0..widths.len())
                .filter(|&j| widths[j] > 1)
                .max_by_key(|&j| widths[j]);
            if let Some(donor) = donor {
                widths[donor] -= 1;
                widths[i] = 1;
            }
        }
    }

    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FETCH_FAILURE_MESSAGE;
    use crate::report::tests::{test_metadata, test_records};

    fn render_ready(records: Vec<crate::models::FeedbackRecord>, refreshing: bool) -> String {
        let state = DashboardState::Ready {
            records,
            refreshing,
        };
        console::strip_ansi_codes(&render_terminal(&state, test_metadata(), &RenderOptions::default()))
            .into_owned()
    }

    #[test]
    fn test_render_ready_dashboard() {
        let output = render_ready(test_records(), false);

        assert!(output.contains(TITLE));
        assert!(output.contains("Total Feedback"));
        assert!(output.contains("Pending AI"));
        assert!(output.contains("Category Breakdown"));
        assert!(output.contains("feature request"));
        assert!(output.contains("Negative (1)"));
        assert!(output.contains("Neutral (1)"));
        assert!(!output.contains("Positive ("));
        assert!(output.contains("App crashes when saving"));
        assert!(output.contains(PROCESSING_PLACEHOLDER));
        assert!(!output.contains("Staged summary"));
        assert!(output.contains("PENDING"));
        assert!(!output.contains("Refreshing"));
    }

    #[test]
    fn test_render_empty_snapshot() {
        let output = render_ready(vec![], false);

        assert!(output.contains(NO_CATEGORY_DATA));
        assert!(output.contains(NO_SENTIMENT_DATA));
        assert!(output.contains(NO_RECORDS));
    }

    #[test]
    fn test_render_refreshing_indicator() {
        let output = render_ready(test_records(), true);
        assert!(output.contains("Refreshing..."));
    }

    #[test]
    fn test_render_loading_and_error() {
        let loading = render_terminal(&DashboardState::Loading, test_metadata(), &RenderOptions::default());
        assert!(console::strip_ansi_codes(&loading).contains(LOADING_MESSAGE));

        let state = DashboardState::Error(FETCH_FAILURE_MESSAGE.to_string());
        let error = render_terminal(&state, test_metadata(), &RenderOptions::default());
        let error = console::strip_ansi_codes(&error);
        assert!(error.contains("Something went wrong"));
        assert!(error.contains(FETCH_FAILURE_MESSAGE));
    }

    #[test]
    fn test_cards_align() {
        let cards = console::strip_ansi_codes(&render_cards(&FeedbackStats {
            total: 12,
            processed: 9,
            pending: 3,
        }))
        .into_owned();
        let widths: Vec<usize> = cards
            .lines()
            .filter(|l| !l.is_empty())
            .map(measure_text_width)
            .collect();
        assert_eq!(widths.len(), 4);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_bar_length() {
        assert_eq!(bar_length(0, 10, 40), 0);
        assert_eq!(bar_length(10, 10, 40), 40);
        assert_eq!(bar_length(5, 10, 40), 20);
        assert_eq!(bar_length(1, 1000, 40), 1);
    }

    #[test]
    fn test_proportional_widths() {
        assert_eq!(proportional_widths(&[1, 1, 2], 8), vec![2, 2, 4]);
        assert_eq!(proportional_widths(&[1, 0, 99], 10), vec![1, 0, 9]);
        assert_eq!(proportional_widths(&[0, 0], 10), vec![0, 0]);

        let widths = proportional_widths(&[3, 7, 5], 40);
        assert_eq!(widths.iter().sum::<usize>(), 40);
    }
}
