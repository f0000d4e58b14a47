//! Data models for the feedback dashboard.
//!
//! This module contains the feedback record as returned by the backend
//! and the sentiment classification the dashboard recognises.
//!
//! Decoding is lenient: the backend (or the classification step behind it)
//! may leave fields out, send `null`, or send a value of the wrong type.
//! All of those are treated as "absent" rather than rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Category key used for records without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Sentiment classes shown in the sentiment chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Chart order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// The stored (wire) spelling.
    pub fn key(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Recognise a stored sentiment value.
    ///
    /// Matching is exact and case-sensitive: `"Positive"` is not recognised.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == value)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// A single feedback item as returned by `GET /feedback`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedbackRecord {
    /// Identifier assigned by the backend.
    pub id: u64,
    /// Raw feedback text.
    pub content: String,
    /// Origin channel tag (e.g. "GitHub", "Email").
    pub source: String,
    /// Stored sentiment, `None` until classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    /// Stored category key, `None` until classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Classifier summary. Only meaningful once `is_processed` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Whether the classification step has completed.
    pub is_processed: bool,
    /// Creation time, not used in aggregation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FeedbackRecord {
    /// Build a record from one element of the response array.
    ///
    /// Accepts both the documented field names and the backend's ORM
    /// spellings (`ID`, `CreatedAt`). Returns `None` only when the element
    /// is not a JSON object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        Some(Self {
            id: field(obj, &["id", "ID"])
                .and_then(Value::as_u64)
                .unwrap_or(0),
            content: string_field(obj, &["content"]).unwrap_or_default(),
            source: string_field(obj, &["source"]).unwrap_or_default(),
            sentiment: non_empty(string_field(obj, &["sentiment"])),
            category: non_empty(string_field(obj, &["category"])),
            summary: string_field(obj, &["summary"]),
            is_processed: field(obj, &["is_processed"])
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_at: field(obj, &["created_at", "CreatedAt"])
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    /// Category key used for grouping; absent categories map to `uncategorized`.
    pub fn category_key(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Recognised sentiment, if any.
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::from_stored)
    }

    /// The summary, gated on `is_processed`.
    ///
    /// A summary written before processing completed is never returned.
    /// A processed record without a summary yields an empty string.
    pub fn displayable_summary(&self) -> Option<&str> {
        self.is_processed
            .then(|| self.summary.as_deref().unwrap_or(""))
    }
}

/// Decode the response array, skipping elements that are not objects.
pub fn decode_records(values: &[Value]) -> Vec<FeedbackRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let record = FeedbackRecord::from_json(value);
            if record.is_none() {
                debug!("Skipping non-object feedback element at index {}", index);
            }
            record
        })
        .collect()
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| obj.get(*name).filter(|v| !v.is_null()))
}

fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field(obj, names).and_then(Value::as_str).map(String::from)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
