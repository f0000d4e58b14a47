//! Feedback API client.
//!
//! The dashboard reads one endpoint, `GET {base_url}/feedback`, which
//! returns a JSON array of feedback records. Every failure is reported to
//! the user with the same generic message; the error variants only matter
//! for logging.

use crate::models::{decode_records, FeedbackRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Message shown for any fetch failure.
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to load feedback. Please try again later.";

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to feedback API at {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("feedback API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode feedback response: {0}")]
    Decode(String),
}

impl FetchError {
    /// The user-facing message. Identical for every variant.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILURE_MESSAGE
    }
}

/// Source of feedback snapshots.
pub trait FeedbackSource: Send + Sync + 'static {
    /// Fetch the full list of feedback records.
    fn fetch_feedback(
        &self,
    ) -> impl Future<Output = std::result::Result<Vec<FeedbackRecord>, FetchError>> + Send;

    /// Human-readable location, for logs and report metadata.
    fn describe(&self) -> String;
}

/// HTTP implementation backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFeedbackSource {
    base_url: String,
    timeout_seconds: Option<u64>,
    http_client: reqwest::Client,
}

impl HttpFeedbackSource {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// No request timeout is applied unless one is given.
    pub fn new(base_url: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        info!("Feedback API: {}", base_url);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            http_client,
        })
    }

    /// Full URL of the feedback endpoint.
    pub fn feedback_url(&self) -> String {
        format!("{}/feedback", self.base_url)
    }
}

impl FeedbackSource for HttpFeedbackSource {
    async fn fetch_feedback(&self) -> std::result::Result<Vec<FeedbackRecord>, FetchError> {
        let url = self.feedback_url();
        debug!("GET {}", url);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_seconds.unwrap_or_default())
            } else if e.is_connect() {
                FetchError::Connect(self.base_url.clone())
            } else {
                FetchError::Transport(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let values = body
            .as_array()
            .ok_or_else(|| FetchError::Decode("expected a JSON array".to_string()))?;

        let records = decode_records(values);
        debug!("Decoded {} feedback records", records.len());
        Ok(records)
    }

    fn describe(&self) -> String {
        self.feedback_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_backend(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_feedback_url_trims_trailing_slash() {
        let source = HttpFeedbackSource::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(source.feedback_url(), "http://localhost:8080/api/feedback");
    }

    #[test]
    fn test_every_error_has_the_same_user_message() {
        let errors = [
            FetchError::Timeout(5),
            FetchError::Connect("http://x".to_string()),
            FetchError::Decode("bad".to_string()),
            FetchError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: String::new(),
            },
        ];
        for err in &errors {
            assert_eq!(err.user_message(), FETCH_FAILURE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_fetch_decodes_records() {
        let app = Router::new().route(
            "/api/feedback",
            get(|| async {
                Json(json!([
                    {"ID": 2, "content": "Crash", "source": "GitHub", "category": "bug",
                     "sentiment": "negative", "summary": "App crashes", "is_processed": true},
                    {"ID": 1, "content": "Hi", "source": "Email", "is_processed": false}
                ]))
            }),
        );
        let base = spawn_backend(app).await;

        let source = HttpFeedbackSource::new(&format!("{}/api", base), None).unwrap();
        let records = source.fetch_feedback().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 2);
        assert_eq!(records[0].category_key(), "bug");
        assert!(!records[1].is_processed);
    }

    #[tokio::test]
    async fn test_fetch_empty_array() {
        let app = Router::new().route("/feedback", get(|| async { Json(json!([])) }));
        let base = spawn_backend(app).await;

        let source = HttpFeedbackSource::new(&base, None).unwrap();
        let records = source.fetch_feedback().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let app = Router::new().route(
            "/feedback",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
        );
        let base = spawn_backend(app).await;

        let source = HttpFeedbackSource::new(&base, None).unwrap();
        let err = source.fetch_feedback().await.unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "database down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_array_body() {
        let app = Router::new().route(
            "/feedback",
            get(|| async { Json(json!({"error": "nope"})) }),
        );
        let base = spawn_backend(app).await;

        let source = HttpFeedbackSource::new(&base, None).unwrap();
        let err = source.fetch_feedback().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpFeedbackSource::new(&format!("http://{}", addr), Some(5)).unwrap();
        let err = tokio_test::block_on(source.fetch_feedback()).unwrap_err();
        assert_eq!(err.user_message(), FETCH_FAILURE_MESSAGE);
    }
}
