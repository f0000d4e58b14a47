//! Dashboard view state.
//!
//! The view is always in exactly one of three states. Fetches are numbered
//! for logging, but results are applied in arrival order: a refresh
//! started while another fetch is in flight does not cancel it, and
//! whichever response lands last wins.

use crate::analysis::Aggregation;
use crate::client::FetchError;
use crate::models::FeedbackRecord;
use tracing::{debug, warn};

/// State of the dashboard view.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// First fetch (or a retry) in progress, nothing to show yet.
    Loading,
    /// The last fetch failed; holds the user-facing message.
    Error(String),
    /// A snapshot is available. `refreshing` is set while a manual
    /// refresh is in flight.
    Ready {
        records: Vec<FeedbackRecord>,
        refreshing: bool,
    },
}

/// Owns the view state and hands out fetch request numbers.
#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
    last_request: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            state: DashboardState::Loading,
            last_request: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Number a new fetch. Does not change the state.
    pub fn start_fetch(&mut self) -> u64 {
        self.last_request += 1;
        debug!("Starting fetch #{}", self.last_request);
        self.last_request
    }

    /// Manual refresh. Marks a ready view as refreshing; in any state a new
    /// fetch is started, even if one is already in flight.
    pub fn begin_refresh(&mut self) -> u64 {
        if let DashboardState::Ready { refreshing, .. } = &mut self.state {
            *refreshing = true;
        }
        self.start_fetch()
    }

    /// Retry after a failure: the error view goes back to loading.
    pub fn retry(&mut self) -> u64 {
        if matches!(self.state, DashboardState::Error(_)) {
            self.state = DashboardState::Loading;
        }
        self.start_fetch()
    }

    /// Apply the outcome of fetch `request`.
    pub fn apply(&mut self, request: u64, result: Result<Vec<FeedbackRecord>, FetchError>) {
        if request < self.last_request {
            debug!(
                "Fetch #{} finished after newer fetch #{} was started",
                request, self.last_request
            );
        }

        self.state = match result {
            Ok(records) => {
                debug!("Fetch #{} returned {} records", request, records.len());
                DashboardState::Ready {
                    records,
                    refreshing: false,
                }
            }
            Err(e) => {
                warn!("Error fetching feedback (fetch #{}): {}", request, e);
                DashboardState::Error(e.user_message().to_string())
            }
        };
    }

    /// Aggregate the current snapshot, if there is one.
    pub fn aggregation(&self) -> Option<Aggregation> {
        match &self.state {
            DashboardState::Ready { records, .. } => Some(Aggregation::from_records(records)),
            _ => None,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(
            self.state,
            DashboardState::Ready {
                refreshing: true,
                ..
            }
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self.state, DashboardState::Error(_))
    }
}
