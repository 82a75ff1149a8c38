//! Run lifecycle tracking and the final search report.

use chrono::{DateTime, Utc};
use pt_types::{ParameterVector, SearchResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique search run identifier.
pub type SearchId = Uuid;

/// Lifecycle state for a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Aggregate status of a search run. Owns the running best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatus {
    pub id: SearchId,
    pub state: SearchState,
    pub restarts_requested: usize,
    pub restarts_completed: usize,
    pub best: Option<SearchResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl SearchStatus {
    pub fn new(restarts_requested: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SearchState::Pending,
            restarts_requested,
            restarts_completed: 0,
            best: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = SearchState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self) {
        self.state = SearchState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = SearchState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    /// Replace the best result if `candidate` strictly improves on it.
    /// Non-finite scores (rejected candidates) never become best.
    /// Returns whether the best changed.
    pub fn update_best(&mut self, candidate: &SearchResult) -> bool {
        if !candidate.score.is_finite() {
            return false;
        }
        let improves = match &self.best {
            None => true,
            Some(current) => candidate.score > current.score,
        };
        if improves {
            self.best = Some(candidate.clone());
        }
        improves
    }
}

/// Outcome of one restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartSummary {
    pub index: usize,
    pub start: ParameterVector,
    pub end: ParameterVector,
    /// Score of the local optimum; `None` when every state in the run failed.
    pub score: Option<f64>,
    pub moves: usize,
    pub evaluations: usize,
}

/// Everything a caller needs after a search: the best result plus timing and
/// per-restart detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub run_id: SearchId,
    pub best: SearchResult,
    pub restarts: Vec<RestartSummary>,
    pub evaluations: usize,
    pub failed_evaluations: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration of the whole run.
    pub elapsed_seconds: f64,
}

impl SearchReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
