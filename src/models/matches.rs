use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cursor::FeedCursor;

/// Which side of a match the pro is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingDirection {
    Offer,
    Seek,
}

impl MatchingDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingDirection::Offer => "Offer",
            MatchingDirection::Seek => "Seek",
        }
    }
}

impl fmt::Display for MatchingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single match between two pros.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchItem {
    pub id: i64,
    pub pro_id: String,
    pub target_pro_id: String,
    pub direction: Option<MatchingDirection>,
    pub score: f64,
    pub rationale: String,
    pub model_id: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Snapshot of matches for one direction.
///
/// `direction` echoes the requested direction; it is `None` when the server
/// leaves it out or sends `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchesSnapshot {
    pub direction: Option<MatchingDirection>,
    pub pro_id: String,
    pub cursor_updated_utc: DateTime<Utc>,
    pub cursor_id: i64,
    pub items: Vec<MatchItem>,
}

impl MatchesSnapshot {
    pub fn cursor(&self) -> FeedCursor {
        FeedCursor::new(self.cursor_updated_utc, self.cursor_id)
    }
}

/// Matches changed after a cursor.
///
/// Returned by the updates endpoint and carried by every `matches` stream
/// event. `direction` is absent when the request did not filter on it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchesUpdate {
    pub pro_id: String,
    pub direction: Option<MatchingDirection>,
    pub cursor_updated_utc: DateTime<Utc>,
    pub cursor_id: i64,
    pub items: Vec<MatchItem>,
}

impl MatchesUpdate {
    pub fn cursor(&self) -> FeedCursor {
        FeedCursor::new(self.cursor_updated_utc, self.cursor_id)
    }
}

/// Optional server-side filters; each is sent only when positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchFilters {
    pub min_score: f64,
    pub limit: u32,
    pub min_rationale_length: u32,
    pub max_rationale_length: u32,
}

impl MatchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn rationale_length(mut self, min: u32, max: u32) -> Self {
        self.min_rationale_length = min;
        self.max_rationale_length = max;
        self
    }

    /// Query pairs for the filters that are set.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.min_score > 0.0 {
            pairs.push(("minScore", self.min_score.to_string()));
        }
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if self.min_rationale_length > 0 {
            pairs.push(("minRationaleLength", self.min_rationale_length.to_string()));
        }
        if self.max_rationale_length > 0 {
            pairs.push(("maxRationaleLength", self.max_rationale_length.to_string()));
        }
        pairs
    }
}
