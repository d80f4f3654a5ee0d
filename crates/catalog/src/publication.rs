//! Bulk publish / unpublish of movies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationAction {
    Publish,
    Unpublish,
}

impl PublicationAction {
    /// Value written to `draft` for every selected movie.
    pub fn draft_value(self) -> bool {
        matches!(self, PublicationAction::Unpublish)
    }

    pub fn label(self) -> &'static str {
        match self {
            PublicationAction::Publish => "publish",
            PublicationAction::Unpublish => "unpublish",
        }
    }
}

/// Result of a bulk update, reported back to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkUpdateOutcome {
    pub updated: u64,
}

impl BulkUpdateOutcome {
    pub fn new(updated: u64) -> Self {
        Self { updated }
    }

    pub fn message(&self) -> String {
        if self.updated == 1 {
            "1 record updated".to_string()
        } else {
            format!("{} records updated", self.updated)
        }
    }
}
