//! Normalized result state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// A document as returned by the backend.
pub type Document = Value;

/// The count for one facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    /// Facet value, rendered as a string.
    pub value: String,
    /// Number of matching documents.
    pub count: u64,
}

/// Facet counts for one field, in the order the backend returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetCounts {
    entries: Vec<FacetCount>,
}

impl FacetCounts {
    /// Creates facet counts from `(value, count)` pairs.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(value, count)| FacetCount {
                    value: value.into(),
                    count,
                })
                .collect(),
        }
    }

    /// Count for a value, if the backend reported it.
    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    /// Iterates entries in backend order.
    pub fn iter(&self) -> impl Iterator<Item = &FacetCount> {
        self.entries.iter()
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no value was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which stage of a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The request could not be completed.
    Transport,
    /// The response could not be understood.
    Parse,
}

/// Error marker attached to a result state after a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Failure stage.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

impl From<&FetchError> for FetchFailure {
    fn from(err: &FetchError) -> Self {
        let kind = match err {
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::Parse(_) => FailureKind::Parse,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Outcome of the most recent settled request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultState {
    /// Documents in backend order.
    pub docs: Vec<Document>,
    /// Total number of matching documents.
    pub num_found: u64,
    /// Facet counts keyed by field.
    pub facet_counts: BTreeMap<String, FacetCounts>,
    /// True while a request is in flight.
    pub pending: bool,
    /// Set when the last request failed.
    pub error: Option<FetchFailure>,
}

impl ResultState {
    /// The state a client starts with: no documents, waiting for the first
    /// request.
    pub fn initial() -> Self {
        Self {
            docs: Vec::new(),
            num_found: 0,
            facet_counts: BTreeMap::new(),
            pending: true,
            error: None,
        }
    }

    /// An empty settled result carrying an error marker.
    pub fn failed(err: &FetchError) -> Self {
        Self {
            docs: Vec::new(),
            num_found: 0,
            facet_counts: BTreeMap::new(),
            pending: false,
            error: Some(FetchFailure::from(err)),
        }
    }

    /// Facet counts for a field; empty if the backend returned none.
    pub fn facets_for(&self, field: &str) -> Option<&FacetCounts> {
        self.facet_counts.get(field)
    }

    /// Returns true if the last request failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn as_pending(&self) -> Self {
        let mut next = self.clone();
        next.pending = true;
        next
    }

    pub(crate) fn as_settled(&self) -> Self {
        let mut next = self.clone();
        next.pending = false;
        next
    }
}
