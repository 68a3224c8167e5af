//! Query state store.
//!
//! The store is the single owner of the query state and the last result. It
//! is a synchronous state machine with two phases:
//!
//! - `Idle`: no request outstanding
//! - `Fetching { seq }`: the request tagged `seq` is the latest one issued
//!
//! Every mutation validates its arguments, derives a new [`QueryState`],
//! bumps the sequence number, enters `Fetching`, and hands back a
//! [`FetchRequest`] describing the request to send. The caller performs the
//! I/O and reports back through [`QueryStateStore::settle`]; settlements for
//! anything but the latest sequence number are dropped without touching
//! state. The store itself never performs I/O, which keeps it testable
//! without a runtime.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::StaticFilter;
use crate::error::{FetchError, StateError, TransportError};
use crate::query_builder::{SolrQuery, SolrQueryBuilder};
use crate::registry::FieldRegistry;
use crate::result_parser;
use crate::types::{FieldValue, NumericRange, QueryState, ResultState, SortDirection, SortState};

/// Store phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request outstanding.
    Idle,
    /// The request with this sequence number is in flight.
    Fetching {
        /// Sequence number of the latest request.
        seq: u64,
    },
}

/// A request the store wants sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Sequence number the settlement must carry.
    pub seq: u64,
    /// Parameters to send.
    pub query: SolrQuery,
}

/// How a request settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    /// The response was parsed and applied.
    Applied,
    /// The request failed; an error-flagged result was applied.
    Failed,
    /// A newer request was issued first; the response was dropped.
    Superseded,
    /// The request task ended without reporting back.
    Cancelled,
}

/// Immutable snapshot of query and result state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    /// Query state.
    pub query: Arc<QueryState>,
    /// Result state.
    pub results: Arc<ResultState>,
}

/// The query state machine.
#[derive(Debug)]
pub struct QueryStateStore {
    registry: Arc<FieldRegistry>,
    filters: Vec<StaticFilter>,
    query: Arc<QueryState>,
    results: Arc<ResultState>,
    seq: u64,
    phase: Phase,
}

impl QueryStateStore {
    /// Creates an idle store. No request is issued until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(registry: Arc<FieldRegistry>, initial: QueryState, filters: Vec<StaticFilter>) -> Self {
        Self {
            registry,
            filters,
            query: Arc::new(initial),
            results: Arc::new(ResultState::initial()),
            seq: 0,
            phase: Phase::Idle,
        }
    }

    /// Issues the first request for the current query state.
    pub fn initialize(&mut self) -> FetchRequest {
        let current = (*self.query).clone();
        self.issue(current)
    }

    /// Replaces a search field's value and resets the page.
    pub fn set_search_field_value(
        &mut self,
        field: &str,
        value: FieldValue,
    ) -> Result<FetchRequest, StateError> {
        let spec = self
            .registry
            .field(field)
            .ok_or_else(|| StateError::UnknownField {
                field: field.to_string(),
            })?;

        if !value.matches_type(spec.field_type) {
            return Err(StateError::ValueTypeMismatch {
                field: field.to_string(),
                expected: spec.field_type.value_description(),
            });
        }

        if let FieldValue::Range(Some(range)) = &value {
            NumericRange::new(range.low, range.high).map_err(|message| {
                StateError::InvalidRange {
                    field: field.to_string(),
                    message,
                }
            })?;
        }

        let next = self.query.with_field_value(field, value.normalized());
        Ok(self.issue(next))
    }

    /// Makes `field` the only active sort and resets the page.
    pub fn set_sort(
        &mut self,
        field: &str,
        direction: SortDirection,
    ) -> Result<FetchRequest, StateError> {
        if self.registry.sort_field(field).is_none() {
            return Err(StateError::UnknownField {
                field: field.to_string(),
            });
        }

        let next = self.query.with_sort(Some(SortState {
            field: field.to_string(),
            direction,
        }));
        Ok(self.issue(next))
    }

    /// String form of [`set_sort`](Self::set_sort); `direction` must be
    /// `asc` or `desc` (any case).
    pub fn set_sort_field_value(
        &mut self,
        field: &str,
        direction: &str,
    ) -> Result<FetchRequest, StateError> {
        if self.registry.sort_field(field).is_none() {
            return Err(StateError::UnknownField {
                field: field.to_string(),
            });
        }
        let direction: SortDirection =
            direction
                .parse()
                .map_err(|_| StateError::InvalidSortDirection {
                    direction: direction.to_string(),
                })?;
        self.set_sort(field, direction)
    }

    /// Removes the active sort and resets the page.
    pub fn clear_sort(&mut self) -> FetchRequest {
        let next = self.query.with_sort(None);
        self.issue(next)
    }

    /// Moves to another page, keeping filters and sort.
    ///
    /// Negative pages and pages whose first row offset does not fit in a
    /// `u64` are rejected.
    pub fn set_current_page(&mut self, page: i64) -> Result<FetchRequest, StateError> {
        let invalid = || StateError::InvalidPage { page };
        let current = u64::try_from(page).map_err(|_| invalid())?;
        current
            .checked_mul(u64::from(self.query.page.rows_per_page))
            .ok_or_else(invalid)?;

        let next = self.query.with_page(current);
        Ok(self.issue(next))
    }

    /// Clears every search field, keeps the sort, and resets the page.
    pub fn new_search(&mut self) -> FetchRequest {
        let mut next = (*self.query).clone();
        next.search_fields = self.registry.cleared_fields();
        next.page.current_page = 0;
        self.issue(next)
    }

    /// Gives up on request `seq`.
    ///
    /// If it is still the latest request the store goes back to idle and the
    /// previous results are kept, no longer marked pending. Otherwise nothing
    /// changes.
    pub fn cancel(&mut self, seq: u64) -> Settlement {
        if self.phase != (Phase::Fetching { seq }) {
            return Settlement::Superseded;
        }

        tracing::debug!(seq, "search request cancelled");
        self.phase = Phase::Idle;
        self.results = Arc::new(self.results.as_settled());
        Settlement::Cancelled
    }

    /// Applies the outcome of request `seq`.
    ///
    /// Responses for any request other than the latest are dropped and leave
    /// the store untouched.
    pub fn settle(&mut self, seq: u64, outcome: Result<Value, TransportError>) -> Settlement {
        if self.phase != (Phase::Fetching { seq }) {
            tracing::debug!(seq, latest = self.seq, "dropping superseded response");
            return Settlement::Superseded;
        }

        let parsed = outcome
            .map_err(FetchError::from)
            .and_then(|raw| result_parser::parse(&raw, &self.registry).map_err(FetchError::from));

        self.phase = Phase::Idle;
        match parsed {
            Ok(results) => {
                tracing::debug!(seq, num_found = results.num_found, "applied search results");
                self.results = Arc::new(results);
                Settlement::Applied
            }
            Err(err) => {
                tracing::warn!(seq, error = %err, "search request failed");
                self.results = Arc::new(ResultState::failed(&err));
                Settlement::Failed
            }
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SearchState {
        SearchState {
            query: Arc::clone(&self.query),
            results: Arc::clone(&self.results),
        }
    }

    /// Current query state.
    pub fn query(&self) -> &Arc<QueryState> {
        &self.query
    }

    /// Current result state.
    pub fn results(&self) -> &Arc<ResultState> {
        &self.results
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sequence number of the latest issued request (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    /// The registry this store validates against.
    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }

    fn issue(&mut self, next: QueryState) -> FetchRequest {
        let query = SolrQueryBuilder::new(&self.registry, &self.filters).build(&next);

        self.seq += 1;
        self.phase = Phase::Fetching { seq: self.seq };
        self.query = Arc::new(next);
        self.results = Arc::new(self.results.as_pending());

        tracing::debug!(seq = self.seq, params = query.params().len(), "issuing search request");
        FetchRequest {
            seq: self.seq,
            query,
        }
    }
}
