//! Core types for field declarations, query state, and result state.

mod field;
mod query;
mod results;

pub use field::{FacetSort, FieldSpec, FieldType, FieldValue, NumericRange, SortDirection, SortSpec};
pub use query::{PageState, QueryState, SearchFieldState, SortState};
pub use results::{Document, FacetCount, FacetCounts, FailureKind, FetchFailure, ResultState};
