//! Query state: the filter, sort, and page selections that drive a request.

use serde::{Deserialize, Serialize};

use super::field::{FieldValue, SortDirection};

/// The current value of one configured search field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFieldState {
    /// Backend attribute name, matching a registered [`FieldSpec`](super::FieldSpec).
    pub field: String,
    /// Current value.
    pub value: FieldValue,
}

/// The active sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Backend attribute name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Pagination position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// Zero-based page index.
    pub current_page: u64,
    /// Rows per page, always greater than zero.
    pub rows_per_page: u32,
}

impl PageState {
    /// Offset of the first row on the current page, saturating at
    /// `u64::MAX`.
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_mul(u64::from(self.rows_per_page))
    }
}

/// Full query state.
///
/// `search_fields` holds exactly one entry per registered field, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    /// One entry per registered search field.
    pub search_fields: Vec<SearchFieldState>,
    /// Active sort, if any.
    pub sort: Option<SortState>,
    /// Pagination.
    pub page: PageState,
}

impl QueryState {
    /// Looks up the state of a search field by backend name.
    pub fn search_field(&self, field: &str) -> Option<&SearchFieldState> {
        self.search_fields.iter().find(|s| s.field == field)
    }

    /// Returns the value of a search field by backend name.
    pub fn value_of(&self, field: &str) -> Option<&FieldValue> {
        self.search_field(field).map(|s| &s.value)
    }

    pub(crate) fn with_field_value(&self, field: &str, value: FieldValue) -> Self {
        let mut next = self.clone();
        for state in next.search_fields.iter_mut() {
            if state.field == field {
                state.value = value;
                break;
            }
        }
        next.page.current_page = 0;
        next
    }

    pub(crate) fn with_sort(&self, sort: Option<SortState>) -> Self {
        let mut next = self.clone();
        next.sort = sort;
        next.page.current_page = 0;
        next
    }

    pub(crate) fn with_page(&self, page: u64) -> Self {
        let mut next = self.clone();
        next.page.current_page = page;
        next
    }
}
