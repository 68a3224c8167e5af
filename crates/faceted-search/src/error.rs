//! Error types for the faceted search client.
//!
//! Errors are split by when they can happen:
//! - [`ConfigError`] at construction, fatal to the client
//! - [`StateError`] from a mutation call, recoverable and state-preserving
//! - [`FetchError`] while a request is in flight; these never cross the async
//!   boundary and are folded into the result state instead

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// Convenience alias for results carrying the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// The umbrella error for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid mutation arguments.
    #[error(transparent)]
    State(#[from] StateError),

    /// Request or response failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors in the declarative client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown field type '{field_type}' for field '{field}'")]
    UnknownFieldType { field: String, field_type: String },

    #[error("duplicate search field: {field}")]
    DuplicateSearchField { field: String },

    #[error("duplicate sort field: {field}")]
    DuplicateSortField { field: String },

    #[error("invalid sort field '{field}' ({label}): not a sortable attribute")]
    InvalidSortField { field: String, label: String },

    #[error("search field '{label}' has an empty field name")]
    EmptyFieldName { label: String },

    #[error("invalid initial value for field '{field}': {message}")]
    InvalidInitialValue { field: String, message: String },

    #[error("unsupported page strategy: {strategy}")]
    UnsupportedPageStrategy { strategy: String },

    #[error("rows per page must be greater than 0")]
    InvalidRows,

    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to load config from '{path}': {message}")]
    Load { path: String, message: String },

    #[error("no tokio runtime available: {message}")]
    NoRuntime { message: String },
}

/// Errors raised synchronously by mutation calls.
///
/// State is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    #[error("invalid sort direction '{direction}' (expected asc or desc)")]
    InvalidSortDirection { direction: String },

    #[error("invalid page: {page}")]
    InvalidPage { page: i64 },

    #[error("value for field '{field}' must be {expected}")]
    ValueTypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("invalid range for field '{field}': {message}")]
    InvalidRange { field: String, message: String },

    #[error("search client has been closed")]
    ClientClosed,
}

/// Errors decoding a backend response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("response is missing '{path}'")]
    MissingField { path: String },

    #[error("response field '{path}' is invalid: {message}")]
    InvalidField { path: String, message: String },
}

/// Errors talking to the search backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {message}")]
    Request { message: String },

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response body: {message}")]
    Decode { message: String },
}

/// Any failure between issuing a request and applying its result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
