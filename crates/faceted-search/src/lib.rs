//! Helios Faceted Search
//!
//! This crate manages the query state of a faceted search UI backed by a Solr
//! index. An application declares its search fields and sort fields once; the
//! client then turns every user intent (typing a term, ticking a facet value,
//! picking a sort, paging) into a single select request and reports the
//! resulting documents and facet counts to one observer.
//!
//! # Features
//!
//! - **Declarative fields**: text, list-facet, and range-facet fields with optional initial values
//! - **Deterministic queries**: the same query state always yields the same request parameters
//! - **Latest wins**: responses to superseded requests are discarded
//! - **Pluggable transport**: reqwest over HTTP by default, any [`SearchTransport`] in tests
//!
//! Available features:
//! - `http` (default) - reqwest-backed [`transport::HttpTransport`]
//!
//! # Architecture
//!
//! - [`types`] - Field declarations, query state, and result state
//! - [`config`] - Declarative client configuration
//! - [`registry`] - Validated field declarations
//! - [`query_builder`] - Query state to Solr select parameters
//! - [`result_parser`] - Solr JSON response to result state
//! - [`store`] - The query/result state machine with its sequence guard
//! - [`notifier`] - Observer callback and intent handlers
//! - [`transport`] - Request execution
//! - [`client`] - Everything above wired onto a tokio runtime
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use helios_faceted_search::{SearchClient, SearchClientConfig};
//! use helios_faceted_search::config::{SearchFieldConfig, SortFieldConfig};
//! use helios_faceted_search::transport::HttpTransport;
//! use helios_faceted_search::types::{FieldType, FieldValue, SortDirection};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SearchClientConfig::new("http://localhost:8983/solr/persons/select")
//!     .with_search_field(SearchFieldConfig::new("Name", "name_t", FieldType::Text))
//!     .with_search_field(SearchFieldConfig::new(
//!         "Characteristics",
//!         "characteristics_ss",
//!         FieldType::ListFacet,
//!     ))
//!     .with_search_field(SearchFieldConfig::new("Died", "deathDate_i", FieldType::RangeFacet))
//!     .with_sort_field(SortFieldConfig::new("Born", "birthDate_i"));
//!
//! let transport = Arc::new(HttpTransport::new(std::time::Duration::from_secs(10))?);
//! let client = SearchClient::new(config, transport, |state, _handlers| {
//!     for doc in &state.results.docs {
//!         println!("{doc}");
//!     }
//! })?;
//!
//! client.initialize().settled().await;
//! client.set_search_field_value("deathDate_i", FieldValue::range(1890.0, 1900.0))?;
//! client.set_sort("birthDate_i", SortDirection::Asc)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Query Building
//!
//! Query building is a pure function of the registry and the query state:
//!
//! ```
//! use helios_faceted_search::config::SearchFieldConfig;
//! use helios_faceted_search::query_builder::SolrQueryBuilder;
//! use helios_faceted_search::registry::FieldRegistry;
//! use helios_faceted_search::types::FieldType;
//!
//! let fields = vec![SearchFieldConfig::new("Name", "name_t", FieldType::Text)
//!     .with_value(serde_json::json!("jo*"))];
//! let (registry, query) = FieldRegistry::build(&fields, &[], 10).unwrap();
//!
//! let solr = SolrQueryBuilder::new(&registry, &[]).build(&query);
//! assert_eq!(solr.get("q"), Some("*:*"));
//! assert_eq!(solr.get("fq"), Some("name_t:jo*"));
//! assert_eq!(solr.get("rows"), Some("10"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod notifier;
pub mod query_builder;
pub mod registry;
pub mod result_parser;
pub mod store;
pub mod transport;
pub mod types;

// Re-export commonly used types at crate root
pub use client::{FetchTicket, SearchClient};
pub use config::SearchClientConfig;
pub use error::{ConfigError, Error, FetchError, Result, StateError};
pub use notifier::SearchHandlers;
pub use store::{SearchState, Settlement};
pub use transport::SearchTransport;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
