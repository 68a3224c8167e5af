//! Test infrastructure for the search client.
//!
//! Provides an in-memory transport and canned Solr fixtures so the client can
//! be exercised without a running index.

#![allow(dead_code)]

pub mod fixtures;
pub mod transport;

pub use fixtures::*;
pub use transport::*;
