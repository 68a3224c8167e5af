//! Configuration and response fixtures.

use serde_json::{Value, json};

use helios_faceted_search::SearchClientConfig;
use helios_faceted_search::config::{SearchFieldConfig, SortFieldConfig};
use helios_faceted_search::types::{FacetSort, FieldType};

pub const SELECT_URL: &str = "http://localhost:8983/solr/persons/select";

/// A persons index: free text, a name field, a characteristics facet, and a
/// date-of-death range, sortable by name and date of birth.
pub fn persons_config() -> SearchClientConfig {
    SearchClientConfig::new(SELECT_URL)
        .with_search_field(SearchFieldConfig::new("All text fields", "*", FieldType::Text))
        .with_search_field(SearchFieldConfig::new("Name", "name_t", FieldType::Text))
        .with_search_field(
            SearchFieldConfig::new("Characteristics", "characteristics_ss", FieldType::ListFacet)
                .with_facet_sort(FacetSort::Count),
        )
        .with_search_field(SearchFieldConfig::new(
            "Date of death",
            "deathDate_i",
            FieldType::RangeFacet,
        ))
        .with_sort_field(SortFieldConfig::new("Name", "koppelnaam_s"))
        .with_sort_field(SortFieldConfig::new("Date of birth", "birthDate_i"))
}

/// A select response with the given documents and total.
pub fn solr_response(docs: Vec<Value>, num_found: u64) -> Value {
    json!({
        "responseHeader": {"status": 0, "QTime": 1},
        "response": {"numFound": num_found, "start": 0, "docs": docs},
        "facet_counts": {
            "facet_queries": {},
            "facet_fields": {
                "characteristics_ss": ["Landowner", 12, "Official", 7, "Soldier", 2],
                "deathDate_i": ["1890", 3, "1895", 1, "1900", 4]
            }
        }
    })
}

/// One document tagged with the `start` offset of the request that produced
/// it, so tests can tell responses apart.
pub fn page_response(params: &[(String, String)]) -> Value {
    let start = param(params, "start").unwrap_or("0").to_string();
    solr_response(vec![json!({"id": format!("doc-{start}")})], 42)
}

/// First value of a request parameter.
pub fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Every value of a repeated request parameter.
pub fn params_named<'a>(params: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .collect()
}
