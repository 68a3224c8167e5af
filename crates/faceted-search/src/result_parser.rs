//! Solr response parser.
//!
//! Normalizes a select-handler JSON response into a [`ResultState`]:
//! documents and `numFound` from the `response` envelope, and per-field facet
//! counts from `facet_counts.facet_fields`. Documents are kept in the order
//! the backend returned them.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::registry::FieldRegistry;
use crate::types::{FacetCounts, ResultState};

/// Parses a raw response into a settled result state.
///
/// Every facet field of the registry gets an entry; fields the backend sent
/// no counts for map to empty counts.
pub fn parse(raw: &Value, registry: &FieldRegistry) -> Result<ResultState, ParseError> {
    let envelope = raw
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| missing("response"))?;

    let docs = envelope
        .get("docs")
        .ok_or_else(|| missing("response.docs"))?
        .as_array()
        .ok_or_else(|| invalid("response.docs", "expected an array"))?
        .clone();

    let num_found = envelope
        .get("numFound")
        .ok_or_else(|| missing("response.numFound"))?
        .as_u64()
        .ok_or_else(|| invalid("response.numFound", "expected a non-negative integer"))?;

    let facet_fields = raw
        .get("facet_counts")
        .and_then(|f| f.get("facet_fields"))
        .and_then(Value::as_object);

    let mut facet_counts = BTreeMap::new();
    for spec in registry.facet_fields() {
        let counts = match facet_fields.and_then(|f| f.get(&spec.field)) {
            Some(value) => parse_facet_field(&spec.field, value)?,
            None => FacetCounts::default(),
        };
        facet_counts.insert(spec.field.clone(), counts);
    }

    Ok(ResultState {
        docs,
        num_found,
        facet_counts,
        pending: false,
        error: None,
    })
}

/// Parses one field's counts.
///
/// Accepts Solr's default flat list (`["a", 3, "b", 1]`) as well as the
/// `json.nl=map` object form (`{"a": 3, "b": 1}`).
fn parse_facet_field(field: &str, value: &Value) -> Result<FacetCounts, ParseError> {
    let path = || format!("facet_counts.facet_fields.{}", field);

    match value {
        Value::Array(items) => {
            if items.len() % 2 != 0 {
                return Err(ParseError::InvalidField {
                    path: path(),
                    message: "expected alternating value/count pairs".to_string(),
                });
            }
            items
                .chunks(2)
                .map(|pair| {
                    let count = parse_count(&pair[1]).ok_or_else(|| ParseError::InvalidField {
                        path: path(),
                        message: format!("invalid count {}", pair[1]),
                    })?;
                    Ok((facet_value(&pair[0]), count))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FacetCounts::new)
        }
        Value::Object(map) => parse_facet_map(map).ok_or_else(|| ParseError::InvalidField {
            path: path(),
            message: "expected integer counts".to_string(),
        }),
        _ => Err(ParseError::InvalidField {
            path: path(),
            message: "expected an array or object".to_string(),
        }),
    }
}

fn parse_facet_map(map: &Map<String, Value>) -> Option<FacetCounts> {
    map.iter()
        .map(|(value, count)| parse_count(count).map(|c| (value.clone(), c)))
        .collect::<Option<Vec<_>>>()
        .map(FacetCounts::new)
}

fn parse_count(value: &Value) -> Option<u64> {
    value.as_u64()
}

/// Facet values of numeric fields arrive as JSON numbers or strings
/// depending on the field type; both render as their plain text.
fn facet_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(path: &str) -> ParseError {
    ParseError::MissingField {
        path: path.to_string(),
    }
}

fn invalid(path: &str, message: &str) -> ParseError {
    ParseError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
