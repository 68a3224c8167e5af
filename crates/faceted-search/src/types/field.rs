//! Field and sort declarations.
//!
//! A [`FieldSpec`] describes one searchable attribute of the index and the
//! kind of filter control it drives; a [`SortSpec`] describes one sortable
//! attribute. Both are produced by the registry from the raw configuration and
//! never change afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of filter a search field drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Free text pattern, may contain wildcards.
    Text,
    /// Set of exact values picked from the facet counts.
    ListFacet,
    /// Closed numeric interval.
    RangeFacet,
}

impl FieldType {
    /// Returns true if the backend should compute facet counts for this type.
    pub fn is_facet(&self) -> bool {
        matches!(self, FieldType::ListFacet | FieldType::RangeFacet)
    }

    /// The empty (no filter) value for this type.
    pub fn empty_value(&self) -> FieldValue {
        match self {
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::ListFacet => FieldValue::List(Vec::new()),
            FieldType::RangeFacet => FieldValue::Range(None),
        }
    }

    pub(crate) fn value_description(&self) -> &'static str {
        match self {
            FieldType::Text => "a string",
            FieldType::ListFacet => "a list of strings",
            FieldType::RangeFacet => "a [low, high] pair of numbers or null",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::ListFacet => write!(f, "list-facet"),
            FieldType::RangeFacet => write!(f, "range-facet"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "list-facet" => Ok(FieldType::ListFacet),
            "range-facet" => Ok(FieldType::RangeFacet),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction: {}", s)),
        }
    }
}

/// Ordering the backend uses for a field's facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetSort {
    /// Highest count first.
    Count,
    /// Lexicographic / numeric value order.
    Index,
}

impl fmt::Display for FacetSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetSort::Count => write!(f, "count"),
            FacetSort::Index => write!(f, "index"),
        }
    }
}

/// A closed numeric interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Inclusive lower bound.
    pub low: f64,
    /// Inclusive upper bound.
    pub high: f64,
}

impl NumericRange {
    /// Creates a range, rejecting non-finite bounds and `low > high`.
    pub fn new(low: f64, high: f64) -> Result<Self, String> {
        if !low.is_finite() || !high.is_finite() {
            return Err("range bounds must be finite numbers".to_string());
        }
        if low > high {
            return Err(format!("lower bound {} exceeds upper bound {}", low, high));
        }
        Ok(Self { low, high })
    }
}

/// The current value bound to a search field.
///
/// The variant always matches the field's [`FieldType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text pattern; empty means no filter.
    Text(String),
    /// Selected values; empty means no filter.
    List(Vec<String>),
    /// Selected interval; `None` means unbounded.
    Range(Option<NumericRange>),
}

impl FieldValue {
    /// Text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// List value from any iterator of strings.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Bounded range value. Validation happens when the value is applied.
    pub fn range(low: f64, high: f64) -> Self {
        FieldValue::Range(Some(NumericRange { low, high }))
    }

    /// Unbounded range value.
    pub fn unbounded() -> Self {
        FieldValue::Range(None)
    }

    /// Returns true if this value applies no filter.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(values) => values.is_empty(),
            FieldValue::Range(range) => range.is_none(),
        }
    }

    /// Returns true if the variant fits the given field type.
    pub fn matches_type(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::Text(_), FieldType::Text)
                | (FieldValue::List(_), FieldType::ListFacet)
                | (FieldValue::Range(_), FieldType::RangeFacet)
        )
    }

    /// Converts a JSON value into a field value of the given type.
    ///
    /// `null` maps to the type's empty value. List facets also accept a single
    /// string as a one-element selection.
    pub fn from_json(field_type: FieldType, value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Ok(field_type.empty_value());
        }
        let mismatch = || format!("expected {}", field_type.value_description());

        match field_type {
            FieldType::Text => value
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            FieldType::ListFacet => match value {
                Value::String(s) => Ok(FieldValue::List(vec![s.clone()])),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(mismatch))
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::List),
                _ => Err(mismatch()),
            },
            FieldType::RangeFacet => {
                let bounds = value.as_array().ok_or_else(mismatch)?;
                if bounds.len() != 2 {
                    return Err(mismatch());
                }
                let low = bounds[0].as_f64().ok_or_else(mismatch)?;
                let high = bounds[1].as_f64().ok_or_else(mismatch)?;
                NumericRange::new(low, high).map(|r| FieldValue::Range(Some(r)))
            }
        }
    }

    /// Returns a normalized copy: list selections are de-duplicated keeping
    /// first occurrence order.
    pub(crate) fn normalized(self) -> Self {
        match self {
            FieldValue::List(values) => {
                let mut seen = Vec::with_capacity(values.len());
                for value in values {
                    if !seen.contains(&value) {
                        seen.push(value);
                    }
                }
                FieldValue::List(seen)
            }
            other => other,
        }
    }
}

/// A validated search field declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Display label.
    pub label: String,
    /// Backend attribute name; `"*"` is the default text field.
    pub field: String,
    /// Filter kind.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Value the field starts with.
    pub initial_value: Option<FieldValue>,
    /// Requested facet value ordering, if any.
    pub facet_sort: Option<FacetSort>,
}

impl FieldSpec {
    /// Creates a field spec with no initial value.
    pub fn new(label: impl Into<String>, field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            field_type,
            initial_value: None,
            facet_sort: None,
        }
    }

    /// Returns true if this is the whole-index text field.
    pub fn is_default_text_field(&self) -> bool {
        self.field_type == FieldType::Text && self.field == "*"
    }
}

/// A validated sort field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Display label.
    pub label: String,
    /// Backend attribute name.
    pub field: String,
    /// Direction this sort starts with, if it is initially active.
    pub initial_direction: Option<SortDirection>,
}

impl SortSpec {
    /// Creates a sort spec that is initially inactive.
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            initial_direction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_parse_and_display() {
        assert_eq!("list-facet".parse::<FieldType>(), Ok(FieldType::ListFacet));
        assert_eq!("RANGE-FACET".parse::<FieldType>(), Ok(FieldType::RangeFacet));
        assert!("period-range-facet".parse::<FieldType>().is_err());
        assert_eq!(FieldType::Text.to_string(), "text");
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("up".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_value_from_json_per_type() {
        assert_eq!(
            FieldValue::from_json(FieldType::Text, &json!("jo*")),
            Ok(FieldValue::text("jo*"))
        );
        assert_eq!(
            FieldValue::from_json(FieldType::ListFacet, &json!(["a", "b"])),
            Ok(FieldValue::list(["a", "b"]))
        );
        assert_eq!(
            FieldValue::from_json(FieldType::ListFacet, &json!("a")),
            Ok(FieldValue::list(["a"]))
        );
        assert_eq!(
            FieldValue::from_json(FieldType::RangeFacet, &json!([1890, 1900])),
            Ok(FieldValue::range(1890.0, 1900.0))
        );
        assert_eq!(
            FieldValue::from_json(FieldType::RangeFacet, &Value::Null),
            Ok(FieldValue::unbounded())
        );
    }

    #[test]
    fn test_value_from_json_rejects_mismatch() {
        assert!(FieldValue::from_json(FieldType::Text, &json!(12)).is_err());
        assert!(FieldValue::from_json(FieldType::ListFacet, &json!([1, 2])).is_err());
        assert!(FieldValue::from_json(FieldType::RangeFacet, &json!([1900])).is_err());
        assert!(FieldValue::from_json(FieldType::RangeFacet, &json!([1900, 1890])).is_err());
    }

    #[test]
    fn test_value_emptiness() {
        assert!(FieldType::Text.empty_value().is_empty());
        assert!(FieldType::ListFacet.empty_value().is_empty());
        assert!(FieldType::RangeFacet.empty_value().is_empty());
        assert!(!FieldValue::text("x").is_empty());
        assert!(!FieldValue::range(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_list_normalization_keeps_first_occurrence() {
        let value = FieldValue::list(["b", "a", "b", "c", "a"]).normalized();
        assert_eq!(value, FieldValue::list(["b", "a", "c"]));
    }

    #[test]
    fn test_value_serializes_compactly() {
        assert_eq!(serde_json::to_value(FieldValue::text("x")).unwrap(), json!("x"));
        assert_eq!(
            serde_json::to_value(FieldValue::unbounded()).unwrap(),
            Value::Null
        );
    }
}
