//! Solr query builder.
//!
//! Translates a [`QueryState`] into the ordered list of select-handler
//! parameters for one request. The output is a pure function of the query
//! state, the registry, and the static filters: equal inputs always give a
//! byte-identical parameter list.

use url::form_urlencoded;

use crate::config::StaticFilter;
use crate::registry::FieldRegistry;
use crate::types::{
    FacetSort, FieldSpec, FieldType, FieldValue, NumericRange, QueryState, SortState,
};

/// Main query used when no default-text value is set.
pub const MATCH_ALL: &str = "*:*";

/// The request parameters for one select call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolrQuery {
    params: Vec<(String, String)>,
}

impl SolrQuery {
    /// Parameters in emission order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Consumes the query, returning its parameters.
    pub fn into_params(self) -> Vec<(String, String)> {
        self.params
    }

    /// All values of a parameter, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The first value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded query string.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.params.push((name.to_string(), value.into()));
    }
}

/// Builds [`SolrQuery`]s for a registry.
pub struct SolrQueryBuilder<'a> {
    registry: &'a FieldRegistry,
    filters: &'a [StaticFilter],
}

impl<'a> SolrQueryBuilder<'a> {
    /// Creates a builder.
    pub fn new(registry: &'a FieldRegistry, filters: &'a [StaticFilter]) -> Self {
        Self { registry, filters }
    }

    /// Builds the parameters for a query state.
    pub fn build(&self, query: &QueryState) -> SolrQuery {
        let mut out = SolrQuery { params: Vec::new() };

        out.push("q", self.main_query(query));

        for filter in self.filters {
            out.push("fq", format!("{}:{}", filter.field, filter.value));
        }

        // Filters follow declaration order
        for spec in self.registry.fields() {
            if let Some(fq) = query
                .value_of(&spec.field)
                .and_then(|value| field_filter(spec, value))
            {
                out.push("fq", fq);
            }
        }

        for spec in self.registry.facet_fields() {
            out.push("facet.field", spec.field.clone());
        }
        for spec in self.registry.facet_fields() {
            let facet_sort = match spec.field_type {
                FieldType::RangeFacet => Some(FacetSort::Index),
                _ => spec.facet_sort,
            };
            if let Some(facet_sort) = facet_sort {
                out.push(&format!("f.{}.facet.sort", spec.field), facet_sort.to_string());
            }
        }

        if let Some(sort) = &query.sort {
            out.push("sort", sort_clause(sort));
        }

        out.push("start", query.page.offset().to_string());
        out.push("rows", query.page.rows_per_page.to_string());

        out.push("facet", "on");
        out.push("facet.limit", "-1");
        out.push("wt", "json");

        out
    }

    fn main_query(&self, query: &QueryState) -> String {
        self.registry
            .fields()
            .iter()
            .filter(|spec| spec.is_default_text_field())
            .find_map(|spec| match query.value_of(&spec.field) {
                Some(FieldValue::Text(text)) if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| MATCH_ALL.to_string())
    }
}

/// The filter query for one field, or `None` if the field applies no filter.
///
/// The default text field contributes to the main query instead.
fn field_filter(spec: &FieldSpec, value: &FieldValue) -> Option<String> {
    if value.is_empty() || spec.is_default_text_field() {
        return None;
    }

    match (spec.field_type, value) {
        (FieldType::Text, FieldValue::Text(text)) => Some(format!("{}:{}", spec.field, text)),
        (FieldType::ListFacet, FieldValue::List(selected)) => Some(
            selected
                .iter()
                .map(|v| format!("{}:\"{}\"", spec.field, escape_phrase(v)))
                .collect::<Vec<_>>()
                .join(" OR "),
        ),
        (FieldType::RangeFacet, FieldValue::Range(Some(range))) => {
            Some(range_filter(&spec.field, range))
        }
        _ => None,
    }
}

fn range_filter(field: &str, range: &NumericRange) -> String {
    format!("{}:[{} TO {}]", field, range.low, range.high)
}

fn sort_clause(sort: &SortState) -> String {
    format!("{} {}", sort.field, sort.direction)
}

/// Escapes a value for use inside a quoted phrase.
fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
