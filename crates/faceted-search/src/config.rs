//! Client configuration.
//!
//! The configuration is declarative: the search fields, sort fields, and
//! paging options an application wants, in the shape a JSON config file
//! would carry them. Field entries stay loosely typed here (the field type is
//! a string, the initial value raw JSON); the [`registry`](crate::registry)
//! turns them into validated [`FieldSpec`](crate::types::FieldSpec)s.
//!
//! # Example
//!
//! ```
//! use helios_faceted_search::config::{SearchClientConfig, SearchFieldConfig, SortFieldConfig};
//! use helios_faceted_search::types::FieldType;
//!
//! let config = SearchClientConfig::new("http://localhost:8983/solr/persons/select")
//!     .with_search_field(SearchFieldConfig::new("Name", "name_t", FieldType::Text))
//!     .with_search_field(SearchFieldConfig::new("Gender", "gender_s", FieldType::ListFacet))
//!     .with_sort_field(SortFieldConfig::new("Name", "koppelnaam_s"))
//!     .with_rows(20);
//!
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::types::{FacetSort, FieldType, SortDirection};

/// Default rows per page.
pub const DEFAULT_ROWS: u32 = 10;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// A declared search field, as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFieldConfig {
    /// Display label.
    pub label: String,
    /// Backend attribute name; `"*"` for the default text field.
    pub field: String,
    /// One of `text`, `list-facet`, `range-facet`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Initial value.
    #[serde(default, alias = "initialValue", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Facet value ordering for facet fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_sort: Option<FacetSort>,
}

impl SearchFieldConfig {
    /// Creates a field declaration without an initial value.
    pub fn new(label: impl Into<String>, field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            field_type: field_type.to_string(),
            value: None,
            facet_sort: None,
        }
    }

    /// Sets the initial value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the facet ordering.
    pub fn with_facet_sort(mut self, facet_sort: FacetSort) -> Self {
        self.facet_sort = Some(facet_sort);
        self
    }
}

/// A declared sort field, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortFieldConfig {
    /// Display label.
    pub label: String,
    /// Backend attribute name.
    pub field: String,
    /// Initial direction (`asc` or `desc`), if this sort starts active.
    #[serde(
        default,
        alias = "initialDirection",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
}

impl SortFieldConfig {
    /// Creates an initially inactive sort declaration.
    pub fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            field: field.into(),
            value: None,
        }
    }

    /// Makes this sort initially active in the given direction.
    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.value = Some(direction.to_string());
        self
    }
}

/// A filter query that is sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticFilter {
    /// Backend attribute name.
    pub field: String,
    /// Raw filter value.
    pub value: String,
}

impl StaticFilter {
    /// Creates a static filter.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// How results are paged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStrategy {
    /// Numbered pages of `rows` results.
    #[default]
    Paginate,
}

impl fmt::Display for PageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStrategy::Paginate => write!(f, "paginate"),
        }
    }
}

impl FromStr for PageStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paginate" => Ok(PageStrategy::Paginate),
            other => Err(ConfigError::UnsupportedPageStrategy {
                strategy: other.to_string(),
            }),
        }
    }
}

/// When the change notifier fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    /// Only once a request has settled.
    #[default]
    SettledOnly,
    /// Also when a request is issued, so observers can show a pending state.
    PendingAndSettled,
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClientConfig {
    /// Select endpoint of the index.
    pub url: String,

    /// Declared search fields, in display and query order.
    #[serde(default)]
    pub search_fields: Vec<SearchFieldConfig>,

    /// Declared sort fields, in menu order.
    #[serde(default)]
    pub sort_fields: Vec<SortFieldConfig>,

    /// Rows per page.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Paging strategy name.
    #[serde(default = "default_page_strategy")]
    pub page_strategy: String,

    /// Filters applied to every request.
    #[serde(default)]
    pub filters: Vec<StaticFilter>,

    /// Whether observers are also notified when a request is issued.
    #[serde(default)]
    pub notify_on_fetch_start: bool,

    /// HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_rows() -> u32 {
    DEFAULT_ROWS
}

fn default_page_strategy() -> String {
    PageStrategy::Paginate.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl SearchClientConfig {
    /// Creates a configuration for the given endpoint with no fields.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            search_fields: Vec::new(),
            sort_fields: Vec::new(),
            rows: DEFAULT_ROWS,
            page_strategy: default_page_strategy(),
            filters: Vec::new(),
            notify_on_fetch_start: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Loads and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Load {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Decodes a JSON file without validating it.
    ///
    /// For callers that override options before calling
    /// [`validate`](Self::validate) themselves.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_error = |message: String| ConfigError::Load {
            path: path.display().to_string(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| load_error(e.to_string()))
    }

    /// Appends a search field.
    pub fn with_search_field(mut self, field: SearchFieldConfig) -> Self {
        self.search_fields.push(field);
        self
    }

    /// Appends a sort field.
    pub fn with_sort_field(mut self, field: SortFieldConfig) -> Self {
        self.sort_fields.push(field);
        self
    }

    /// Appends a static filter.
    pub fn with_filter(mut self, filter: StaticFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets rows per page.
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    /// Sets whether observers are notified when a request is issued.
    pub fn with_notify_on_fetch_start(mut self, enabled: bool) -> Self {
        self.notify_on_fetch_start = enabled;
        self
    }

    /// The parsed page strategy.
    pub fn page_strategy(&self) -> Result<PageStrategy, ConfigError> {
        self.page_strategy.parse()
    }

    /// The notification mode.
    pub fn notify_mode(&self) -> NotifyMode {
        if self.notify_on_fetch_start {
            NotifyMode::PendingAndSettled
        } else {
            NotifyMode::SettledOnly
        }
    }

    /// Validates the client-level options.
    ///
    /// Field declarations are validated when the registry is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        if self.rows == 0 {
            return Err(ConfigError::InvalidRows);
        }

        self.page_strategy()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CONFIG_JSON: &str = r#"{
        "url": "http://localhost:8983/solr/persons/select",
        "searchFields": [
            {"label": "All text fields", "field": "*", "type": "text"},
            {"label": "Name", "field": "name_t", "type": "text", "value": "jo*"},
            {"label": "Characteristics", "field": "characteristics_ss", "type": "list-facet", "facetSort": "count"},
            {"label": "Date of death", "field": "deathDate_i", "type": "range-facet", "initialValue": [1890, 1900]}
        ],
        "sortFields": [
            {"label": "Name", "field": "koppelnaam_s"},
            {"label": "Date of birth", "field": "birthDate_i", "value": "desc"}
        ],
        "rows": 20,
        "filters": [{"field": "type_s", "value": "person"}]
    }"#;

    #[test]
    fn test_from_json_str() {
        let config = SearchClientConfig::from_json_str(CONFIG_JSON).unwrap();

        assert_eq!(config.search_fields.len(), 4);
        assert_eq!(config.search_fields[1].value, Some(json!("jo*")));
        assert_eq!(config.search_fields[3].value, Some(json!([1890, 1900])));
        assert_eq!(config.search_fields[2].facet_sort, Some(FacetSort::Count));
        assert_eq!(config.sort_fields[1].value.as_deref(), Some("desc"));
        assert_eq!(config.rows, 20);
        assert_eq!(config.page_strategy, "paginate");
        assert_eq!(config.filters, vec![StaticFilter::new("type_s", "person")]);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config =
            SearchClientConfig::from_json_str(r#"{"url": "http://localhost/select"}"#).unwrap();
        assert_eq!(config.rows, DEFAULT_ROWS);
        assert_eq!(config.notify_mode(), NotifyMode::SettledOnly);
        assert!(matches!(config.page_strategy(), Ok(PageStrategy::Paginate)));
        assert!(config.search_fields.is_empty());
    }

    #[test]
    fn test_validate_rejects_unsupported_page_strategy() {
        let mut config = SearchClientConfig::new("http://localhost/select");
        config.page_strategy = "cursor".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedPageStrategy { strategy }) if strategy == "cursor"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_rows() {
        let config = SearchClientConfig::new("http://localhost/select").with_rows(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRows)));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = SearchClientConfig::new("not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_notify_mode_flag() {
        let config =
            SearchClientConfig::new("http://localhost/select").with_notify_on_fetch_start(true);
        assert_eq!(config.notify_mode(), NotifyMode::PendingAndSettled);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, CONFIG_JSON).unwrap();

        let config = SearchClientConfig::from_json_file(&path).unwrap();
        assert_eq!(config.url, "http://localhost:8983/solr/persons/select");

        let missing = SearchClientConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Load { .. })));
    }

    #[test]
    fn test_from_json_str_reports_decode_errors() {
        let result = SearchClientConfig::from_json_str(r#"{"searchFields": []}"#);
        assert!(matches!(result, Err(ConfigError::Load { path, .. }) if path == "<inline>"));
    }

    #[test]
    fn test_loading_validates() {
        let result = SearchClientConfig::from_json_str(
            r#"{"url": "http://localhost/select", "rows": 0}"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidRows)));

        let result = SearchClientConfig::from_json_str(r#"{"url": "not a url"}"#);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, r#"{"url": "http://localhost/select", "pageStrategy": "cursor"}"#)
            .unwrap();
        assert!(matches!(
            SearchClientConfig::from_json_file(&path),
            Err(ConfigError::UnsupportedPageStrategy { .. })
        ));

        // decoding alone leaves validation to the caller
        let mut config = SearchClientConfig::read_json_file(&path).unwrap();
        assert_eq!(config.page_strategy, "cursor");
        config.page_strategy = "paginate".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_round_trip_through_json() {
        let config = SearchClientConfig::new("http://localhost/select")
            .with_search_field(
                SearchFieldConfig::new("Name", "name_t", FieldType::Text).with_value(json!("x")),
            )
            .with_sort_field(SortFieldConfig::new("Name", "name_s").with_direction(SortDirection::Asc))
            .with_filter(StaticFilter::new("type_s", "person"));

        let encoded = serde_json::to_string(&config).unwrap();
        let decoded = SearchClientConfig::from_json_str(&encoded).unwrap();
        assert_eq!(decoded, config);
        assert_eq!(decoded.search_fields[0].field_type, "text");
        assert_eq!(decoded.sort_fields[0].value.as_deref(), Some("asc"));
    }
}
