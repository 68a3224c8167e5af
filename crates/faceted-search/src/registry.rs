//! Field registry.
//!
//! The registry is built once from the declared search and sort fields and is
//! immutable afterwards. It owns the validated [`FieldSpec`]s and
//! [`SortSpec`]s (in declaration order) and knows the query state a client
//! starts from.

use std::collections::HashSet;

use crate::config::{SearchFieldConfig, SortFieldConfig};
use crate::error::ConfigError;
use crate::types::{
    FieldSpec, FieldType, FieldValue, PageState, QueryState, SearchFieldState, SortDirection,
    SortSpec, SortState,
};

/// Validated, ordered field and sort declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRegistry {
    fields: Vec<FieldSpec>,
    sorts: Vec<SortSpec>,
}

impl FieldRegistry {
    /// Builds a registry and the initial query state.
    ///
    /// Search fields start at their declared initial value or their type's
    /// empty value. When several sort fields declare an initial direction the
    /// first one in declaration order becomes the active sort.
    pub fn build(
        search_fields: &[SearchFieldConfig],
        sort_fields: &[SortFieldConfig],
        rows: u32,
    ) -> Result<(Self, QueryState), ConfigError> {
        if rows == 0 {
            return Err(ConfigError::InvalidRows);
        }

        let fields = build_field_specs(search_fields)?;
        let sorts = build_sort_specs(sort_fields)?;
        let registry = Self { fields, sorts };
        let initial = registry.initial_query(rows);
        Ok((registry, initial))
    }

    /// Declared search fields, in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared sort fields, in order.
    pub fn sort_fields(&self) -> &[SortSpec] {
        &self.sorts
    }

    /// Looks up a search field by backend name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Looks up a sort field by backend name.
    pub fn sort_field(&self, name: &str) -> Option<&SortSpec> {
        self.sorts.iter().find(|s| s.field == name)
    }

    /// Search fields that request facet counts, in order.
    pub fn facet_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.field_type.is_facet())
    }

    /// The query state a client starts with.
    pub fn initial_query(&self, rows: u32) -> QueryState {
        let search_fields = self
            .fields
            .iter()
            .map(|spec| SearchFieldState {
                field: spec.field.clone(),
                value: spec
                    .initial_value
                    .clone()
                    .unwrap_or_else(|| spec.field_type.empty_value()),
            })
            .collect();

        let sort = self.sorts.iter().find_map(|spec| {
            spec.initial_direction.map(|direction| SortState {
                field: spec.field.clone(),
                direction,
            })
        });

        QueryState {
            search_fields,
            sort,
            page: PageState {
                current_page: 0,
                rows_per_page: rows,
            },
        }
    }

    /// Search field states with every field reset to its empty value.
    pub fn cleared_fields(&self) -> Vec<SearchFieldState> {
        self.fields
            .iter()
            .map(|spec| SearchFieldState {
                field: spec.field.clone(),
                value: spec.field_type.empty_value(),
            })
            .collect()
    }
}

fn build_field_specs(configs: &[SearchFieldConfig]) -> Result<Vec<FieldSpec>, ConfigError> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(configs.len());

    for config in configs {
        if config.field.trim().is_empty() {
            return Err(ConfigError::EmptyFieldName {
                label: config.label.clone(),
            });
        }

        let field_type: FieldType =
            config
                .field_type
                .parse()
                .map_err(|_| ConfigError::UnknownFieldType {
                    field: config.field.clone(),
                    field_type: config.field_type.clone(),
                })?;

        if !seen.insert(config.field.as_str()) {
            return Err(ConfigError::DuplicateSearchField {
                field: config.field.clone(),
            });
        }

        let initial_value = config
            .value
            .as_ref()
            .map(|raw| FieldValue::from_json(field_type, raw).map(FieldValue::normalized))
            .transpose()
            .map_err(|message| ConfigError::InvalidInitialValue {
                field: config.field.clone(),
                message,
            })?;

        specs.push(FieldSpec {
            label: config.label.clone(),
            field: config.field.clone(),
            field_type,
            initial_value,
            facet_sort: config.facet_sort,
        });
    }

    Ok(specs)
}

fn build_sort_specs(configs: &[SortFieldConfig]) -> Result<Vec<SortSpec>, ConfigError> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(configs.len());
    let mut active: Option<&str> = None;

    for config in configs {
        if !is_sortable_attribute(&config.field) {
            return Err(ConfigError::InvalidSortField {
                field: config.field.clone(),
                label: config.label.clone(),
            });
        }

        if !seen.insert(config.field.as_str()) {
            return Err(ConfigError::DuplicateSortField {
                field: config.field.clone(),
            });
        }

        let initial_direction = config
            .value
            .as_deref()
            .map(str::parse::<SortDirection>)
            .transpose()
            .map_err(|message| ConfigError::InvalidInitialValue {
                field: config.field.clone(),
                message,
            })?;

        if initial_direction.is_some() {
            match active {
                None => active = Some(config.field.as_str()),
                Some(first) => tracing::warn!(
                    active = first,
                    ignored = %config.field,
                    "several sort fields declare an initial direction; the first one wins"
                ),
            }
        }

        specs.push(SortSpec {
            label: config.label.clone(),
            field: config.field.clone(),
            initial_direction,
        });
    }

    Ok(specs)
}

/// Sort attributes are plain backend field names: non-empty, no whitespace,
/// and not the `*` pseudo-field.
fn is_sortable_attribute(field: &str) -> bool {
    !field.is_empty() && field != "*" && !field.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_configs() -> Vec<SearchFieldConfig> {
        vec![
            SearchFieldConfig::new("All text fields", "*", FieldType::Text),
            SearchFieldConfig::new("Name", "name_t", FieldType::Text).with_value(json!("jo*")),
            SearchFieldConfig::new("Characteristics", "characteristics_ss", FieldType::ListFacet),
            SearchFieldConfig::new("Date of death", "deathDate_i", FieldType::RangeFacet),
        ]
    }

    #[test]
    fn test_build_preserves_order_and_seeds_values() {
        let (registry, query) = FieldRegistry::build(&search_configs(), &[], 10).unwrap();

        let names: Vec<&str> = registry.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["*", "name_t", "characteristics_ss", "deathDate_i"]);

        let state_names: Vec<&str> = query.search_fields.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(state_names, names);

        assert_eq!(query.value_of("*"), Some(&FieldValue::text("")));
        assert_eq!(query.value_of("name_t"), Some(&FieldValue::text("jo*")));
        assert_eq!(
            query.value_of("characteristics_ss"),
            Some(&FieldValue::List(vec![]))
        );
        assert_eq!(query.value_of("deathDate_i"), Some(&FieldValue::unbounded()));
        assert_eq!(query.sort, None);
        assert_eq!(query.page.current_page, 0);
        assert_eq!(query.page.rows_per_page, 10);
    }

    #[test]
    fn test_build_rejects_unknown_type() {
        let mut configs = search_configs();
        configs[2].field_type = "tree-facet".to_string();

        let err = FieldRegistry::build(&configs, &[], 10).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownFieldType { field, field_type }
                if field == "characteristics_ss" && field_type == "tree-facet"
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_search_field() {
        let mut configs = search_configs();
        configs.push(SearchFieldConfig::new("Name again", "name_t", FieldType::Text));

        let err = FieldRegistry::build(&configs, &[], 10).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSearchField { field } if field == "name_t"));
    }

    #[test]
    fn test_build_rejects_duplicate_sort_field() {
        let sorts = vec![
            SortFieldConfig::new("Name", "koppelnaam_s"),
            SortFieldConfig::new("Name (2)", "koppelnaam_s"),
        ];
        let err = FieldRegistry::build(&[], &sorts, 10).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSortField { .. }));
    }

    #[test]
    fn test_same_field_may_be_searchable_and_sortable() {
        let searches = vec![SearchFieldConfig::new("Born", "birthDate_i", FieldType::RangeFacet)];
        let sorts = vec![SortFieldConfig::new("Born", "birthDate_i")];
        assert!(FieldRegistry::build(&searches, &sorts, 10).is_ok());
    }

    #[test]
    fn test_build_rejects_invalid_initial_value() {
        let configs = vec![
            SearchFieldConfig::new("Died", "deathDate_i", FieldType::RangeFacet)
                .with_value(json!("1890")),
        ];
        let err = FieldRegistry::build(&configs, &[], 10).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInitialValue { field, .. } if field == "deathDate_i"));
    }

    #[test]
    fn test_build_rejects_empty_field_name() {
        let configs = vec![SearchFieldConfig::new("Nameless", " ", FieldType::Text)];
        let err = FieldRegistry::build(&configs, &[], 10).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyFieldName { label } if label == "Nameless"));
    }

    #[test]
    fn test_build_rejects_unsortable_attribute() {
        for field in ["", "*", "birth date"] {
            let sorts = vec![SortFieldConfig::new("Bad", field)];
            let err = FieldRegistry::build(&[], &sorts, 10).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSortField { .. }), "{field:?}");
        }
    }

    #[test]
    fn test_build_rejects_bad_initial_direction() {
        let mut sort = SortFieldConfig::new("Name", "koppelnaam_s");
        sort.value = Some("sideways".to_string());
        let err = FieldRegistry::build(&[], &[sort], 10).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInitialValue { .. }));
    }

    #[test]
    fn test_first_initial_sort_wins() {
        let sorts = vec![
            SortFieldConfig::new("Name", "koppelnaam_s"),
            SortFieldConfig::new("Born", "birthDate_i").with_direction(SortDirection::Desc),
            SortFieldConfig::new("Died", "deathDate_i").with_direction(SortDirection::Asc),
        ];
        let (registry, query) = FieldRegistry::build(&[], &sorts, 10).unwrap();

        assert_eq!(
            query.sort,
            Some(SortState {
                field: "birthDate_i".to_string(),
                direction: SortDirection::Desc,
            })
        );
        // the losing declaration keeps its direction in the registry
        assert_eq!(
            registry.sort_field("deathDate_i").and_then(|s| s.initial_direction),
            Some(SortDirection::Asc)
        );
    }

    #[test]
    fn test_build_rejects_zero_rows() {
        assert!(matches!(
            FieldRegistry::build(&[], &[], 0),
            Err(ConfigError::InvalidRows)
        ));
    }

    #[test]
    fn test_facet_fields_and_cleared_fields() {
        let (registry, _) = FieldRegistry::build(&search_configs(), &[], 10).unwrap();

        let facets: Vec<&str> = registry.facet_fields().map(|f| f.field.as_str()).collect();
        assert_eq!(facets, vec!["characteristics_ss", "deathDate_i"]);

        let cleared = registry.cleared_fields();
        assert!(cleared.iter().all(|s| s.value.is_empty()));
        assert_eq!(cleared.len(), 4);
    }
}
