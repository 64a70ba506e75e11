//! Configuration types for table controls.
//!
//! [`TableOptions`] holds the behaviour of one table instance. [`TableSchema`]
//! adds the declarative description of its columns and filters, so a whole
//! table can be loaded from a YAML file.

use super::defaults::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::filtering::{FilterKind, FilterOption, FilterType};
use crate::hub::{FilterOperator, HubFilter};
use crate::state::{ActiveSort, ExpansionVariant};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Features and persistence
// ============================================================================

/// A table feature that keeps state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableFeature {
    Filter,
    Sort,
    Pagination,
    Expansion,
    Selection,
    ActiveItem,
}

impl TableFeature {
    pub const ALL: [Self; 6] = [
        Self::Filter,
        Self::Sort,
        Self::Pagination,
        Self::Expansion,
        Self::Selection,
        Self::ActiveItem,
    ];

    /// Name used in storage keys and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Pagination => "pagination",
            Self::Expansion => "expansion",
            Self::Selection => "selection",
            Self::ActiveItem => "activeItem",
        }
    }
}

/// Where a feature's state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PersistTarget {
    /// In memory only
    #[default]
    State,
    /// The document location's query string
    UrlParams,
    /// A key/value storage backend
    Storage,
}

/// Persistence targets: a table-wide default plus per-feature overrides.
///
/// Selection is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PersistConfig {
    /// Target for features without an override
    pub default: PersistTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<PersistTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PersistTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PersistTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<PersistTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_item: Option<PersistTarget>,
}

impl PersistConfig {
    /// Persist every feature to the same target.
    #[must_use]
    pub fn all(target: PersistTarget) -> Self {
        Self {
            default: target,
            ..Self::default()
        }
    }

    /// The effective target of a feature.
    #[must_use]
    pub fn target(&self, feature: TableFeature) -> PersistTarget {
        let specific = match feature {
            TableFeature::Filter => self.filter,
            TableFeature::Sort => self.sort,
            TableFeature::Pagination => self.pagination,
            TableFeature::Expansion => self.expansion,
            TableFeature::ActiveItem => self.active_item,
            TableFeature::Selection => return PersistTarget::State,
        };
        specific.unwrap_or(self.default)
    }

    /// Whether any feature persists to the given target.
    #[must_use]
    pub fn uses(&self, target: PersistTarget) -> bool {
        TableFeature::ALL
            .iter()
            .any(|feature| self.target(*feature) == target)
    }
}

/// Enable or disable individual features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureToggles {
    pub filter: bool,
    pub sort: bool,
    pub pagination: bool,
    pub expansion: bool,
    pub selection: bool,
    pub active_item: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            filter: true,
            sort: true,
            pagination: true,
            expansion: true,
            selection: true,
            active_item: true,
        }
    }
}

impl FeatureToggles {
    #[must_use]
    pub const fn is_enabled(&self, feature: TableFeature) -> bool {
        match feature {
            TableFeature::Filter => self.filter,
            TableFeature::Sort => self.sort,
            TableFeature::Pagination => self.pagination,
            TableFeature::Expansion => self.expansion,
            TableFeature::Selection => self.selection,
            TableFeature::ActiveItem => self.active_item,
        }
    }
}

/// Pagination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PaginationOptions {
    /// Page size on first load
    pub initial_items_per_page: usize,
    /// Page sizes offered to users
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            initial_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

// ============================================================================
// Table options
// ============================================================================

/// Behaviour of one table instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TableOptions {
    /// Name used in logs
    pub table_name: String,
    /// Namespaces URL params (`prefix:key`) and storage keys. Must not
    /// contain `:`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_key_prefix: Option<String>,
    pub persist_to: PersistConfig,
    pub features: FeatureToggles,
    pub pagination: PaginationOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_sort: Option<ActiveSort>,
    pub expansion: ExpansionVariant,
}

impl TableOptions {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Create a `TableOptions` builder.
    pub fn builder(table_name: impl Into<String>) -> TableOptionsBuilder {
        TableOptionsBuilder {
            options: Self::new(table_name),
        }
    }
}

/// Builder for [`TableOptions`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct TableOptionsBuilder {
    options: TableOptions,
}

impl TableOptionsBuilder {
    pub fn persistence_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.persistence_key_prefix = Some(prefix.into());
        self
    }

    pub fn persist_to(mut self, target: PersistTarget) -> Self {
        self.options.persist_to = PersistConfig::all(target);
        self
    }

    pub fn persist_feature_to(mut self, feature: TableFeature, target: PersistTarget) -> Self {
        let config = &mut self.options.persist_to;
        match feature {
            TableFeature::Filter => config.filter = Some(target),
            TableFeature::Sort => config.sort = Some(target),
            TableFeature::Pagination => config.pagination = Some(target),
            TableFeature::Expansion => config.expansion = Some(target),
            TableFeature::ActiveItem => config.active_item = Some(target),
            TableFeature::Selection => {}
        }
        self
    }

    pub fn feature(mut self, feature: TableFeature, enabled: bool) -> Self {
        let toggles = &mut self.options.features;
        match feature {
            TableFeature::Filter => toggles.filter = enabled,
            TableFeature::Sort => toggles.sort = enabled,
            TableFeature::Pagination => toggles.pagination = enabled,
            TableFeature::Expansion => toggles.expansion = enabled,
            TableFeature::Selection => toggles.selection = enabled,
            TableFeature::ActiveItem => toggles.active_item = enabled,
        }
        self
    }

    pub fn items_per_page(mut self, items_per_page: usize) -> Self {
        self.options.pagination.initial_items_per_page = items_per_page;
        self
    }

    pub fn initial_sort(mut self, sort: ActiveSort) -> Self {
        self.options.initial_sort = Some(sort);
        self
    }

    pub fn expansion(mut self, variant: ExpansionVariant) -> Self {
        self.options.expansion = variant;
        self
    }

    #[must_use]
    pub fn build(self) -> TableOptions {
        self.options
    }
}

// ============================================================================
// Declarative table schema
// ============================================================================

/// A displayed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    pub key: String,
    #[serde(default)]
    pub label: String,
}

/// A filter category as written in a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterCategorySpec {
    /// Category key; empty for free-text search
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FilterType,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Choices for select and multiselect
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FilterOption>,
    /// Item field matched locally; defaults to the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Remote field; defaults to the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
}

impl FilterCategorySpec {
    #[must_use]
    pub fn filter_kind(&self) -> FilterKind {
        FilterKind::from_type(self.kind, self.options.clone())
    }

    /// The item field this category reads locally.
    pub fn item_field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.key)
    }
}

/// Options plus the declarative description of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TableSchema {
    pub options: TableOptions,
    /// Item field holding the row identity
    pub id_field: String,
    pub columns: Vec<ColumnSpec>,
    pub sortable_columns: Vec<String>,
    /// Sortable column key to remote sort field
    pub remote_sort_fields: IndexMap<String, String>,
    pub filters: Vec<FilterCategorySpec>,
    /// Filters always sent to the hub
    pub implicit_filters: Vec<HubFilter>,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            options: TableOptions::default(),
            id_field: "id".to_string(),
            columns: Vec::new(),
            sortable_columns: Vec::new(),
            remote_sort_fields: IndexMap::new(),
            filters: Vec::new(),
            implicit_filters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_overrides() {
        let config = PersistConfig {
            default: PersistTarget::UrlParams,
            expansion: Some(PersistTarget::State),
            ..PersistConfig::default()
        };
        assert_eq!(config.target(TableFeature::Sort), PersistTarget::UrlParams);
        assert_eq!(config.target(TableFeature::Expansion), PersistTarget::State);
        assert_eq!(config.target(TableFeature::Selection), PersistTarget::State);
        assert!(!config.uses(PersistTarget::Storage));
    }

    #[test]
    fn test_options_builder() {
        let options = TableOptions::builder("advisories")
            .persistence_key_prefix("a")
            .persist_to(PersistTarget::UrlParams)
            .persist_feature_to(TableFeature::ActiveItem, PersistTarget::Storage)
            .feature(TableFeature::Expansion, false)
            .items_per_page(20)
            .initial_sort(ActiveSort::desc("published"))
            .build();

        assert_eq!(options.persistence_key_prefix.as_deref(), Some("a"));
        assert_eq!(options.persist_to.target(TableFeature::ActiveItem), PersistTarget::Storage);
        assert!(!options.features.expansion);
        assert_eq!(options.pagination.initial_items_per_page, 20);
    }

    #[test]
    fn test_schema_from_yaml() {
        let yaml = r"
options:
  table_name: advisories
  persist_to:
    default: url_params
  initial_sort:
    columnKey: published
    direction: desc
columns:
  - key: id
    label: ID
  - key: published
sortable_columns: [published]
remote_sort_fields:
  published: published_at
filters:
  - type: search
    title: Search
  - key: severity
    type: multiselect
    options:
      - value: high
      - value: critical
        label: Critical
";
        let schema: TableSchema = serde_yaml::from_str(yaml).expect("valid schema");
        assert_eq!(schema.id_field, "id");
        assert_eq!(schema.options.persist_to.default, PersistTarget::UrlParams);
        assert_eq!(schema.options.initial_sort, Some(ActiveSort::desc("published")));
        assert_eq!(schema.filters[1].filter_kind().options().len(), 2);
        assert_eq!(schema.filters[0].key, "");
        assert_eq!(schema.remote_sort_fields["published"], "published_at");
    }
}
