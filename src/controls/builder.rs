//! Builder for [`TableControls`].

use super::table::{DataMode, RowKeyFn, TableConfig, TableControls};
use crate::config::{PersistTarget, TableOptions, Validatable};
use crate::error::{ConfigErrorKind, ErrorContext, OptionContext, Result, TableControlsError};
use crate::filtering::FilterCategory;
use crate::hub::HubFilter;
use crate::local::SortValuesFn;
use crate::persistence::SharedStorage;
use crate::state::SortValue;
use crate::url_params::{DocumentLocation, validate_param_key};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Builder for [`TableControls`].
///
/// Every configuration mistake is reported by [`Self::build`]; nothing is
/// checked lazily.
#[must_use]
pub struct TableControlsBuilder<T> {
    options: TableOptions,
    columns: IndexMap<String, String>,
    sortable_columns: Vec<String>,
    remote_sort_fields: BTreeMap<String, String>,
    categories: Vec<FilterCategory<T>>,
    implicit_filters: Vec<HubFilter>,
    row_key: Option<RowKeyFn<T>>,
    sort_values: Option<SortValuesFn<T>>,
    data: DataMode<T>,
    location: Option<DocumentLocation>,
    storage: Option<SharedStorage>,
}

impl<T> TableControls<T> {
    /// Start building controls for a table.
    pub fn builder(options: TableOptions) -> TableControlsBuilder<T> {
        TableControlsBuilder {
            options,
            columns: IndexMap::new(),
            sortable_columns: Vec::new(),
            remote_sort_fields: BTreeMap::new(),
            categories: Vec::new(),
            implicit_filters: Vec::new(),
            row_key: None,
            sort_values: None,
            data: DataMode::Local(Vec::new()),
            location: None,
            storage: None,
        }
    }
}

impl<T> TableControlsBuilder<T> {
    /// Declare a column, in display order.
    pub fn column(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.columns.insert(key.into(), label.into());
        self
    }

    /// Allow sorting by a declared column.
    pub fn sortable(mut self, column_key: impl Into<String>) -> Self {
        let column_key = column_key.into();
        if !self.sortable_columns.contains(&column_key) {
            self.sortable_columns.push(column_key);
        }
        self
    }

    /// Map a sortable column to the hub's sort field.
    pub fn remote_sort_field(mut self, column_key: impl Into<String>, field: impl Into<String>) -> Self {
        self.remote_sort_fields.insert(column_key.into(), field.into());
        self
    }

    pub fn filter_category(mut self, category: FilterCategory<T>) -> Self {
        self.categories.push(category);
        self
    }

    pub fn filter_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = FilterCategory<T>>,
    {
        self.categories.extend(categories);
        self
    }

    /// A hub filter sent with every request.
    pub fn implicit_filter(mut self, filter: HubFilter) -> Self {
        self.implicit_filters.push(filter);
        self
    }

    /// Row identity. Required.
    pub fn row_key<F>(mut self, row_key: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.row_key = Some(Arc::new(row_key));
        self
    }

    /// Sortable values of a row, keyed by column. Used in local mode.
    pub fn sort_values<F>(mut self, sort_values: F) -> Self
    where
        F: Fn(&T) -> HashMap<String, SortValue> + Send + Sync + 'static,
    {
        self.sort_values = Some(Arc::new(sort_values));
        self
    }

    pub fn shared_sort_values(mut self, sort_values: SortValuesFn<T>) -> Self {
        self.sort_values = Some(sort_values);
        self
    }

    /// Local mode over a fully materialized dataset.
    pub fn local(mut self, items: Vec<T>) -> Self {
        self.data = DataMode::Local(items);
        self
    }

    /// Remote mode: the hub filters, sorts and pages.
    pub fn remote(mut self) -> Self {
        self.data = DataMode::remote();
        self
    }

    pub fn data_mode(mut self, data: DataMode<T>) -> Self {
        self.data = data;
        self
    }

    /// The shared document location, needed for URL persistence.
    pub fn location(mut self, location: DocumentLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// The storage backend, needed for storage persistence.
    pub fn storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.options.pagination.initial_items_per_page == 0 {
            return Err(TableControlsError::config(
                "pagination",
                ConfigErrorKind::ZeroItemsPerPage,
            ));
        }
        if let Some(prefix) = &self.options.persistence_key_prefix {
            validate_param_key(prefix).context("persistence key prefix")?;
        }
        self.options.ensure_valid("table options")?;
        self.validate_categories().context("filter categories")?;
        self.validate_sorting().context("sorting")?;

        let persist = &self.options.persist_to;
        if persist.uses(PersistTarget::UrlParams) {
            self.location
                .as_ref()
                .context_none("url params persistence needs a document location")?;
        }
        if persist.uses(PersistTarget::Storage) {
            self.storage
                .as_ref()
                .context_none("storage persistence needs a storage backend")?;
        }
        Ok(())
    }

    fn validate_categories(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            validate_param_key(&category.key)?;
            if !seen.insert(category.key.as_str()) {
                let kind = if category.is_free_text() {
                    ConfigErrorKind::MultipleFreeTextCategories
                } else {
                    ConfigErrorKind::DuplicateCategoryKey(category.key.clone())
                };
                return Err(TableControlsError::config(
                    format!("category '{}'", category.key),
                    kind,
                ));
            }
            if self.data.is_local() && !category.can_match_locally() {
                return Err(TableControlsError::config(
                    format!("category '{}'", category.key),
                    ConfigErrorKind::MissingItemValue(category.key.clone()),
                ));
            }
        }
        Ok(())
    }

    fn validate_sorting(&self) -> Result<()> {
        for column in &self.sortable_columns {
            if !self.columns.contains_key(column) {
                return Err(TableControlsError::config(
                    format!("column '{column}'"),
                    ConfigErrorKind::UnknownSortableColumn(column.clone()),
                ));
            }
            if !self.data.is_local() && !self.remote_sort_fields.contains_key(column) {
                return Err(TableControlsError::config(
                    format!("column '{column}'"),
                    ConfigErrorKind::MissingRemoteSortField(column.clone()),
                ));
            }
        }
        if self.data.is_local() && !self.sortable_columns.is_empty() && self.sort_values.is_none() {
            return Err(TableControlsError::config(
                "local sorting",
                ConfigErrorKind::MissingSortValues,
            ));
        }
        if let Some(sort) = &self.options.initial_sort {
            if !self.sortable_columns.contains(&sort.column_key) {
                return Err(TableControlsError::config(
                    "initial sort",
                    ConfigErrorKind::InvalidInitialSort(sort.column_key.clone()),
                ));
            }
        }
        Ok(())
    }

    /// Validate the configuration and build the controls, reading any
    /// persisted state and seeding defaults into an empty location.
    pub fn build(self) -> Result<TableControls<T>> {
        let table = format!("table '{}'", self.options.table_name);
        self.validate().context(table.clone())?;
        let row_key = self.row_key.context_none(format!("{table}: row key is required"))?;

        TableControls::from_config(TableConfig {
            options: self.options,
            columns: self.columns,
            sortable_columns: self.sortable_columns,
            remote_sort_fields: self.remote_sort_fields,
            categories: self.categories,
            implicit_filters: self.implicit_filters,
            row_key,
            sort_values: self.sort_values,
            data: self.data,
            location: self.location,
            storage: self.storage,
        })
        .context(table)
    }
}
