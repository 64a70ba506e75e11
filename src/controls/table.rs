//! The table controls facade.

use crate::config::{PersistTarget, TableFeature, TableOptions};
use crate::error::{OptionContext, Result};
use crate::filtering::{FilterCategory, FilterParamCodec, FilterState, FilterValues};
use crate::hub::{HubFilter, HubQuery, HubRequestArgs, HubRequestParams, build_request_params};
use crate::local::{LocalPipeline, SortValuesFn, filter_items, process};
use crate::persistence::{Persistence, SharedStorage, StorageStore};
use crate::state::{
    ActiveItemParamCodec, ActiveItemState, ActiveSort, ExpandedRows, ExpansionParamCodec,
    ExpansionState, PageWindow, PaginationParamCodec, PaginationState, SelectionSet,
    SelectionState, SortParamCodec, SortState,
};
use crate::url_params::{DocumentLocation, ParamCodec, ParamUpdate, UrlParamStore};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Derives the stable identity of a row.
pub type RowKeyFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Where the rows come from. Fixed at construction.
#[derive(Debug, Clone)]
pub enum DataMode<T> {
    /// The whole dataset is in memory; filter, sort and paginate locally.
    Local(Vec<T>),
    /// The hub pages the dataset; the caller reports each page back.
    Remote {
        items: Vec<T>,
        total_count: Option<usize>,
    },
}

impl<T> DataMode<T> {
    #[must_use]
    pub const fn remote() -> Self {
        Self::Remote {
            items: Vec::new(),
            total_count: None,
        }
    }

    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote { .. } => "remote",
        }
    }

    /// The rows currently held: the full dataset, or the last remote page.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Local(items) | Self::Remote { items, .. } => items,
        }
    }
}

/// The rows to render and the size of the full result.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a, T> {
    pub items: Vec<&'a T>,
    /// Filtered, unpaginated size
    pub total_count: usize,
}

/// Everything the builder hands over after validation.
pub(super) struct TableConfig<T> {
    pub options: TableOptions,
    pub columns: IndexMap<String, String>,
    pub sortable_columns: Vec<String>,
    pub remote_sort_fields: BTreeMap<String, String>,
    pub categories: Vec<FilterCategory<T>>,
    pub implicit_filters: Vec<HubFilter>,
    pub row_key: RowKeyFn<T>,
    pub sort_values: Option<SortValuesFn<T>>,
    pub data: DataMode<T>,
    pub location: Option<DocumentLocation>,
    pub storage: Option<SharedStorage>,
}

/// Features touched by one transition.
#[derive(Debug, Clone, Copy, Default)]
struct Touched {
    filter: bool,
    sort: bool,
    pagination: bool,
    expansion: bool,
    active_item: bool,
}

impl Touched {
    const ALL: Self = Self {
        filter: true,
        sort: true,
        pagination: true,
        expansion: true,
        active_item: true,
    };

    fn only(feature: TableFeature) -> Self {
        let mut touched = Self::default();
        match feature {
            TableFeature::Filter => touched.filter = true,
            TableFeature::Sort => touched.sort = true,
            TableFeature::Pagination => touched.pagination = true,
            TableFeature::Expansion => touched.expansion = true,
            TableFeature::ActiveItem => touched.active_item = true,
            TableFeature::Selection => {}
        }
        touched
    }
}

#[derive(Debug)]
struct FeatureStores {
    filter: Persistence<FilterParamCodec>,
    sort: Persistence<SortParamCodec>,
    pagination: Persistence<PaginationParamCodec>,
    expansion: Persistence<ExpansionParamCodec>,
    active_item: Persistence<ActiveItemParamCodec>,
}

impl FeatureStores {
    fn take_seed_updates(&mut self) -> Vec<(String, ParamUpdate)> {
        let mut updates = self.filter.take_seed_updates();
        updates.extend(self.sort.take_seed_updates());
        updates.extend(self.pagination.take_seed_updates());
        updates.extend(self.expansion.take_seed_updates());
        updates.extend(self.active_item.take_seed_updates());
        updates
    }
}

/// Builds one feature's persistence from the table options.
struct StoreFactory<'a> {
    options: &'a TableOptions,
    location: Option<&'a DocumentLocation>,
    storage: Option<&'a SharedStorage>,
}

impl StoreFactory<'_> {
    fn storage_key(&self, feature: TableFeature) -> String {
        let prefix = self
            .options
            .persistence_key_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.options.table_name);
        format!("{prefix}:{}", feature.name())
    }

    fn build<C>(&self, feature: TableFeature, codec: C, default: C::Value) -> Result<Persistence<C>>
    where
        C: ParamCodec + fmt::Debug,
    {
        let target = if self.options.features.is_enabled(feature) {
            self.options.persist_to.target(feature)
        } else {
            PersistTarget::State
        };
        Ok(match target {
            PersistTarget::State => Persistence::State,
            PersistTarget::UrlParams => {
                let location = self.location.cloned().with_context_none(|| {
                    format!("{} persists to url params but no location was given", feature.name())
                })?;
                Persistence::UrlParams(UrlParamStore::new(
                    location,
                    self.options.persistence_key_prefix.clone(),
                    codec,
                    default,
                )?)
            }
            PersistTarget::Storage => {
                let storage = self.storage.cloned().with_context_none(|| {
                    format!("{} persists to storage but no storage was given", feature.name())
                })?;
                Persistence::Storage(StorageStore::new(
                    storage,
                    self.storage_key(feature),
                    codec,
                    default,
                ))
            }
        })
    }
}

/// Filter, sort, pagination, expansion, selection and active-item state for
/// one table, with the derived request descriptor or local page.
///
/// Mutators are synchronous. Each one is a single transition: every feature
/// it changes, including a page reset caused by a filter or sort change, is
/// written to the location in one commit.
pub struct TableControls<T> {
    options: TableOptions,
    columns: IndexMap<String, String>,
    categories: Vec<FilterCategory<T>>,
    implicit_filters: Vec<HubFilter>,
    remote_sort_fields: BTreeMap<String, String>,
    row_key: RowKeyFn<T>,
    sort_values: Option<SortValuesFn<T>>,
    data: DataMode<T>,
    location: Option<DocumentLocation>,

    filter: FilterState,
    sort: SortState,
    pagination: PaginationState,
    expansion: ExpansionState,
    selection: SelectionState,
    active_item: ActiveItemState,
    stores: FeatureStores,
}

impl<T> TableControls<T> {
    pub(super) fn from_config(config: TableConfig<T>) -> Result<Self> {
        let TableConfig {
            options,
            columns,
            sortable_columns,
            remote_sort_fields,
            categories,
            implicit_filters,
            row_key,
            sort_values,
            data,
            location,
            storage,
        } = config;

        let filter = FilterState::from_categories(&categories);
        let sort = SortState::new(sortable_columns.clone(), options.initial_sort.clone());
        let pagination = PaginationState::new(options.pagination.initial_items_per_page);
        let expansion = ExpansionState::new(options.expansion);

        let factory = StoreFactory {
            options: &options,
            location: location.as_ref(),
            storage: storage.as_ref(),
        };
        let stores = FeatureStores {
            filter: factory.build(
                TableFeature::Filter,
                FilterParamCodec::new(categories.iter().map(|c| (c.key.clone(), c.filter_type()))),
                FilterValues::new(),
            )?,
            sort: factory.build(
                TableFeature::Sort,
                SortParamCodec::new(sortable_columns),
                sort.initial().cloned(),
            )?,
            pagination: factory.build(
                TableFeature::Pagination,
                PaginationParamCodec,
                pagination.window(),
            )?,
            expansion: factory.build(
                TableFeature::Expansion,
                ExpansionParamCodec::new(options.expansion),
                ExpandedRows::empty(options.expansion),
            )?,
            active_item: factory.build(TableFeature::ActiveItem, ActiveItemParamCodec, None)?,
        };

        let mut controls = Self {
            options,
            columns,
            categories,
            implicit_filters,
            remote_sort_fields,
            row_key,
            sort_values,
            data,
            location,
            filter,
            sort,
            pagination,
            expansion,
            selection: SelectionState::new(),
            active_item: ActiveItemState::new(),
            stores,
        };
        controls.sync_from_location();
        tracing::debug!(
            table = %controls.options.table_name,
            mode = controls.data.name(),
            "table controls ready"
        );
        Ok(controls)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Re-read persisted state, e.g. after the location changed by
    /// navigation, then seed defaults for features whose parameters are all
    /// absent. Malformed values fall back to the current state.
    pub fn sync_from_location(&mut self) {
        if let Some(values) = self.stores.filter.read(self.filter.values()) {
            self.filter.restore(values);
        }
        if let Some(sort) = self.stores.sort.read(&self.sort.active().cloned()) {
            self.sort.restore(sort);
        }
        if let Some(window) = self.stores.pagination.read(&self.pagination.window()) {
            self.pagination.restore(window);
        }
        if let Some(rows) = self.stores.expansion.read(self.expansion.rows()) {
            self.expansion.restore(rows);
        }
        let active = self.active_item.active_key().map(str::to_string);
        if let Some(active) = self.stores.active_item.read(&active) {
            self.active_item.restore(active);
        }

        let seeds = self.stores.take_seed_updates();
        self.apply_to_location(seeds);
    }

    fn apply_to_location(&self, updates: Vec<(String, ParamUpdate)>) -> bool {
        match &self.location {
            Some(location) if !updates.is_empty() => location.apply(updates),
            _ => false,
        }
    }

    /// Persist the touched features in one location commit.
    fn commit(&self, touched: Touched) -> bool {
        let mut updates = Vec::new();
        if touched.filter {
            let values = self.filter.values();
            updates.extend(self.stores.filter.url_updates(values));
            self.stores.filter.write_storage(values);
        }
        if touched.sort {
            let sort = self.sort.active().cloned();
            updates.extend(self.stores.sort.url_updates(&sort));
            self.stores.sort.write_storage(&sort);
        }
        if touched.pagination {
            let window = self.pagination.window();
            updates.extend(self.stores.pagination.url_updates(&window));
            self.stores.pagination.write_storage(&window);
        }
        if touched.expansion {
            let rows = self.expansion.rows();
            updates.extend(self.stores.expansion.url_updates(rows));
            self.stores.expansion.write_storage(rows);
        }
        if touched.active_item {
            let active = self.active_item.active_key().map(str::to_string);
            updates.extend(self.stores.active_item.url_updates(&active));
            self.stores.active_item.write_storage(&active);
        }
        self.apply_to_location(updates)
    }

    /// Write every feature's current state, e.g. to make the URL shareable.
    pub fn persist_all(&self) -> bool {
        self.commit(Touched::ALL)
    }

    fn is_enabled(&self, feature: TableFeature) -> bool {
        let enabled = self.options.features.is_enabled(feature);
        if !enabled {
            tracing::debug!(
                table = %self.options.table_name,
                feature = feature.name(),
                "ignoring change to disabled feature"
            );
        }
        enabled
    }

    /// Upstream state changed: go back to the first page in the same
    /// transition. In remote mode the total is unknown until the next
    /// report.
    fn upstream_changed(&mut self, mut touched: Touched) {
        if let DataMode::Remote { total_count, .. } = &mut self.data {
            // The reported total belongs to the previous request.
            *total_count = None;
            self.pagination.set_total_items(None);
        }
        if self.options.features.pagination && self.pagination.page_number() != 1 {
            self.pagination.reset_page();
            touched.pagination = true;
        }
        self.commit(touched);
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Set the atoms of one category; `None` or no atoms clears it.
    pub fn set_filter_value(&mut self, key: &str, atoms: Option<Vec<String>>) {
        if !self.is_enabled(TableFeature::Filter) {
            return;
        }
        if self.filter.set_value(key, atoms) {
            self.upstream_changed(Touched::only(TableFeature::Filter));
        }
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.set_filter_value(key, None);
    }

    /// Clear every category except `excluding`.
    pub fn clear_all_filters(&mut self, excluding: &[&str]) {
        if !self.is_enabled(TableFeature::Filter) {
            return;
        }
        self.filter.clear_all(excluding);
        self.upstream_changed(Touched::only(TableFeature::Filter));
    }

    /// Replace all filter values at once.
    pub fn set_filter_values(&mut self, values: FilterValues) {
        if !self.is_enabled(TableFeature::Filter) {
            return;
        }
        self.filter.restore(values);
        self.upstream_changed(Touched::only(TableFeature::Filter));
    }

    pub const fn filter_values(&self) -> &FilterValues {
        self.filter.values()
    }

    pub fn filter_categories(&self) -> &[FilterCategory<T>] {
        &self.categories
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Sort by a column. A non-sortable column is ignored.
    pub fn set_active_sort(&mut self, sort: ActiveSort) {
        if !self.is_enabled(TableFeature::Sort) {
            return;
        }
        if self.sort.set_active_sort(sort) {
            self.upstream_changed(Touched::only(TableFeature::Sort));
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        if !self.is_enabled(TableFeature::Sort) {
            return;
        }
        if self.sort.toggle_direction() {
            self.upstream_changed(Touched::only(TableFeature::Sort));
        }
    }

    /// Header click: the active column flips, another column starts
    /// ascending.
    pub fn sort_by_column(&mut self, column_key: &str) {
        if !self.is_enabled(TableFeature::Sort) {
            return;
        }
        if self.sort.sort_by_column(column_key) {
            self.upstream_changed(Touched::only(TableFeature::Sort));
        }
    }

    pub fn clear_sort(&mut self) {
        if !self.is_enabled(TableFeature::Sort) {
            return;
        }
        self.sort.clear();
        self.upstream_changed(Touched::only(TableFeature::Sort));
    }

    pub fn active_sort(&self) -> Option<&ActiveSort> {
        self.sort.active()
    }

    pub fn sortable_columns(&self) -> &[String] {
        self.sort.sortable_columns()
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    fn refresh_total(&mut self) {
        let total = match &self.data {
            DataMode::Local(_) => Some(self.total_count()),
            DataMode::Remote { total_count, .. } => *total_count,
        };
        self.pagination.set_total_items(total);
    }

    /// Go to a page, clamped once the total is known.
    pub fn set_page(&mut self, page_number: usize) {
        if !self.is_enabled(TableFeature::Pagination) {
            return;
        }
        self.refresh_total();
        self.pagination.set_page(page_number);
        self.commit(Touched::only(TableFeature::Pagination));
    }

    /// Change the page size, keeping the first visible item on screen.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        if !self.is_enabled(TableFeature::Pagination) {
            return;
        }
        self.refresh_total();
        self.pagination.set_items_per_page(items_per_page);
        self.commit(Touched::only(TableFeature::Pagination));
    }

    pub const fn page_window(&self) -> PageWindow {
        self.pagination.window()
    }

    /// Number of pages, once the total is known.
    pub fn page_count(&self) -> Option<usize> {
        let total = match &self.data {
            DataMode::Local(_) => Some(self.total_count()),
            DataMode::Remote { total_count, .. } => *total_count,
        };
        total.map(|total| self.pagination.window().page_count(total))
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.options.pagination.page_size_options
    }

    // ------------------------------------------------------------------
    // Expansion
    // ------------------------------------------------------------------

    /// Toggle a row, or a column of a row under compound expansion.
    pub fn toggle_expanded(&mut self, item: &T, column_key: Option<&str>) {
        if !self.is_enabled(TableFeature::Expansion) {
            return;
        }
        let key = (self.row_key)(item);
        self.expansion.toggle(&key, column_key);
        self.commit(Touched::only(TableFeature::Expansion));
    }

    pub fn set_expanded(&mut self, item: &T, column_key: Option<&str>, expanded: bool) {
        if !self.is_enabled(TableFeature::Expansion) {
            return;
        }
        let key = (self.row_key)(item);
        self.expansion.set_expanded(&key, column_key, expanded);
        self.commit(Touched::only(TableFeature::Expansion));
    }

    #[must_use]
    pub fn is_expanded(&self, item: &T, column_key: Option<&str>) -> bool {
        self.expansion.is_expanded(&(self.row_key)(item), column_key)
    }

    /// The open column of a row under compound expansion.
    #[must_use]
    pub fn expanded_column(&self, item: &T) -> Option<&str> {
        self.expansion.expanded_column(&(self.row_key)(item))
    }

    pub fn collapse_all(&mut self) {
        if !self.is_enabled(TableFeature::Expansion) {
            return;
        }
        self.expansion.collapse_all();
        self.commit(Touched::only(TableFeature::Expansion));
    }

    pub const fn expanded_rows(&self) -> &ExpandedRows {
        self.expansion.rows()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn toggle_selected(&mut self, item: &T) {
        if !self.is_enabled(TableFeature::Selection) {
            return;
        }
        self.selection.toggle(&(self.row_key)(item));
    }

    /// Select or deselect several rows.
    pub fn select_items<'i, I>(&mut self, items: I, selected: bool)
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        if !self.is_enabled(TableFeature::Selection) {
            return;
        }
        let keys: Vec<String> = items.into_iter().map(|item| (self.row_key)(item)).collect();
        self.selection
            .set_many(keys.iter().map(String::as_str), selected);
    }

    /// Select exactly these rows.
    pub fn select_only<'i, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        if !self.is_enabled(TableFeature::Selection) {
            return;
        }
        let keys: Vec<String> = items.into_iter().map(|item| (self.row_key)(item)).collect();
        self.selection.select_only(keys.iter().map(String::as_str));
    }

    /// Select every row, including rows not loaded.
    pub fn select_all(&mut self) {
        if !self.is_enabled(TableFeature::Selection) {
            return;
        }
        self.selection.select_all();
    }

    pub fn clear_selection(&mut self) {
        if !self.is_enabled(TableFeature::Selection) {
            return;
        }
        self.selection.clear();
    }

    #[must_use]
    pub fn is_selected(&self, item: &T) -> bool {
        self.selection.is_selected(&(self.row_key)(item))
    }

    pub const fn selection(&self) -> &SelectionSet {
        self.selection.set()
    }

    /// Number of selected rows out of the filtered total.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.selected_count(self.total_count())
    }

    /// The selected rows among those held: the whole dataset in local mode,
    /// the current page in remote mode.
    #[must_use]
    pub fn selected_items(&self) -> Vec<&T> {
        self.data
            .items()
            .iter()
            .filter(|item| self.is_selected(item))
            .collect()
    }

    // ------------------------------------------------------------------
    // Active item
    // ------------------------------------------------------------------

    /// Make a row active, or clear the active row with `None`.
    pub fn set_active_item(&mut self, item: Option<&T>) {
        if !self.is_enabled(TableFeature::ActiveItem) {
            return;
        }
        let key = item.map(|item| (self.row_key)(item));
        self.active_item.set_active(key.as_deref());
        self.commit(Touched::only(TableFeature::ActiveItem));
    }

    pub fn clear_active_item(&mut self) {
        self.set_active_item(None);
    }

    pub fn active_item_key(&self) -> Option<&str> {
        self.active_item.active_key()
    }

    /// The active row, if it is among the rows held.
    #[must_use]
    pub fn active_item(&self) -> Option<&T> {
        let key = self.active_item.active_key()?;
        self.data
            .items()
            .iter()
            .find(|item| (self.row_key)(*item) == key)
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    pub const fn is_local(&self) -> bool {
        self.data.is_local()
    }

    /// Replace the local dataset. Returns `false` in remote mode.
    pub fn set_items(&mut self, items: Vec<T>) -> bool {
        match &mut self.data {
            DataMode::Local(current) => {
                *current = items;
                true
            }
            DataMode::Remote { .. } => {
                tracing::debug!(table = %self.options.table_name, "set_items ignored in remote mode");
                false
            }
        }
    }

    /// Record the page the hub returned for the current request. Returns
    /// `false` in local mode.
    pub fn report_remote_result(&mut self, page_items: Vec<T>, total: usize) -> bool {
        match &mut self.data {
            DataMode::Remote { items, total_count } => {
                *items = page_items;
                *total_count = Some(total);
                self.pagination.set_total_items(Some(total));
                true
            }
            DataMode::Local(_) => {
                tracing::debug!(
                    table = %self.options.table_name,
                    "report_remote_result ignored in local mode"
                );
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// The request descriptor for the current state.
    pub fn request_params(&self) -> Result<HubRequestParams> {
        let features = &self.options.features;
        build_request_params(&HubRequestArgs {
            filter_categories: &self.categories,
            filter_values: features.filter.then(|| self.filter.values()),
            implicit_filters: &self.implicit_filters,
            sort: self.sort.active().filter(|_| features.sort),
            remote_sort_fields: &self.remote_sort_fields,
            page: features.pagination.then(|| self.pagination.window()),
        })
    }

    /// The hub query for the current state.
    pub fn hub_query(&self) -> Result<HubQuery> {
        Ok(self.request_params()?.to_query())
    }

    fn pipeline(&self) -> LocalPipeline<'_, T> {
        let features = &self.options.features;
        LocalPipeline {
            categories: &self.categories,
            filter_values: features.filter.then(|| self.filter.values()),
            sort: self.sort.active().filter(|_| features.sort),
            sort_values: self.sort_values.as_ref(),
            page: features.pagination.then(|| self.pagination.window()),
        }
    }

    /// The rows to render.
    ///
    /// Local mode runs filter, sort and paginate over the dataset. Remote
    /// mode returns the last reported page as is.
    #[must_use]
    pub fn current_page(&self) -> TablePage<'_, T> {
        match &self.data {
            DataMode::Local(items) => {
                let page = process(items, &self.pipeline());
                TablePage {
                    items: page.page_items,
                    total_count: page.total_count,
                }
            }
            DataMode::Remote { items, total_count } => TablePage {
                items: items.iter().collect(),
                total_count: total_count.unwrap_or(items.len()),
            },
        }
    }

    /// Filtered, unpaginated size.
    #[must_use]
    pub fn total_count(&self) -> usize {
        match &self.data {
            DataMode::Local(items) => {
                if self.options.features.filter {
                    filter_items(items, &self.categories, self.filter.values()).len()
                } else {
                    items.len()
                }
            }
            DataMode::Remote { items, total_count } => total_count.unwrap_or(items.len()),
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub const fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Declared columns, key to label, in display order.
    pub const fn columns(&self) -> &IndexMap<String, String> {
        &self.columns
    }

    pub const fn location(&self) -> Option<&DocumentLocation> {
        self.location.as_ref()
    }

    /// The identity of a row.
    pub fn row_key(&self, item: &T) -> String {
        (self.row_key)(item)
    }
}

impl<T> fmt::Debug for TableControls<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableControls")
            .field("table", &self.options.table_name)
            .field("mode", &self.data.name())
            .field("filter", self.filter.values())
            .field("sort", &self.sort.active())
            .field("page", &self.pagination.window())
            .field("expansion", self.expansion.rows())
            .field("selection", self.selection.set())
            .field("active_item", &self.active_item.active_key())
            .finish_non_exhaustive()
    }
}
