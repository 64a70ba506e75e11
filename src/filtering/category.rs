//! Filter category model.
//!
//! A table declares its filters as a list of [`FilterCategory`] values. The
//! kind of a category decides the shape of its value, how it matches items
//! in local mode and how it is translated into hub filters in remote mode.

use crate::hub::FilterOperator;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Custom local matcher: `(atom, item) -> matches`.
pub type MatcherFn<T> = Arc<dyn Fn(&str, &T) -> bool + Send + Sync>;

/// Projects the string an item is filtered on for one category.
pub type ItemValueFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// The name of a filter kind, as it appears in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FilterType {
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "numsearch")]
    NumSearch,
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "dateRange")]
    DateRange,
    #[serde(rename = "autocompleteServerSide")]
    AutocompleteServerSide,
    #[serde(rename = "autocompleteLabel")]
    AutocompleteLabel,
}

impl FilterType {
    /// Whether a value of this kind may hold more than one atom.
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(
            self,
            Self::MultiSelect | Self::AutocompleteServerSide | Self::AutocompleteLabel
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::NumSearch => "numsearch",
            Self::Select => "select",
            Self::MultiSelect => "multiselect",
            Self::Date => "date",
            Self::DateRange => "dateRange",
            Self::AutocompleteServerSide => "autocompleteServerSide",
            Self::AutocompleteLabel => "autocompleteLabel",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a select or multiselect category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FilterOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label shown to users, or the value itself.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Filter kind, with the data each kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// Free text, substring match
    Search,
    /// Numeric text, substring match locally, numbers only remotely
    NumSearch,
    /// One value out of a fixed list
    Select { options: Vec<FilterOption> },
    /// Any number of values out of a fixed list, OR'd
    MultiSelect { options: Vec<FilterOption> },
    /// A single `YYYY-MM-DD` date
    Date,
    /// A closed `from/to` date interval
    DateRange,
    /// Values picked from server-side suggestions
    AutocompleteServerSide,
    /// Labels picked from suggestions; items carry comma-separated labels
    AutocompleteLabel,
}

impl FilterKind {
    #[must_use]
    pub const fn filter_type(&self) -> FilterType {
        match self {
            Self::Search => FilterType::Search,
            Self::NumSearch => FilterType::NumSearch,
            Self::Select { .. } => FilterType::Select,
            Self::MultiSelect { .. } => FilterType::MultiSelect,
            Self::Date => FilterType::Date,
            Self::DateRange => FilterType::DateRange,
            Self::AutocompleteServerSide => FilterType::AutocompleteServerSide,
            Self::AutocompleteLabel => FilterType::AutocompleteLabel,
        }
    }

    /// Build a kind from its configured name and options. Options are
    /// ignored for kinds without a fixed list.
    #[must_use]
    pub fn from_type(filter_type: FilterType, options: Vec<FilterOption>) -> Self {
        match filter_type {
            FilterType::Search => Self::Search,
            FilterType::NumSearch => Self::NumSearch,
            FilterType::Select => Self::Select { options },
            FilterType::MultiSelect => Self::MultiSelect { options },
            FilterType::Date => Self::Date,
            FilterType::DateRange => Self::DateRange,
            FilterType::AutocompleteServerSide => Self::AutocompleteServerSide,
            FilterType::AutocompleteLabel => Self::AutocompleteLabel,
        }
    }

    pub fn options(&self) -> &[FilterOption] {
        match self {
            Self::Select { options } | Self::MultiSelect { options } => options,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_multi_valued(&self) -> bool {
        self.filter_type().is_multi_valued()
    }

    /// Operator used remotely when the category does not override it.
    #[must_use]
    pub const fn default_operator(&self) -> FilterOperator {
        match self {
            Self::Search | Self::NumSearch => FilterOperator::Like,
            _ => FilterOperator::Equal,
        }
    }
}

/// A filter category declared on a table.
pub struct FilterCategory<T> {
    /// Unique per table; `""` is the free-text category
    pub key: String,
    pub kind: FilterKind,
    pub title: String,
    pub placeholder: Option<String>,
    /// Remote field name, when it differs from the key
    pub server_field: Option<String>,
    /// Remote operator, when it differs from the kind's default
    pub operator: Option<FilterOperator>,
    matcher: Option<MatcherFn<T>>,
    item_value: Option<ItemValueFn<T>>,
}

impl<T> FilterCategory<T> {
    pub fn new(key: impl Into<String>, kind: FilterKind, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            title: title.into(),
            placeholder: None,
            server_field: None,
            operator: None,
            matcher: None,
            item_value: None,
        }
    }

    /// The free-text search category.
    pub fn free_text(title: impl Into<String>) -> Self {
        Self::new("", FilterKind::Search, title)
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_server_field(mut self, field: impl Into<String>) -> Self {
        self.server_field = Some(field.into());
        self
    }

    #[must_use]
    pub const fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Replace the kind's matching rule with `matcher(atom, item)`.
    #[must_use]
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&str, &T) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Project the string the kind's matching rule is applied to.
    #[must_use]
    pub fn with_item_value<F>(mut self, item_value: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.item_value = Some(Arc::new(item_value));
        self
    }

    #[must_use]
    pub fn with_shared_item_value(mut self, item_value: ItemValueFn<T>) -> Self {
        self.item_value = Some(item_value);
        self
    }

    pub fn is_free_text(&self) -> bool {
        self.key.is_empty()
    }

    pub const fn filter_type(&self) -> FilterType {
        self.kind.filter_type()
    }

    /// Field name used in hub filters.
    pub fn server_field(&self) -> &str {
        self.server_field.as_deref().unwrap_or(&self.key)
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator.unwrap_or_else(|| self.kind.default_operator())
    }

    pub fn matcher(&self) -> Option<&MatcherFn<T>> {
        self.matcher.as_ref()
    }

    pub fn item_value(&self) -> Option<&ItemValueFn<T>> {
        self.item_value.as_ref()
    }

    /// Whether the category can filter items locally.
    pub const fn can_match_locally(&self) -> bool {
        self.matcher.is_some() || self.item_value.is_some()
    }
}

impl<T> Clone for FilterCategory<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            kind: self.kind.clone(),
            title: self.title.clone(),
            placeholder: self.placeholder.clone(),
            server_field: self.server_field.clone(),
            operator: self.operator,
            matcher: self.matcher.clone(),
            item_value: self.item_value.clone(),
        }
    }
}

impl<T> fmt::Debug for FilterCategory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCategory")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("server_field", &self.server_field)
            .field("operator", &self.operator)
            .field("has_matcher", &self.matcher.is_some())
            .field("has_item_value", &self.item_value.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_names() {
        let json = serde_json::to_string(&FilterType::DateRange).expect("serialize");
        assert_eq!(json, "\"dateRange\"");
        let parsed: FilterType = serde_json::from_str("\"numsearch\"").expect("deserialize");
        assert_eq!(parsed, FilterType::NumSearch);
        assert_eq!(FilterType::AutocompleteLabel.to_string(), "autocompleteLabel");
    }

    #[test]
    fn test_server_field_and_operator_defaults() {
        let category: FilterCategory<()> =
            FilterCategory::new("name", FilterKind::Search, "Name");
        assert_eq!(category.server_field(), "name");
        assert_eq!(category.operator(), FilterOperator::Like);

        let category = category
            .with_server_field("purl")
            .with_operator(FilterOperator::Equal);
        assert_eq!(category.server_field(), "purl");
        assert_eq!(category.operator(), FilterOperator::Equal);
    }

    #[test]
    fn test_multi_valued_kinds() {
        assert!(FilterKind::MultiSelect { options: vec![] }.is_multi_valued());
        assert!(FilterKind::AutocompleteLabel.is_multi_valued());
        assert!(!FilterKind::Select { options: vec![] }.is_multi_valued());
        assert!(!FilterKind::DateRange.is_multi_valued());
    }

    #[test]
    fn test_local_capability() {
        let category: FilterCategory<String> =
            FilterCategory::new("name", FilterKind::Search, "Name");
        assert!(!category.can_match_locally());
        let category = category.with_item_value(Clone::clone);
        assert!(category.can_match_locally());
    }
}
