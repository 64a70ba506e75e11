//! Normalized remote request descriptor and the builder that derives it
//! from table state.

use crate::error::{ConfigErrorKind, Result, TableControlsError};
use crate::filtering::{
    DateInterval, FilterCategory, FilterKind, FilterValues, format_date, parse_calendar_date,
};
use crate::state::{ActiveSort, PageWindow, SortDirection};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Comparison operator understood by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "~")]
    Like,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl FilterOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Like => "~",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// How the values of a list filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    And,
    Or,
}

impl LogicOperator {
    /// Separator between list values in the `q` expression.
    #[must_use]
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::And => ",",
            Self::Or => "|",
        }
    }
}

/// The value side of a filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HubFilterValue {
    Text(String),
    List {
        list: Vec<String>,
        operator: LogicOperator,
    },
}

impl HubFilterValue {
    /// Alternatives of one category. A single value stays plain text.
    #[must_use]
    pub fn any_of(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Self::Text(values.remove(0))
        } else {
            Self::List {
                list: values,
                operator: LogicOperator::Or,
            }
        }
    }
}

impl From<&str> for HubFilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HubFilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One `field operator value` filter entry.
///
/// Separate entries must all hold (AND), even when they share a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HubFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: HubFilterValue,
}

impl HubFilter {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<HubFilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSort {
    pub field: String,
    pub direction: SortDirection,
}

/// The request descriptor sent to the hub.
///
/// Each active category contributes its own entries, so categories are
/// AND'd; alternatives within a category travel as one OR list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubRequestParams {
    pub filters: Vec<HubFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<HubSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageWindow>,
}

/// Inputs to [`build_request_params`]. Disabled features pass `None`.
#[derive(Debug)]
pub struct HubRequestArgs<'a, T> {
    pub filter_categories: &'a [FilterCategory<T>],
    pub filter_values: Option<&'a FilterValues>,
    pub implicit_filters: &'a [HubFilter],
    pub sort: Option<&'a ActiveSort>,
    /// Column key to remote sort field
    pub remote_sort_fields: &'a BTreeMap<String, String>,
    pub page: Option<PageWindow>,
}

/// Build the request descriptor.
///
/// Fails when the active sort column has no remote field.
pub fn build_request_params<T>(args: &HubRequestArgs<'_, T>) -> Result<HubRequestParams> {
    let mut filters = match args.filter_values {
        Some(values) => filter_entries(args.filter_categories, values),
        None => Vec::new(),
    };
    filters.extend(args.implicit_filters.iter().cloned());

    let sort = args
        .sort
        .map(|sort| remote_sort(sort, args.remote_sort_fields))
        .transpose()?;

    Ok(HubRequestParams {
        filters,
        sort,
        page: args.page,
    })
}

fn remote_sort(sort: &ActiveSort, fields: &BTreeMap<String, String>) -> Result<HubSort> {
    let field = fields.get(&sort.column_key).ok_or_else(|| {
        TableControlsError::config(
            "remote sort",
            ConfigErrorKind::MissingRemoteSortField(sort.column_key.clone()),
        )
    })?;
    Ok(HubSort {
        field: field.clone(),
        direction: sort.direction,
    })
}

/// Hub filter entries for the active categories, in declaration order.
///
/// Atoms that cannot be sent for a category's kind are dropped; a category
/// left with no atoms contributes nothing.
pub fn filter_entries<T>(categories: &[FilterCategory<T>], values: &FilterValues) -> Vec<HubFilter> {
    let mut filters = Vec::new();
    for category in categories {
        let Some(atoms) = values.atoms(&category.key) else {
            continue;
        };
        let field = category.server_field();
        let operator = category.operator();
        let alternatives: Vec<String> = match &category.kind {
            FilterKind::NumSearch => atoms
                .iter()
                .map(|atom| atom.trim())
                .filter(|atom| atom.parse::<f64>().is_ok())
                .map(ToString::to_string)
                .collect(),
            FilterKind::Date => atoms
                .iter()
                .filter_map(|atom| parse_calendar_date(atom))
                .map(format_date)
                .collect(),
            FilterKind::DateRange => {
                if let Some(interval) = DateInterval::first_valid(atoms) {
                    filters.push(HubFilter::new(
                        field,
                        FilterOperator::GreaterThanOrEqual,
                        format_date(interval.from),
                    ));
                    filters.push(HubFilter::new(
                        field,
                        FilterOperator::LessThanOrEqual,
                        format_date(interval.to),
                    ));
                }
                continue;
            }
            _ => atoms.to_vec(),
        };
        if !alternatives.is_empty() {
            filters.push(HubFilter::new(field, operator, HubFilterValue::any_of(alternatives)));
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    type Item = ();

    fn categories() -> Vec<FilterCategory<Item>> {
        vec![
            FilterCategory::free_text("Search"),
            FilterCategory::new(
                "severity",
                FilterKind::MultiSelect { options: vec![] },
                "Severity",
            ),
            FilterCategory::new("score", FilterKind::NumSearch, "Score")
                .with_operator(FilterOperator::GreaterThanOrEqual),
            FilterCategory::new("published", FilterKind::DateRange, "Published")
                .with_server_field("published_at"),
        ]
    }

    fn filter_values(entries: &[(&str, &[&str])]) -> FilterValues {
        entries
            .iter()
            .map(|(k, atoms)| (*k, atoms.iter().map(ToString::to_string).collect::<Vec<_>>()))
            .collect()
    }

    fn sort_fields() -> BTreeMap<String, String> {
        BTreeMap::from([("name".to_string(), "name".to_string())])
    }

    #[test]
    fn test_filters_pass_atoms_one_to_one() {
        let values = filter_values(&[("", &["log4j"][..]), ("severity", &["high", "critical"][..])]);
        let filters = filter_entries(&categories(), &values);
        assert_eq!(
            filters,
            vec![
                HubFilter::new("", FilterOperator::Like, "log4j"),
                HubFilter::new(
                    "severity",
                    FilterOperator::Equal,
                    HubFilterValue::List {
                        list: vec!["high".to_string(), "critical".to_string()],
                        operator: LogicOperator::Or,
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_categories_sharing_a_field_stay_separate() {
        let categories: Vec<FilterCategory<Item>> = vec![
            FilterCategory::new("vendor", FilterKind::Select { options: vec![] }, "Vendor")
                .with_server_field("supplier"),
            FilterCategory::new("owner", FilterKind::Select { options: vec![] }, "Owner")
                .with_server_field("supplier"),
        ];
        let values = filter_values(&[("vendor", &["acme"][..]), ("owner", &["globex"][..])]);
        assert_eq!(
            filter_entries(&categories, &values),
            vec![
                HubFilter::new("supplier", FilterOperator::Equal, "acme"),
                HubFilter::new("supplier", FilterOperator::Equal, "globex"),
            ]
        );
    }

    #[test]
    fn test_date_atoms_drop_malformed() {
        let categories: Vec<FilterCategory<Item>> =
            vec![FilterCategory::new("day", FilterKind::Date, "Day")];
        let values = filter_values(&[("day", &["garbage", "2024-05-01"][..])]);
        assert_eq!(
            filter_entries(&categories, &values),
            vec![HubFilter::new("day", FilterOperator::Equal, "2024-05-01")]
        );

        let values = filter_values(&[("day", &["garbage"][..])]);
        assert!(filter_entries(&categories, &values).is_empty());
    }

    #[test]
    fn test_numsearch_and_date_range() {
        let values = filter_values(&[
            ("score", &["7.5"][..]),
            ("published", &["2024-01-01/2024-03-31"][..]),
        ]);
        let filters = filter_entries(&categories(), &values);
        assert_eq!(
            filters,
            vec![
                HubFilter::new("score", FilterOperator::GreaterThanOrEqual, "7.5"),
                HubFilter::new("published_at", FilterOperator::GreaterThanOrEqual, "2024-01-01"),
                HubFilter::new("published_at", FilterOperator::LessThanOrEqual, "2024-03-31"),
            ]
        );

        let values = filter_values(&[("score", &["high"][..]), ("published", &["garbage"][..])]);
        assert!(filter_entries(&categories(), &values).is_empty());
    }

    #[test]
    fn test_build_with_sort_page_and_implicit_filters() {
        let categories = categories();
        let implicit = vec![HubFilter::new("deprecated", FilterOperator::Equal, "false")];
        let sort = ActiveSort::desc("name");
        let fields = sort_fields();
        let params = build_request_params(&HubRequestArgs {
            filter_categories: &categories,
            filter_values: None,
            implicit_filters: &implicit,
            sort: Some(&sort),
            remote_sort_fields: &fields,
            page: Some(PageWindow::new(2, 20)),
        })
        .expect("valid request");

        assert_eq!(params.filters, implicit);
        assert_eq!(
            params.sort,
            Some(HubSort {
                field: "name".to_string(),
                direction: SortDirection::Desc
            })
        );
        assert_eq!(params.page, Some(PageWindow::new(2, 20)));
    }

    #[test]
    fn test_missing_remote_sort_field_is_config_error() {
        let categories = categories();
        let sort = ActiveSort::asc("severity");
        let fields = sort_fields();
        let err = build_request_params(&HubRequestArgs {
            filter_categories: &categories,
            filter_values: None,
            implicit_filters: &[],
            sort: Some(&sort),
            remote_sort_fields: &fields,
            page: None,
        })
        .expect_err("unmapped sort column");
        assert_eq!(
            err.config_kind(),
            Some(&ConfigErrorKind::MissingRemoteSortField("severity".to_string()))
        );
    }

    #[test]
    fn test_operator_serde_symbols() {
        let json = serde_json::to_string(&HubFilter::new("a", FilterOperator::Like, "x"))
            .expect("serialize");
        assert_eq!(json, r#"{"field":"a","operator":"~","value":"x"}"#);

        let list: HubFilter = serde_json::from_str(
            r#"{"field":"a","operator":"=","value":{"list":["x","y"],"operator":"AND"}}"#,
        )
        .expect("deserialize list");
        assert_eq!(
            list.value,
            HubFilterValue::List {
                list: vec!["x".to_string(), "y".to_string()],
                operator: LogicOperator::And,
            }
        );
    }
}
