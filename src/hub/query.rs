//! Serialization of a [`HubRequestParams`] into the hub's query parameters.

use super::request::{HubFilter, HubFilterValue, HubRequestParams};
use serde::Serialize;

/// Query parameters of a hub list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl HubQuery {
    /// URL-encoded `limit`, `offset`, `q` and `sort`, omitting absent ones.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = self.offset {
            serializer.append_pair("offset", &offset.to_string());
        }
        if let Some(q) = &self.q {
            serializer.append_pair("q", q);
        }
        if let Some(sort) = &self.sort {
            serializer.append_pair("sort", sort);
        }
        serializer.finish()
    }
}

/// Escape the hub's operator characters in a filter value.
#[must_use]
pub fn wrap_and_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | '~' | '<' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render one filter entry. List values join with their logic
/// operator's delimiter.
#[must_use]
pub fn serialize_filter(filter: &HubFilter) -> String {
    let value = match &filter.value {
        HubFilterValue::Text(text) => wrap_and_escape(text),
        HubFilterValue::List { list, operator } => list
            .iter()
            .map(|value| wrap_and_escape(value))
            .collect::<Vec<_>>()
            .join(operator.delimiter()),
    };
    if filter.field.is_empty() {
        value
    } else {
        format!("{}{}{value}", filter.field, filter.operator)
    }
}

/// The `q` expression: entries ordered by field (stable), joined with `&`.
#[must_use]
pub fn serialize_filters(filters: &[HubFilter]) -> String {
    let mut sorted: Vec<&HubFilter> = filters.iter().collect();
    sorted.sort_by(|a, b| a.field.cmp(&b.field));
    sorted
        .into_iter()
        .map(serialize_filter)
        .collect::<Vec<_>>()
        .join("&")
}

impl HubRequestParams {
    /// The hub query for this request.
    #[must_use]
    pub fn to_query(&self) -> HubQuery {
        HubQuery {
            limit: self.page.map(|page| page.items_per_page),
            offset: self.page.map(|page| page.offset()),
            q: (!self.filters.is_empty()).then(|| serialize_filters(&self.filters)),
            sort: self
                .sort
                .as_ref()
                .map(|sort| format!("{}:{}", sort.field, sort.direction)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{FilterOperator, HubSort, LogicOperator};
    use crate::state::{PageWindow, SortDirection};

    #[test]
    fn test_escape_every_operator_char() {
        assert_eq!(wrap_and_escape("a=b=c<d>e~f"), "a\\=b\\=c\\<d\\>e\\~f");
        assert_eq!(wrap_and_escape("plain"), "plain");
    }

    #[test]
    fn test_filters_sorted_by_field() {
        let filters = vec![
            HubFilter::new(
                "severity",
                FilterOperator::Equal,
                HubFilterValue::any_of(vec!["high".to_string(), "critical".to_string()]),
            ),
            HubFilter::new("", FilterOperator::Like, "log4j"),
            HubFilter::new("published", FilterOperator::GreaterThanOrEqual, "2024-01-01"),
            HubFilter::new("published", FilterOperator::LessThanOrEqual, "2024-03-31"),
        ];
        assert_eq!(
            serialize_filters(&filters),
            "log4j&published>=2024-01-01&published<=2024-03-31&severity=high|critical"
        );
    }

    #[test]
    fn test_same_field_entries_are_anded() {
        let filters = vec![
            HubFilter::new("severity", FilterOperator::Equal, "low"),
            HubFilter::new("severity", FilterOperator::Equal, "critical"),
        ];
        assert_eq!(serialize_filters(&filters), "severity=low&severity=critical");

        let all_of = HubFilter::new(
            "label",
            FilterOperator::Equal,
            HubFilterValue::List {
                list: vec!["a=b".to_string(), "c".to_string()],
                operator: LogicOperator::And,
            },
        );
        assert_eq!(serialize_filter(&all_of), "label=a\\=b,c");
    }

    #[test]
    fn test_to_query() {
        let params = HubRequestParams {
            filters: vec![HubFilter::new("name", FilterOperator::Like, "spring")],
            sort: Some(HubSort {
                field: "published".to_string(),
                direction: SortDirection::Desc,
            }),
            page: Some(PageWindow::new(3, 20)),
        };
        let query = params.to_query();
        assert_eq!(query.limit, Some(20));
        assert_eq!(query.offset, Some(40));
        assert_eq!(query.q.as_deref(), Some("name~spring"));
        assert_eq!(query.sort.as_deref(), Some("published:desc"));
        assert_eq!(
            query.to_query_string(),
            "limit=20&offset=40&q=name%7Espring&sort=published%3Adesc"
        );
    }

    #[test]
    fn test_empty_request_has_no_query() {
        assert_eq!(HubRequestParams::default().to_query(), HubQuery::default());
    }
}
