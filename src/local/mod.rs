//! Local mode: filter, sort and paginate an in-memory dataset.
//!
//! The stages always run in that order. Each stage borrows the items; only
//! the final page is collected.

use crate::filtering::{FilterCategory, FilterValues, matches_all};
use crate::state::{ActiveSort, PageWindow, SortValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Projects the sortable values of an item, keyed by column.
pub type SortValuesFn<T> = Arc<dyn Fn(&T) -> HashMap<String, SortValue> + Send + Sync>;

/// One page of locally processed items.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPage<'a, T> {
    pub page_items: Vec<&'a T>,
    /// Size of the filtered, unpaginated set
    pub total_count: usize,
}

/// Keep the items that pass every active filter category, preserving order.
pub fn filter_items<'a, T>(
    items: &'a [T],
    categories: &[FilterCategory<T>],
    values: &FilterValues,
) -> Vec<&'a T> {
    if values.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| matches_all(categories, values, item))
        .collect()
}

/// Stable sort by the active column. Items whose sort values lack the column
/// sort as [`SortValue::Missing`].
pub fn sort_items<'a, T>(
    items: Vec<&'a T>,
    sort: &ActiveSort,
    sort_values: &SortValuesFn<T>,
) -> Vec<&'a T> {
    let mut decorated: Vec<(SortValue, &'a T)> = items
        .into_iter()
        .map(|item| {
            let value = sort_values(item)
                .remove(&sort.column_key)
                .unwrap_or(SortValue::Missing);
            (value, item)
        })
        .collect();
    decorated.sort_by(|(a, _), (b, _)| sort.direction.apply(a.compare(b)));
    decorated.into_iter().map(|(_, item)| item).collect()
}

/// The items of one page; past the end this is empty.
pub fn paginate_items<'a, T>(items: &[&'a T], window: PageWindow) -> Vec<&'a T> {
    items
        .iter()
        .skip(window.offset())
        .take(window.items_per_page)
        .copied()
        .collect()
}

/// Everything [`process`] needs besides the items. Disabled features pass
/// `None`.
pub struct LocalPipeline<'p, T> {
    pub categories: &'p [FilterCategory<T>],
    pub filter_values: Option<&'p FilterValues>,
    pub sort: Option<&'p ActiveSort>,
    pub sort_values: Option<&'p SortValuesFn<T>>,
    pub page: Option<PageWindow>,
}

/// Run filter, then sort, then paginate.
pub fn process<'a, T>(items: &'a [T], pipeline: &LocalPipeline<'_, T>) -> LocalPage<'a, T> {
    let mut rows = match pipeline.filter_values {
        Some(values) => filter_items(items, pipeline.categories, values),
        None => items.iter().collect(),
    };
    let total_count = rows.len();

    if let (Some(sort), Some(sort_values)) = (pipeline.sort, pipeline.sort_values) {
        rows = sort_items(rows, sort, sort_values);
    }
    let page_items = match pipeline.page {
        Some(window) => paginate_items(&rows, window),
        None => rows,
    };

    LocalPage {
        page_items,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::FilterKind;

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "b" },
            Row { id: 2, name: "a" },
            Row { id: 3, name: "a" },
        ]
    }

    fn by_name() -> SortValuesFn<Row> {
        Arc::new(|row: &Row| HashMap::from([("name".to_string(), SortValue::from(row.name))]))
    }

    fn ids(page: &LocalPage<'_, Row>) -> Vec<u32> {
        page.page_items.iter().map(|row| row.id).collect()
    }

    #[test]
    fn test_sort_then_page_is_stable() {
        let items = rows();
        let sort = ActiveSort::asc("name");
        let sort_values = by_name();
        let page = process(
            &items,
            &LocalPipeline {
                categories: &[],
                filter_values: None,
                sort: Some(&sort),
                sort_values: Some(&sort_values),
                page: Some(PageWindow::new(1, 2)),
            },
        );
        assert_eq!(ids(&page), vec![2, 3]);
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_descending_keeps_equal_keys_in_input_order() {
        let items = rows();
        let sort = ActiveSort::desc("name");
        let sorted = sort_items(items.iter().collect(), &sort, &by_name());
        let ids: Vec<u32> = sorted.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items = rows();
        let page = process(
            &items,
            &LocalPipeline {
                categories: &[],
                filter_values: None,
                sort: None,
                sort_values: None,
                page: Some(PageWindow::new(5, 2)),
            },
        );
        assert!(page.page_items.is_empty());
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_total_count_is_filtered_size() {
        let items = rows();
        let categories = vec![
            FilterCategory::new("name", FilterKind::Select { options: vec![] }, "Name")
                .with_item_value(|row: &Row| row.name.to_string()),
        ];
        let values: FilterValues = [("name", vec!["a".to_string()])].into_iter().collect();
        let page = process(
            &items,
            &LocalPipeline {
                categories: &categories,
                filter_values: Some(&values),
                sort: None,
                sort_values: None,
                page: Some(PageWindow::new(1, 1)),
            },
        );
        assert_eq!(ids(&page), vec![2]);
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn test_missing_sort_value_sorts_first() {
        let items = rows();
        let sort = ActiveSort::asc("name");
        let sort_values: SortValuesFn<Row> = Arc::new(|row: &Row| {
            if row.id == 3 {
                HashMap::new()
            } else {
                HashMap::from([("name".to_string(), SortValue::from(row.name))])
            }
        });
        let sorted = sort_items(items.iter().collect(), &sort, &sort_values);
        assert_eq!(sorted.first().map(|row| row.id), Some(3));
    }
}
