//! Property-based tests for URL persistence and local sorting.
//!
//! Persisted state of every filter kind, sort, pagination, expansion and the
//! active item must survive a round trip through the query string, the
//! query string must depend only on the logical state, and sorting must be
//! stable.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use sbom_table_controls::filtering::{
    DateInterval, FilterParamCodec, FilterType, FilterValues, format_date,
};
use sbom_table_controls::local::{SortValuesFn, sort_items};
use sbom_table_controls::state::{
    ActiveItemParamCodec, ExpandedRows, ExpansionParamCodec, ExpansionVariant,
    PaginationParamCodec, SortParamCodec,
};
use sbom_table_controls::url_params::{DocumentLocation, ParamCodec, UrlParamStore};
use sbom_table_controls::{ActiveSort, PageWindow, SortDirection, SortValue};
use std::collections::HashMap;
use std::sync::Arc;

const CATEGORIES: [(&str, FilterType); 8] = [
    ("", FilterType::Search),
    ("score", FilterType::NumSearch),
    ("severity", FilterType::MultiSelect),
    ("ecosystem", FilterType::Select),
    ("day", FilterType::Date),
    ("published", FilterType::DateRange),
    ("supplier", FilterType::AutocompleteServerSide),
    ("labels", FilterType::AutocompleteLabel),
];

fn filter_store(location: &DocumentLocation) -> UrlParamStore<FilterParamCodec> {
    UrlParamStore::new(
        location.clone(),
        Some("t".to_string()),
        FilterParamCodec::new(CATEGORIES),
        FilterValues::new(),
    )
    .expect("valid prefix")
}

/// Atoms with the delimiter, escape and query-string special characters.
fn atom() -> impl Strategy<Value = String> {
    "[a-z0-9,\\\\&=%+ :/]{0,6}[a-z0-9]"
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|days| {
        NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date") + Duration::days(days)
    })
}

fn interval() -> impl Strategy<Value = String> {
    (date(), 0i64..400).prop_map(|(from, span)| {
        DateInterval::new(from, from + Duration::days(span))
            .expect("ordered interval")
            .encode()
    })
}

fn number() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0.0f64..10.0).prop_map(|n| format!("{n:.1}")),
    ]
}

fn single(strategy: impl Strategy<Value = String>) -> impl Strategy<Value = Option<Vec<String>>> {
    proptest::option::of(strategy.prop_map(|atom| vec![atom]))
}

fn many(strategy: impl Strategy<Value = String>) -> impl Strategy<Value = Option<Vec<String>>> {
    proptest::collection::vec(strategy, 0..4).prop_map(|atoms| (!atoms.is_empty()).then_some(atoms))
}

fn filter_values() -> impl Strategy<Value = FilterValues> {
    (
        (single(atom()), single(number()), many(atom()), single(atom())),
        (
            single(date().prop_map(format_date)),
            single(interval()),
            many(atom()),
            many(atom()),
        ),
    )
        .prop_map(|((search, score, severity, ecosystem), (day, published, supplier, labels))| {
            let mut values = FilterValues::new();
            let entries = [
                ("", search),
                ("score", score),
                ("severity", severity),
                ("ecosystem", ecosystem),
                ("day", day),
                ("published", published),
                ("supplier", supplier),
                ("labels", labels),
            ];
            for (key, atoms) in entries {
                if atoms.is_some() {
                    values.set(key, atoms);
                }
            }
            values
        })
}

fn row_key() -> impl Strategy<Value = String> {
    "[A-Za-z0-9,=\\\\:-]{0,6}[a-z0-9]"
}

fn expanded_rows(variant: ExpansionVariant) -> BoxedStrategy<ExpandedRows> {
    match variant {
        ExpansionVariant::Single => proptest::option::of(row_key())
            .prop_map(ExpandedRows::Single)
            .boxed(),
        ExpansionVariant::Multiple => proptest::collection::btree_set(row_key(), 0..5)
            .prop_map(ExpandedRows::Multiple)
            .boxed(),
        ExpansionVariant::Compound => proptest::collection::btree_map(row_key(), row_key(), 0..5)
            .prop_map(ExpandedRows::Compound)
            .boxed(),
    }
}

fn expansion_case() -> impl Strategy<Value = (ExpansionVariant, ExpandedRows)> {
    prop_oneof![
        Just(ExpansionVariant::Single),
        Just(ExpansionVariant::Multiple),
        Just(ExpansionVariant::Compound),
    ]
    .prop_flat_map(|variant| (Just(variant), expanded_rows(variant)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn filter_values_round_trip(values in filter_values()) {
        let location = DocumentLocation::new("/", "unrelated=1");
        let store = filter_store(&location);
        store.write(&values);

        let restored = store.read(&FilterValues::new());
        prop_assert_eq!(restored, values);
        let unrelated = location.get("unrelated");
        prop_assert_eq!(unrelated.as_deref(), Some("1"));
    }

    #[test]
    fn expansion_round_trip((variant, rows) in expansion_case()) {
        let location = DocumentLocation::new("/", "");
        let empty = ExpandedRows::empty(variant);
        let store = UrlParamStore::new(location, Some("t".to_string()), ExpansionParamCodec::new(variant), empty.clone())
            .expect("valid store");

        store.write(&rows);
        prop_assert_eq!(store.read(&empty), rows);
    }

    #[test]
    fn active_item_round_trip(key in proptest::option::of(row_key())) {
        let location = DocumentLocation::new("/", "");
        let store = UrlParamStore::new(location, None, ActiveItemParamCodec, None)
            .expect("valid store");

        store.write(&key);
        prop_assert_eq!(store.read(&None), key);
    }

    #[test]
    fn sort_round_trip(column in "[a-z]{1,8}", desc in any::<bool>()) {
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        let sort = Some(ActiveSort::new(column.clone(), direction));
        let location = DocumentLocation::new("/", "");
        let store = UrlParamStore::new(location, None, SortParamCodec::new(vec![column]), None)
            .expect("valid store");

        store.write(&sort);
        prop_assert_eq!(store.read(&None), sort);
    }

    #[test]
    fn pagination_round_trip(page in 1usize..10_000, size in 1usize..500) {
        let window = PageWindow::new(page, size);
        let location = DocumentLocation::new("/", "");
        let store = UrlParamStore::new(location, Some("p".to_string()), PaginationParamCodec, PageWindow::default())
            .expect("valid store");

        store.write(&window);
        prop_assert_eq!(store.read(&PageWindow::default()), window);
    }

    #[test]
    fn write_is_deterministic(values in filter_values(), page in 1usize..100) {
        // Same logical state written in two different orders.
        let first = DocumentLocation::new("/", "");
        filter_store(&first).write(&values);
        first.apply(
            PaginationParamCodec
                .serialize(&PageWindow::new(page, 20))
                .into_iter()
                .map(|(k, v)| (format!("t:{k}"), v)),
        );

        let second = DocumentLocation::new("/", "");
        second.apply(
            PaginationParamCodec
                .serialize(&PageWindow::new(page, 20))
                .into_iter()
                .map(|(k, v)| (format!("t:{k}"), v)),
        );
        filter_store(&second).write(&values);

        prop_assert_eq!(first.search(), second.search());
    }

    #[test]
    fn malformed_params_never_panic(search in "\\PC{0,80}") {
        let location = DocumentLocation::new("/", &search);
        let _ = filter_store(&location).read(&FilterValues::new());
        let store = UrlParamStore::new(location, None, PaginationParamCodec, PageWindow::default())
            .expect("valid store");
        let window = store.read(&PageWindow::default());
        prop_assert!(window.page_number >= 1);
        prop_assert!(window.items_per_page >= 1);
    }

    #[test]
    fn sort_is_stable(keys in proptest::collection::vec(0u8..4, 0..40), desc in any::<bool>()) {
        let rows: Vec<(usize, u8)> = keys.into_iter().enumerate().collect();
        let sort_values: SortValuesFn<(usize, u8)> = Arc::new(|row: &(usize, u8)| {
            HashMap::from([("key".to_string(), SortValue::from(i64::from(row.1)))])
        });
        let sort = if desc { ActiveSort::desc("key") } else { ActiveSort::asc("key") };

        let sorted = sort_items(rows.iter().collect(), &sort, &sort_values);
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.1 == b.1 {
                prop_assert!(a.0 < b.0, "equal keys reordered: {:?} before {:?}", a, b);
            } else if desc {
                prop_assert!(a.1 > b.1);
            } else {
                prop_assert!(a.1 < b.1);
            }
        }
    }
}
