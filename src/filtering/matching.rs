//! Local matching rules, one per filter kind.
//!
//! Atoms within a category are OR'd; categories are AND'd.

use super::category::{FilterCategory, FilterKind};
use super::date::{DateInterval, parse_calendar_date, parse_date};
use super::state::FilterValues;

/// Whether `item` passes one category given its atoms.
///
/// A category that cannot match locally, or an empty atom list, passes
/// everything.
pub fn matches_category<T>(category: &FilterCategory<T>, atoms: &[String], item: &T) -> bool {
    if atoms.is_empty() {
        return true;
    }
    if let Some(matcher) = category.matcher() {
        return atoms.iter().any(|atom| matcher(atom, item));
    }
    let Some(item_value) = category.item_value() else {
        return true;
    };
    let value = item_value(item);
    match &category.kind {
        FilterKind::Search | FilterKind::NumSearch => {
            let haystack = value.to_lowercase();
            atoms
                .iter()
                .any(|atom| haystack.contains(&atom.to_lowercase()))
        }
        FilterKind::Select { .. }
        | FilterKind::MultiSelect { .. }
        | FilterKind::AutocompleteServerSide => atoms.iter().any(|atom| *atom == value),
        FilterKind::AutocompleteLabel => value
            .split(',')
            .map(str::trim)
            .any(|label| atoms.iter().any(|atom| atom == label)),
        FilterKind::Date => matches_date(atoms, &value),
        FilterKind::DateRange => matches_date_range(atoms, &value),
    }
}

fn matches_date(atoms: &[String], value: &str) -> bool {
    let dates: Vec<_> = atoms
        .iter()
        .filter_map(|atom| parse_calendar_date(atom))
        .collect();
    if dates.is_empty() {
        // Malformed dates mean "no filter".
        return true;
    }
    parse_date(value).is_some_and(|date| dates.contains(&date))
}

fn matches_date_range(atoms: &[String], value: &str) -> bool {
    // Malformed intervals mean "no filter".
    let Some(interval) = DateInterval::first_valid(atoms) else {
        return true;
    };
    parse_date(value).is_some_and(|date| interval.contains(date))
}

/// Whether `item` passes every active category.
pub fn matches_all<T>(categories: &[FilterCategory<T>], values: &FilterValues, item: &T) -> bool {
    categories.iter().all(|category| {
        values
            .atoms(&category.key)
            .is_none_or(|atoms| matches_category(category, atoms, item))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Advisory {
        id: &'static str,
        severity: &'static str,
        labels: &'static str,
        published: &'static str,
    }

    fn advisory(id: &'static str, severity: &'static str) -> Advisory {
        Advisory {
            id,
            severity,
            labels: "type=cve, source=osv",
            published: "2024-01-15",
        }
    }

    fn atoms(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let category = FilterCategory::new("", FilterKind::Search, "Search")
            .with_item_value(|a: &Advisory| a.id.to_string());
        let item = advisory("CVE-2021-44228", "critical");
        assert!(matches_category(&category, &atoms(&["cve-2021"]), &item));
        assert!(!matches_category(&category, &atoms(&["ghsa"]), &item));
    }

    #[test]
    fn test_multiselect_is_or_within_category() {
        let category = FilterCategory::new(
            "severity",
            FilterKind::MultiSelect { options: vec![] },
            "Severity",
        )
        .with_item_value(|a: &Advisory| a.severity.to_string());
        let selected = atoms(&["high", "critical"]);
        assert!(matches_category(&category, &selected, &advisory("a", "high")));
        assert!(matches_category(&category, &selected, &advisory("b", "critical")));
        assert!(!matches_category(&category, &selected, &advisory("c", "low")));
    }

    #[test]
    fn test_custom_matcher_overrides_kind() {
        let category = FilterCategory::new("id", FilterKind::Search, "Id")
            .with_matcher(|atom: &str, a: &Advisory| a.id.starts_with(atom));
        let item = advisory("GHSA-xxxx", "low");
        assert!(matches_category(&category, &atoms(&["CVE", "GHSA"]), &item));
        assert!(!matches_category(&category, &atoms(&["xxxx"]), &item));
    }

    #[test]
    fn test_label_tokens() {
        let category = FilterCategory::new("labels", FilterKind::AutocompleteLabel, "Labels")
            .with_item_value(|a: &Advisory| a.labels.to_string());
        let item = advisory("a", "low");
        assert!(matches_category(&category, &atoms(&["source=osv"]), &item));
        assert!(!matches_category(&category, &atoms(&["source=nvd"]), &item));
    }

    #[test]
    fn test_date_range() {
        let category = FilterCategory::new("published", FilterKind::DateRange, "Published")
            .with_item_value(|a: &Advisory| a.published.to_string());
        let item = advisory("a", "low");
        assert!(matches_category(&category, &atoms(&["2024-01-01/2024-01-31"]), &item));
        assert!(!matches_category(&category, &atoms(&["2024-02-01/2024-02-28"]), &item));
        assert!(matches_category(&category, &atoms(&["not-an-interval"]), &item));

        let undated = Advisory {
            published: "unknown",
            ..advisory("b", "low")
        };
        assert!(!matches_category(&category, &atoms(&["2024-01-01/2024-01-31"]), &undated));
    }

    #[test]
    fn test_date_ignores_malformed_atoms() {
        let category = FilterCategory::new("published", FilterKind::Date, "Published")
            .with_item_value(|a: &Advisory| a.published.to_string());
        let item = advisory("a", "low");
        assert!(matches_category(&category, &atoms(&["2024-01-15"]), &item));
        assert!(!matches_category(&category, &atoms(&["2024-01-16"]), &item));
        assert!(matches_category(&category, &atoms(&["garbage"]), &item));
        assert!(!matches_category(&category, &atoms(&["garbage", "2024-01-16"]), &item));
    }

    #[test]
    fn test_categories_are_anded() {
        let categories = vec![
            FilterCategory::new("severity", FilterKind::Select { options: vec![] }, "Severity")
                .with_item_value(|a: &Advisory| a.severity.to_string()),
            FilterCategory::new("", FilterKind::Search, "Search")
                .with_item_value(|a: &Advisory| a.id.to_string()),
        ];
        let values: FilterValues = [
            ("severity", atoms(&["high"])),
            ("", atoms(&["cve"])),
        ]
        .into_iter()
        .collect();
        assert!(matches_all(&categories, &values, &advisory("CVE-1", "high")));
        assert!(!matches_all(&categories, &values, &advisory("GHSA-1", "high")));
        assert!(!matches_all(&categories, &values, &advisory("CVE-2", "low")));
        assert!(matches_all(&categories, &FilterValues::new(), &advisory("GHSA-1", "low")));
    }
}
