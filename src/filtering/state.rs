//! Filter values and filter state.

use super::category::{FilterCategory, FilterType};
use std::collections::BTreeMap;

/// Current value per category key.
///
/// A key that is absent is untouched. A key mapped to `None` was explicitly
/// cleared. Otherwise it holds a non-empty ordered list of atoms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterValues {
    values: BTreeMap<String, Option<Vec<String>>>,
}

/// Drop empty atoms; an empty list becomes `None`.
#[must_use]
pub fn normalize_atoms(atoms: Vec<String>) -> Option<Vec<String>> {
    let atoms: Vec<String> = atoms
        .into_iter()
        .filter(|atom| !atom.trim().is_empty())
        .collect();
    (!atoms.is_empty()).then_some(atoms)
}

impl FilterValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The atoms of an active category, `None` when untouched or cleared.
    pub fn atoms(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).and_then(Option::as_deref)
    }

    /// The raw entry: `None` untouched, `Some(None)` cleared.
    pub fn entry(&self, key: &str) -> Option<&Option<Vec<String>>> {
        self.values.get(key)
    }

    /// Set a value, normalizing empty atom lists to cleared.
    pub fn set(&mut self, key: impl Into<String>, atoms: Option<Vec<String>>) {
        self.values
            .insert(key.into(), atoms.and_then(normalize_atoms));
    }

    /// Mark a category as explicitly cleared.
    pub fn clear(&mut self, key: impl Into<String>) {
        self.values.insert(key.into(), None);
    }

    /// Forget a category entirely, making it untouched again.
    pub fn forget(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.atoms(key).is_some()
    }

    /// Whether no category has atoms.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Option::is_none)
    }

    /// Active categories and their atoms, in key order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .filter_map(|(key, atoms)| atoms.as_deref().map(|atoms| (key.as_str(), atoms)))
    }

    /// Every touched key, active or cleared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[String]>)> {
        self.values
            .iter()
            .map(|(key, atoms)| (key.as_str(), atoms.as_deref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for FilterValues {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, atoms) in iter {
            values.set(key, Some(atoms));
        }
        values
    }
}

/// Filter state for a fixed set of categories.
///
/// Values for undeclared keys are ignored. Single-valued kinds keep only
/// their first atom.
#[derive(Debug, Clone)]
pub struct FilterState {
    kinds: BTreeMap<String, FilterType>,
    values: FilterValues,
}

impl FilterState {
    pub fn new<I, K>(kinds: I) -> Self
    where
        I: IntoIterator<Item = (K, FilterType)>,
        K: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            values: FilterValues::new(),
        }
    }

    pub fn from_categories<T>(categories: &[FilterCategory<T>]) -> Self {
        Self::new(categories.iter().map(|c| (c.key.clone(), c.filter_type())))
    }

    pub const fn values(&self) -> &FilterValues {
        &self.values
    }

    pub fn kind(&self, key: &str) -> Option<FilterType> {
        self.kinds.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Whether any category currently has atoms.
    pub fn has_active_filters(&self) -> bool {
        !self.values.is_empty()
    }

    fn shape(kind: FilterType, atoms: Option<Vec<String>>) -> Option<Vec<String>> {
        let mut atoms = atoms.and_then(normalize_atoms)?;
        if !kind.is_multi_valued() {
            atoms.truncate(1);
        }
        Some(atoms)
    }

    /// Set the value of one category. Returns `false` for an unknown key.
    pub fn set_value(&mut self, key: &str, atoms: Option<Vec<String>>) -> bool {
        let Some(kind) = self.kind(key) else {
            tracing::debug!(key, "ignoring value for unknown filter category");
            return false;
        };
        self.values.set(key, Self::shape(kind, atoms));
        true
    }

    /// Explicitly clear one category.
    pub fn clear(&mut self, key: &str) -> bool {
        self.set_value(key, None)
    }

    /// Clear every category except `excluding`, e.g. a filter pinned by the
    /// page itself.
    pub fn clear_all(&mut self, excluding: &[&str]) {
        let keys: Vec<String> = self
            .kinds
            .keys()
            .filter(|key| !excluding.contains(&key.as_str()))
            .cloned()
            .collect();
        for key in keys {
            self.values.clear(key);
        }
    }

    /// Replace all values at once, shaping each by its kind.
    pub fn restore(&mut self, values: FilterValues) {
        let mut shaped = FilterValues::new();
        for (key, atoms) in values.iter() {
            match self.kind(key) {
                Some(kind) => shaped.set(key, Self::shape(kind, atoms.map(<[String]>::to_vec))),
                None => tracing::debug!(key, "dropping value for unknown filter category"),
            }
        }
        self.values = shaped;
    }

    /// Forget every value.
    pub fn reset(&mut self) {
        self.values = FilterValues::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FilterState {
        FilterState::new([
            ("", FilterType::Search),
            ("severity", FilterType::MultiSelect),
            ("published", FilterType::DateRange),
        ])
    }

    fn atoms(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_empty_atoms_normalize_to_cleared() {
        let mut filters = state();
        assert!(filters.set_value("severity", atoms(&["", "  "])));
        assert_eq!(filters.values().entry("severity"), Some(&None));
        assert!(!filters.has_active_filters());
    }

    #[test]
    fn test_single_valued_kind_keeps_first_atom() {
        let mut filters = state();
        filters.set_value("", atoms(&["log4j", "spring"]));
        assert_eq!(filters.values().atoms(""), Some(&["log4j".to_string()][..]));

        filters.set_value("severity", atoms(&["high", "critical"]));
        assert_eq!(filters.values().atoms("severity").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut filters = state();
        assert!(!filters.set_value("nope", atoms(&["x"])));
        assert_eq!(filters.values().entry("nope"), None);
    }

    #[test]
    fn test_clear_all_with_exclusions() {
        let mut filters = state();
        filters.set_value("", atoms(&["log4j"]));
        filters.set_value("severity", atoms(&["high"]));
        filters.clear_all(&["severity"]);

        assert_eq!(filters.values().entry(""), Some(&None));
        assert_eq!(filters.values().entry("published"), Some(&None));
        assert!(filters.values().is_active("severity"));
    }

    #[test]
    fn test_restore_shapes_and_drops_unknown() {
        let mut filters = state();
        let values: FilterValues = [
            ("", vec!["a".to_string(), "b".to_string()]),
            ("other", vec!["x".to_string()]),
        ]
        .into_iter()
        .collect();
        filters.restore(values);
        assert_eq!(filters.values().atoms(""), Some(&["a".to_string()][..]));
        assert_eq!(filters.values().entry("other"), None);
    }
}
