//! Row selection state.
//!
//! "Select all" is a state of its own rather than an enumerated set of keys,
//! so selecting every row of a server-paged table never needs the keys of
//! rows that were never loaded.

use std::collections::BTreeSet;

/// Which rows are selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSet {
    /// Every row
    All,
    /// Every row except these keys
    AllExcept(BTreeSet<String>),
    /// Exactly these keys
    Only(BTreeSet<String>),
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::Only(BTreeSet::new())
    }
}

/// Selection state for one table.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    set: SelectionSet,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn set(&self) -> &SelectionSet {
        &self.set
    }

    #[must_use]
    pub fn is_selected(&self, row_key: &str) -> bool {
        match &self.set {
            SelectionSet::All => true,
            SelectionSet::AllExcept(excluded) => !excluded.contains(row_key),
            SelectionSet::Only(selected) => selected.contains(row_key),
        }
    }

    /// Whether every row is selected, including rows not loaded.
    #[must_use]
    pub const fn is_all_selected(&self) -> bool {
        matches!(self.set, SelectionSet::All)
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.set, SelectionSet::Only(selected) if selected.is_empty())
    }

    /// Toggle one row. After [`Self::select_all`] this deselects the row from
    /// the implicit full set.
    pub fn toggle(&mut self, row_key: &str) {
        let selected = self.is_selected(row_key);
        self.set_selected(row_key, !selected);
    }

    /// Select or deselect one row.
    pub fn set_selected(&mut self, row_key: &str, selected: bool) {
        match &mut self.set {
            SelectionSet::All => {
                if !selected {
                    self.set = SelectionSet::AllExcept(BTreeSet::from([row_key.to_string()]));
                }
            }
            SelectionSet::AllExcept(excluded) => {
                if selected {
                    excluded.remove(row_key);
                    if excluded.is_empty() {
                        self.set = SelectionSet::All;
                    }
                } else {
                    excluded.insert(row_key.to_string());
                }
            }
            SelectionSet::Only(keys) => {
                if selected {
                    keys.insert(row_key.to_string());
                } else {
                    keys.remove(row_key);
                }
            }
        }
    }

    /// Select or deselect several rows.
    pub fn set_many<'a, I>(&mut self, row_keys: I, selected: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in row_keys {
            self.set_selected(key, selected);
        }
    }

    /// Select exactly these rows.
    pub fn select_only<'a, I>(&mut self, row_keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.set = SelectionSet::Only(row_keys.into_iter().map(str::to_string).collect());
    }

    pub fn select_all(&mut self) {
        self.set = SelectionSet::All;
    }

    pub fn clear(&mut self) {
        self.set = SelectionSet::default();
    }

    /// Number of selected rows out of `total`.
    ///
    /// Exclusions are assumed to name rows that exist.
    #[must_use]
    pub fn selected_count(&self, total: usize) -> usize {
        match &self.set {
            SelectionSet::All => total,
            SelectionSet::AllExcept(excluded) => total.saturating_sub(excluded.len()),
            SelectionSet::Only(selected) => selected.len(),
        }
    }
}
