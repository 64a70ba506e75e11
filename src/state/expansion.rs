//! Row expansion state.
//!
//! Rows are identified by the string key the caller's row-identity function
//! produces, never by reference.

use crate::url_params::escape::{join_escaped, join_pair, split_escaped, split_pair};
use crate::url_params::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How rows expand.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionVariant {
    /// At most one row open at a time
    #[default]
    Single,
    /// Any number of whole rows open
    Multiple,
    /// Each row independently remembers which of its columns is open
    Compound,
}

/// The set of expanded rows, shaped by the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandedRows {
    Single(Option<String>),
    Multiple(BTreeSet<String>),
    /// row key -> open column key
    Compound(BTreeMap<String, String>),
}

impl ExpandedRows {
    /// Nothing expanded, for the given variant.
    #[must_use]
    pub const fn empty(variant: ExpansionVariant) -> Self {
        match variant {
            ExpansionVariant::Single => Self::Single(None),
            ExpansionVariant::Multiple => Self::Multiple(BTreeSet::new()),
            ExpansionVariant::Compound => Self::Compound(BTreeMap::new()),
        }
    }

    #[must_use]
    pub const fn variant(&self) -> ExpansionVariant {
        match self {
            Self::Single(_) => ExpansionVariant::Single,
            Self::Multiple(_) => ExpansionVariant::Multiple,
            Self::Compound(_) => ExpansionVariant::Compound,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(row) => row.is_none(),
            Self::Multiple(rows) => rows.is_empty(),
            Self::Compound(rows) => rows.is_empty(),
        }
    }
}

/// Expansion state for one table.
#[derive(Debug, Clone)]
pub struct ExpansionState {
    rows: ExpandedRows,
}

impl ExpansionState {
    #[must_use]
    pub const fn new(variant: ExpansionVariant) -> Self {
        Self {
            rows: ExpandedRows::empty(variant),
        }
    }

    pub const fn variant(&self) -> ExpansionVariant {
        self.rows.variant()
    }

    pub const fn rows(&self) -> &ExpandedRows {
        &self.rows
    }

    /// Toggle a row, or for compound expansion a column of a row.
    ///
    /// Single: opening a row closes any other. Multiple: rows toggle
    /// independently. Compound: toggling the open column closes the row,
    /// another column replaces it, and `None` closes the row.
    pub fn toggle(&mut self, row_key: &str, column_key: Option<&str>) {
        match &mut self.rows {
            ExpandedRows::Single(open) => {
                if open.as_deref() == Some(row_key) {
                    *open = None;
                } else {
                    *open = Some(row_key.to_string());
                }
            }
            ExpandedRows::Multiple(open) => {
                if !open.remove(row_key) {
                    open.insert(row_key.to_string());
                }
            }
            ExpandedRows::Compound(open) => match column_key {
                Some(column) if open.get(row_key).map(String::as_str) != Some(column) => {
                    open.insert(row_key.to_string(), column.to_string());
                }
                _ => {
                    open.remove(row_key);
                }
            },
        }
    }

    /// Explicitly open or close a row (and column, for compound expansion).
    pub fn set_expanded(&mut self, row_key: &str, column_key: Option<&str>, expanded: bool) {
        if self.is_expanded(row_key, column_key) != expanded {
            self.toggle(row_key, column_key);
        }
    }

    /// Whether a row is open. With a column key under compound expansion,
    /// whether that specific column is the open one.
    #[must_use]
    pub fn is_expanded(&self, row_key: &str, column_key: Option<&str>) -> bool {
        match &self.rows {
            ExpandedRows::Single(open) => open.as_deref() == Some(row_key),
            ExpandedRows::Multiple(open) => open.contains(row_key),
            ExpandedRows::Compound(open) => match (open.get(row_key), column_key) {
                (Some(open_column), Some(column)) => open_column == column,
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }

    /// The open column of a row under compound expansion.
    #[must_use]
    pub fn expanded_column(&self, row_key: &str) -> Option<&str> {
        match &self.rows {
            ExpandedRows::Compound(open) => open.get(row_key).map(String::as_str),
            _ => None,
        }
    }

    pub fn collapse_all(&mut self) {
        self.rows = ExpandedRows::empty(self.variant());
    }

    /// Replace the state from persisted storage. Rows of another variant are
    /// ignored.
    pub fn restore(&mut self, rows: ExpandedRows) {
        if rows.variant() == self.variant() {
            self.rows = rows;
        } else {
            tracing::debug!("ignoring expansion state of a different variant");
        }
    }
}

/// Persists expanded rows as `expanded`.
///
/// Single and multiple expansion store a comma-joined list of row keys;
/// compound expansion stores `row=column` pairs.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionParamCodec {
    variant: ExpansionVariant,
}

impl ExpansionParamCodec {
    pub const KEY: &'static str = "expanded";

    #[must_use]
    pub const fn new(variant: ExpansionVariant) -> Self {
        Self { variant }
    }
}

impl ParamCodec for ExpansionParamCodec {
    type Value = ExpandedRows;

    fn keys(&self) -> Vec<String> {
        vec![Self::KEY.to_string()]
    }

    fn serialize(&self, value: &Self::Value) -> SerializedParams {
        let encoded = match value {
            ExpandedRows::Single(row) => row.as_ref().map(|r| join_escaped(&[r], ',')),
            ExpandedRows::Multiple(rows) => {
                let rows: Vec<&String> = rows.iter().collect();
                (!rows.is_empty()).then(|| join_escaped(&rows, ','))
            }
            ExpandedRows::Compound(rows) => {
                let pairs: Vec<String> = rows.iter().map(|(r, c)| join_pair(r, c)).collect();
                (!pairs.is_empty()).then(|| join_escaped(&pairs, ','))
            }
        };
        let mut params = SerializedParams::new();
        params.insert(Self::KEY.to_string(), ParamUpdate::from_option(encoded));
        params
    }

    fn deserialize(&self, params: &RawParams, fallback: &Self::Value) -> Self::Value {
        let Some(raw) = raw_value(params, Self::KEY) else {
            return ExpandedRows::empty(self.variant);
        };
        let parts = split_escaped(raw, ',');
        match self.variant {
            ExpansionVariant::Single => ExpandedRows::Single(parts.into_iter().next()),
            ExpansionVariant::Multiple => ExpandedRows::Multiple(parts.into_iter().collect()),
            ExpansionVariant::Compound => {
                let pairs: Option<BTreeMap<String, String>> =
                    parts.iter().map(|p| split_pair(p)).collect();
                pairs.map_or_else(
                    || {
                        tracing::debug!(value = raw, "ignoring malformed expansion param");
                        fallback.clone()
                    },
                    ExpandedRows::Compound,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_policy_closes_other_rows() {
        let mut expansion = ExpansionState::new(ExpansionVariant::Single);
        expansion.toggle("a", None);
        expansion.toggle("b", None);
        assert!(!expansion.is_expanded("a", None));
        assert!(expansion.is_expanded("b", None));

        expansion.toggle("b", None);
        assert!(expansion.rows().is_empty());
    }

    #[test]
    fn test_multiple_policy_toggles_independently() {
        let mut expansion = ExpansionState::new(ExpansionVariant::Multiple);
        expansion.toggle("a", None);
        expansion.toggle("b", None);
        assert!(expansion.is_expanded("a", None));
        assert!(expansion.is_expanded("b", None));
        expansion.toggle("a", None);
        assert!(!expansion.is_expanded("a", None));
        assert!(expansion.is_expanded("b", None));
    }

    #[test]
    fn test_compound_policy_replaces_column_on_same_row_only() {
        let mut expansion = ExpansionState::new(ExpansionVariant::Compound);
        expansion.toggle("a", Some("x"));
        expansion.toggle("b", Some("x"));
        expansion.toggle("a", Some("y"));

        assert!(expansion.is_expanded("a", Some("y")));
        assert!(!expansion.is_expanded("a", Some("x")));
        assert_eq!(expansion.expanded_column("a"), Some("y"));
        assert_eq!(expansion.expanded_column("b"), Some("x"));

        expansion.toggle("a", Some("y"));
        assert!(!expansion.is_expanded("a", None));
        assert!(expansion.is_expanded("b", None));
    }

    #[test]
    fn test_set_expanded_is_idempotent() {
        let mut expansion = ExpansionState::new(ExpansionVariant::Compound);
        expansion.set_expanded("a", Some("x"), true);
        expansion.set_expanded("a", Some("x"), true);
        assert_eq!(expansion.expanded_column("a"), Some("x"));
        expansion.set_expanded("a", Some("x"), false);
        assert!(expansion.rows().is_empty());
    }

    #[test]
    fn test_codec_compound_round_trip() {
        let codec = ExpansionParamCodec::new(ExpansionVariant::Compound);
        let mut expansion = ExpansionState::new(ExpansionVariant::Compound);
        expansion.toggle("pkg:npm/a=1", Some("vulns"));
        expansion.toggle("b,c", Some("licenses"));

        let params = codec.serialize(expansion.rows());
        let Some(ParamUpdate::Set(encoded)) = params.get("expanded").cloned() else {
            panic!("expected a value");
        };
        let mut raw = RawParams::new();
        raw.insert("expanded".to_string(), Some(encoded));
        let decoded = codec.deserialize(&raw, &ExpandedRows::empty(ExpansionVariant::Compound));
        assert_eq!(&decoded, expansion.rows());
    }

    #[test]
    fn test_codec_empty_removes_param() {
        let codec = ExpansionParamCodec::new(ExpansionVariant::Multiple);
        let params = codec.serialize(&ExpandedRows::empty(ExpansionVariant::Multiple));
        assert_eq!(params.get("expanded"), Some(&ParamUpdate::Remove));
    }

    #[test]
    fn test_codec_malformed_compound_falls_back() {
        let codec = ExpansionParamCodec::new(ExpansionVariant::Compound);
        let mut raw = RawParams::new();
        raw.insert("expanded".to_string(), Some("no-pair-here".to_string()));
        let mut fallback = BTreeMap::new();
        fallback.insert("a".to_string(), "x".to_string());
        let fallback = ExpandedRows::Compound(fallback);
        assert_eq!(codec.deserialize(&raw, &fallback), fallback);
    }
}
