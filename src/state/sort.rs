//! Sort state: one active column and a direction.

use crate::url_params::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Orient an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSort {
    pub column_key: String,
    pub direction: SortDirection,
}

impl ActiveSort {
    pub fn new(column_key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_key: column_key.into(),
            direction,
        }
    }

    pub fn asc(column_key: impl Into<String>) -> Self {
        Self::new(column_key, SortDirection::Asc)
    }

    pub fn desc(column_key: impl Into<String>) -> Self {
        Self::new(column_key, SortDirection::Desc)
    }

    /// URL encoding: `<columnKey>:<asc|desc>`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}:{}", self.column_key, self.direction)
    }

    /// Parse the URL encoding. The column key may itself contain `:`.
    #[must_use]
    pub fn decode(value: &str) -> Option<Self> {
        let (column_key, direction) = value.rsplit_once(':')?;
        if column_key.is_empty() {
            return None;
        }
        Some(Self::new(column_key, SortDirection::parse(direction)?))
    }
}

/// Sort state restricted to a declared set of sortable columns.
#[derive(Debug, Clone)]
pub struct SortState {
    sortable_columns: Vec<String>,
    active: Option<ActiveSort>,
    initial: Option<ActiveSort>,
}

impl SortState {
    /// Create the state. An initial sort on a non-sortable column is dropped.
    #[must_use]
    pub fn new(sortable_columns: Vec<String>, initial: Option<ActiveSort>) -> Self {
        let initial = initial.filter(|sort| sortable_columns.contains(&sort.column_key));
        Self {
            sortable_columns,
            active: initial.clone(),
            initial,
        }
    }

    pub fn active(&self) -> Option<&ActiveSort> {
        self.active.as_ref()
    }

    pub fn initial(&self) -> Option<&ActiveSort> {
        self.initial.as_ref()
    }

    pub fn sortable_columns(&self) -> &[String] {
        &self.sortable_columns
    }

    #[must_use]
    pub fn is_sortable(&self, column_key: &str) -> bool {
        self.sortable_columns.iter().any(|c| c == column_key)
    }

    /// Set the active sort. Unknown columns are ignored and the previous sort
    /// is kept. Returns whether the sort was accepted.
    pub fn set_active_sort(&mut self, sort: ActiveSort) -> bool {
        if !self.is_sortable(&sort.column_key) {
            tracing::debug!(column = %sort.column_key, "ignoring sort on non-sortable column");
            return false;
        }
        self.active = Some(sort);
        true
    }

    /// Flip the direction of the active sort, if any.
    pub fn toggle_direction(&mut self) -> bool {
        match &mut self.active {
            Some(sort) => {
                sort.direction = sort.direction.toggled();
                true
            }
            None => false,
        }
    }

    /// Header-click behaviour: the same column flips, a new column starts
    /// ascending.
    pub fn sort_by_column(&mut self, column_key: &str) -> bool {
        let direction = match &self.active {
            Some(sort) if sort.column_key == column_key => sort.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.set_active_sort(ActiveSort::new(column_key, direction))
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn reset(&mut self) {
        self.active = self.initial.clone();
    }

    /// Replace the state from persisted storage, keeping the current sort when
    /// the persisted column is not sortable.
    pub fn restore(&mut self, sort: Option<ActiveSort>) {
        match sort {
            Some(sort) => {
                self.set_active_sort(sort);
            }
            None => self.active = None,
        }
    }
}

/// Persists the active sort as `sort=<columnKey>:<direction>`.
#[derive(Debug, Clone)]
pub struct SortParamCodec {
    sortable_columns: Vec<String>,
}

impl SortParamCodec {
    pub const KEY: &'static str = "sort";

    #[must_use]
    pub const fn new(sortable_columns: Vec<String>) -> Self {
        Self { sortable_columns }
    }
}

impl ParamCodec for SortParamCodec {
    type Value = Option<ActiveSort>;

    fn keys(&self) -> Vec<String> {
        vec![Self::KEY.to_string()]
    }

    fn serialize(&self, value: &Self::Value) -> SerializedParams {
        let mut params = SerializedParams::new();
        params.insert(
            Self::KEY.to_string(),
            ParamUpdate::from_option(value.as_ref().map(ActiveSort::encode)),
        );
        params
    }

    fn deserialize(&self, params: &RawParams, fallback: &Self::Value) -> Self::Value {
        let Some(raw) = raw_value(params, Self::KEY) else {
            return None;
        };
        match ActiveSort::decode(raw) {
            Some(sort) if self.sortable_columns.contains(&sort.column_key) => Some(sort),
            _ => {
                tracing::debug!(value = raw, "ignoring malformed sort param");
                fallback.clone()
            }
        }
    }
}

/// A comparable value projected out of a row for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Sorts before everything else in ascending order
    Missing,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl SortValue {
    const fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used by the local pipeline.
    ///
    /// Text compares case-insensitively with spaces ignored, then by raw
    /// bytes so that the order is total.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => normalize_text(a)
                .cmp(&normalize_text(b))
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn normalize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for SortValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDate> for SortValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<V: Into<Self>> From<Option<V>> for SortValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}
