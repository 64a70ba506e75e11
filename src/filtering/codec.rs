//! URL persistence of filter values.
//!
//! Each category owns one parameter, `filter.<key>`, holding its atoms
//! comma-joined with `\`-escaping. The free-text category uses `search`.

use super::category::FilterType;
use super::state::{FilterValues, normalize_atoms};
use crate::url_params::escape::{join_escaped, split_escaped};
use crate::url_params::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};

const FILTER_PREFIX: &str = "filter.";
const FREE_TEXT_KEY: &str = "search";
const ATOM_DELIMITER: char = ',';

/// Persists [`FilterValues`] for a fixed set of categories.
#[derive(Debug, Clone)]
pub struct FilterParamCodec {
    categories: Vec<(String, FilterType)>,
}

impl FilterParamCodec {
    pub fn new<I, K>(categories: I) -> Self
    where
        I: IntoIterator<Item = (K, FilterType)>,
        K: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }

    /// Parameter name of a category key.
    #[must_use]
    pub fn param_key(category_key: &str) -> String {
        if category_key.is_empty() {
            FREE_TEXT_KEY.to_string()
        } else {
            format!("{FILTER_PREFIX}{category_key}")
        }
    }
}

impl ParamCodec for FilterParamCodec {
    type Value = FilterValues;

    fn keys(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|(key, _)| Self::param_key(key))
            .collect()
    }

    fn serialize(&self, value: &Self::Value) -> SerializedParams {
        self.categories
            .iter()
            .filter_map(|(key, _)| {
                let update = match value.entry(key)? {
                    Some(atoms) => ParamUpdate::Set(join_escaped(atoms, ATOM_DELIMITER)),
                    None => ParamUpdate::Remove,
                };
                Some((Self::param_key(key), update))
            })
            .collect()
    }

    fn deserialize(&self, params: &RawParams, _fallback: &Self::Value) -> Self::Value {
        let mut values = FilterValues::new();
        for (key, kind) in &self.categories {
            let Some(raw) = raw_value(params, &Self::param_key(key)) else {
                continue;
            };
            let Some(mut atoms) = normalize_atoms(split_escaped(raw, ATOM_DELIMITER)) else {
                continue;
            };
            if !kind.is_multi_valued() {
                atoms.truncate(1);
            }
            values.set(key.clone(), Some(atoms));
        }
        values
    }
}
