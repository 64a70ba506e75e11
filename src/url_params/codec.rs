//! Serialization contract between typed state and flat string parameters.

use std::collections::BTreeMap;

/// What a write does to one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamUpdate {
    /// Leave the parameter as it is
    #[default]
    Keep,
    /// Delete the parameter
    Remove,
    /// Set the parameter to this value
    Set(String),
}

impl ParamUpdate {
    /// `None` removes, `Some` sets.
    #[must_use]
    pub fn from_option(value: Option<String>) -> Self {
        value.map_or(Self::Remove, Self::Set)
    }

    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// A partial write, keyed by unprefixed parameter name.
///
/// A key missing from the map behaves exactly like [`ParamUpdate::Keep`].
pub type SerializedParams = BTreeMap<String, ParamUpdate>;

/// Parameters as read from the location, keyed by unprefixed name.
/// Absent parameters are `None`.
pub type RawParams = BTreeMap<String, Option<String>>;

/// Look up a non-empty raw parameter.
#[must_use]
pub fn raw_value<'a>(params: &'a RawParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Option::as_deref)
        .filter(|value| !value.is_empty())
}

/// Converts one piece of table state to and from URL parameters.
///
/// Codecs never see the key prefix; the store adds and strips it.
pub trait ParamCodec {
    /// The state this codec persists.
    type Value: Clone + std::fmt::Debug;

    /// The unprefixed parameter keys this codec owns.
    fn keys(&self) -> Vec<String>;

    /// Serialize a value into a partial update over [`Self::keys`].
    fn serialize(&self, value: &Self::Value) -> SerializedParams;

    /// Deserialize parameters into a value.
    ///
    /// Parameters that are present but malformed fall back to the matching
    /// part of `fallback`, the last value known to be good.
    fn deserialize(&self, params: &RawParams, fallback: &Self::Value) -> Self::Value;
}
