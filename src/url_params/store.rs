//! Prefix-aware URL parameter store.

use super::codec::{ParamCodec, ParamUpdate, RawParams, SerializedParams};
use super::location::DocumentLocation;
use crate::error::{ConfigErrorKind, Result, TableControlsError};

/// Separator between a key prefix and a parameter key.
pub const PREFIX_SEPARATOR: char = ':';

/// Reject keys and prefixes that contain the prefix separator.
pub fn validate_param_key(key: &str) -> Result<()> {
    if key.contains(PREFIX_SEPARATOR) {
        return Err(TableControlsError::config(
            "url parameters",
            ConfigErrorKind::InvalidParamKey(key.to_string()),
        ));
    }
    Ok(())
}

/// Binds a [`ParamCodec`] to a [`DocumentLocation`] under an optional prefix.
///
/// Reading an instance whose parameters are all absent yields the default
/// value. [`UrlParamStore::seed_default`] writes that default back into the
/// location once per transition into the all-absent condition, so a fresh
/// page gets a shareable URL without looping.
#[derive(Debug)]
pub struct UrlParamStore<C: ParamCodec> {
    location: DocumentLocation,
    prefix: Option<String>,
    codec: C,
    default: C::Value,
    enabled: bool,
    last_all_empty: Option<bool>,
}

impl<C: ParamCodec> UrlParamStore<C> {
    /// Create a store. Fails when the prefix or any codec key contains `:`.
    pub fn new(
        location: DocumentLocation,
        prefix: Option<String>,
        codec: C,
        default: C::Value,
    ) -> Result<Self> {
        if let Some(prefix) = &prefix {
            validate_param_key(prefix)?;
        }
        for key in codec.keys() {
            validate_param_key(&key)?;
        }
        Ok(Self {
            location,
            prefix: prefix.filter(|p| !p.is_empty()),
            codec,
            default,
            enabled: true,
            last_all_empty: None,
        })
    }

    /// Enable or disable the store. A disabled store always reads the default
    /// and never writes.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn codec(&self) -> &C {
        &self.codec
    }

    pub const fn location(&self) -> &DocumentLocation {
        &self.location
    }

    pub const fn default_value(&self) -> &C::Value {
        &self.default
    }

    /// The key as it appears in the query string.
    #[must_use]
    pub fn with_prefix(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{PREFIX_SEPARATOR}{key}"),
            None => key.to_string(),
        }
    }

    /// Read the given unprefixed keys from the live location.
    #[must_use]
    pub fn read_keys(&self, keys: &[String]) -> RawParams {
        let params = self.location.params();
        keys.iter()
            .map(|key| (key.clone(), params.get(&self.with_prefix(key)).cloned()))
            .collect()
    }

    /// Read all keys owned by the codec.
    #[must_use]
    pub fn read_raw(&self) -> RawParams {
        self.read_keys(&self.codec.keys())
    }

    /// Whether every owned parameter is absent or empty.
    #[must_use]
    pub fn all_params_empty(&self) -> bool {
        self.read_raw()
            .values()
            .all(|value| value.as_deref().is_none_or(str::is_empty))
    }

    /// Read the current value.
    #[must_use]
    pub fn read(&self, fallback: &C::Value) -> C::Value {
        if !self.enabled {
            return self.default.clone();
        }
        let raw = self.read_raw();
        let all_empty = raw
            .values()
            .all(|value| value.as_deref().is_none_or(str::is_empty));
        if all_empty {
            self.default.clone()
        } else {
            self.codec.deserialize(&raw, fallback)
        }
    }

    /// Prefixed updates for `value`, without committing them.
    #[must_use]
    pub fn updates(&self, value: &C::Value) -> Vec<(String, ParamUpdate)> {
        if !self.enabled {
            return Vec::new();
        }
        self.prefix_updates(self.codec.serialize(value))
    }

    /// Prefixed form of a partial update.
    #[must_use]
    pub fn prefix_updates(&self, params: SerializedParams) -> Vec<(String, ParamUpdate)> {
        params
            .into_iter()
            .map(|(key, update)| (self.with_prefix(&key), update))
            .collect()
    }

    /// Serialize `value` and commit it to the live location.
    pub fn write(&self, value: &C::Value) -> bool {
        self.location.apply(self.updates(value))
    }

    /// Commit a partial update given in unprefixed keys.
    pub fn write_params(&self, params: SerializedParams) -> bool {
        if !self.enabled {
            return false;
        }
        self.location.apply(self.prefix_updates(params))
    }

    /// Updates that seed the default into an all-empty location.
    ///
    /// Returns updates only when the store has just entered the all-empty
    /// condition, and only the parameters the default actually sets. The
    /// caller is expected to commit them, which leaves the condition. A
    /// default that sets nothing keeps the store in the condition, so it is
    /// not retried.
    pub fn take_seed_updates(&mut self) -> Vec<(String, ParamUpdate)> {
        if !self.enabled {
            return Vec::new();
        }
        let all_empty = self.all_params_empty();
        let entered = all_empty && self.last_all_empty != Some(true);
        let seeds: Vec<(String, ParamUpdate)> = if entered {
            self.updates(&self.default)
                .into_iter()
                .filter(|(_, update)| matches!(update, ParamUpdate::Set(_)))
                .collect()
        } else {
            Vec::new()
        };
        self.last_all_empty = Some(all_empty && seeds.is_empty());
        if !seeds.is_empty() {
            tracing::debug!(
                prefix = self.prefix.as_deref().unwrap_or_default(),
                "seeding default url params"
            );
        }
        seeds
    }

    /// Seed the default value into the location if every owned parameter is
    /// absent. Returns whether a commit happened.
    pub fn seed_default(&mut self) -> bool {
        let updates = self.take_seed_updates();
        self.location.apply(updates)
    }
}
