//! Where each table feature keeps its state between sessions.
//!
//! A feature persists either nowhere (in-memory state only), into the shared
//! document location, or into a key/value storage backend. Storage entries
//! hold the same flat parameters the URL would, as one JSON object.

use crate::config::PersistTarget;
use crate::url_params::{ParamCodec, ParamUpdate, RawParams, UrlParamStore, apply_updates};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A string key/value store, e.g. browser local storage.
pub trait KeyValueStorage: Send + Sync + fmt::Debug {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String);
    fn remove_item(&self, key: &str);
}

pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// In-memory [`KeyValueStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedStorage {
        Arc::new(Self::new())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Binds a [`ParamCodec`] to one storage entry.
pub struct StorageStore<C: ParamCodec> {
    storage: SharedStorage,
    key: String,
    codec: C,
    default: C::Value,
}

impl<C: ParamCodec> StorageStore<C> {
    pub fn new(storage: SharedStorage, key: impl Into<String>, codec: C, default: C::Value) -> Self {
        Self {
            storage,
            key: key.into(),
            codec,
            default,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read_params(&self) -> Option<BTreeMap<String, String>> {
        let raw = self.storage.get_item(&self.key)?;
        match serde_json::from_str(&raw) {
            Ok(params) => Some(params),
            Err(err) => {
                tracing::debug!(key = %self.key, error = %err, "ignoring malformed stored state");
                None
            }
        }
    }

    /// Read the stored value. A missing or unreadable entry yields the
    /// default.
    #[must_use]
    pub fn read(&self, fallback: &C::Value) -> C::Value {
        let Some(params) = self.read_params() else {
            return self.default.clone();
        };
        let raw: RawParams = self
            .codec
            .keys()
            .into_iter()
            .map(|key| {
                let value = params.get(&key).cloned();
                (key, value)
            })
            .collect();
        if raw.values().all(Option::is_none) {
            return self.default.clone();
        }
        self.codec.deserialize(&raw, fallback)
    }

    /// Write `value`, removing the entry when nothing remains.
    pub fn write(&self, value: &C::Value) {
        let mut params = self.read_params().unwrap_or_default();
        apply_updates(&mut params, self.codec.serialize(value));
        if params.is_empty() {
            self.storage.remove_item(&self.key);
            return;
        }
        match serde_json::to_string(&params) {
            Ok(json) => self.storage.set_item(&self.key, json),
            Err(err) => tracing::warn!(key = %self.key, error = %err, "failed to encode state"),
        }
    }
}

impl<C: ParamCodec + fmt::Debug> fmt::Debug for StorageStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageStore")
            .field("key", &self.key)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Persistence of one feature.
#[derive(Debug)]
pub enum Persistence<C: ParamCodec + fmt::Debug> {
    /// In-memory only
    State,
    UrlParams(UrlParamStore<C>),
    Storage(StorageStore<C>),
}

impl<C: ParamCodec + fmt::Debug> Persistence<C> {
    pub const fn target(&self) -> PersistTarget {
        match self {
            Self::State => PersistTarget::State,
            Self::UrlParams(_) => PersistTarget::UrlParams,
            Self::Storage(_) => PersistTarget::Storage,
        }
    }

    /// The persisted value, or `None` for in-memory state.
    #[must_use]
    pub fn read(&self, fallback: &C::Value) -> Option<C::Value> {
        match self {
            Self::State => None,
            Self::UrlParams(store) => Some(store.read(fallback)),
            Self::Storage(store) => Some(store.read(fallback)),
        }
    }

    /// Location updates for `value`. Empty unless persisted to the URL.
    #[must_use]
    pub fn url_updates(&self, value: &C::Value) -> Vec<(String, ParamUpdate)> {
        match self {
            Self::UrlParams(store) => store.updates(value),
            Self::State | Self::Storage(_) => Vec::new(),
        }
    }

    /// Write `value` to non-URL backends. URL writes are collected through
    /// [`Self::url_updates`] and committed together by the caller.
    pub fn write_storage(&self, value: &C::Value) {
        if let Self::Storage(store) = self {
            store.write(value);
        }
    }

    /// Default-seeding updates for URL persistence.
    pub fn take_seed_updates(&mut self) -> Vec<(String, ParamUpdate)> {
        match self {
            Self::UrlParams(store) => store.take_seed_updates(),
            Self::State | Self::Storage(_) => Vec::new(),
        }
    }
}
