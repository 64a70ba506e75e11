//! The shared document location.
//!
//! Every table instance on a page reads and writes the same query string.
//! [`DocumentLocation`] holds it as a single versioned blob: each commit parses
//! the live query string, merges the update, sorts the keys and writes the
//! result back under one write lock. Two instances committing one after the
//! other can never overwrite each other's keys.

use super::codec::ParamUpdate;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Parsed query string, keyed and ordered by parameter name.
pub type QueryParams = BTreeMap<String, String>;

/// A point-in-time copy of the location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationSnapshot {
    /// Path component, e.g. `/sboms`
    pub pathname: String,
    /// Query string without the leading `?`
    pub search: String,
    /// Incremented on every commit
    pub version: u64,
}

impl LocationSnapshot {
    /// Path plus query string, as it would appear in the address bar.
    #[must_use]
    pub fn href(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search)
        }
    }
}

/// Cloneable handle to the page location shared by all table instances.
#[derive(Debug, Clone, Default)]
pub struct DocumentLocation {
    inner: Arc<RwLock<LocationSnapshot>>,
}

impl DocumentLocation {
    /// Create a location from a path and a query string (with or without `?`).
    pub fn new(pathname: impl Into<String>, search: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LocationSnapshot {
                pathname: pathname.into(),
                search: search.trim_start_matches('?').to_string(),
                version: 0,
            })),
        }
    }

    /// Create a location from an href such as `/sboms?page=2#top`.
    ///
    /// Any fragment is dropped.
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        let without_fragment = href.split('#').next().unwrap_or_default();
        match without_fragment.split_once('?') {
            Some((path, search)) => Self::new(path, search),
            None => Self::new(without_fragment, ""),
        }
    }

    /// Copy of the current location.
    #[must_use]
    pub fn snapshot(&self) -> LocationSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current query string without the leading `?`.
    #[must_use]
    pub fn search(&self) -> String {
        self.snapshot().search
    }

    /// Current version. Changes on every commit.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Current path plus query string.
    #[must_use]
    pub fn href(&self) -> String {
        self.snapshot().href()
    }

    /// Parse the live query string.
    #[must_use]
    pub fn params(&self) -> QueryParams {
        parse_query(&self.snapshot().search)
    }

    /// Value of one parameter in the live query string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.params().remove(key)
    }

    /// Merge a set of updates into the live query string and commit it.
    ///
    /// Returns `false` without committing when every update is
    /// [`ParamUpdate::Keep`].
    pub fn apply<I>(&self, updates: I) -> bool
    where
        I: IntoIterator<Item = (String, ParamUpdate)>,
    {
        let updates: Vec<(String, ParamUpdate)> = updates
            .into_iter()
            .filter(|(_, update)| !update.is_keep())
            .collect();
        if updates.is_empty() {
            return false;
        }

        let mut location = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let existing = parse_query(&location.search);
        location.search = trim_and_stringify(existing, updates);
        location.version += 1;
        true
    }

    /// Replace the query string verbatim, as a navigation or a hand edit would.
    pub fn navigate(&self, search: &str) {
        let mut location = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        location.search = search.trim_start_matches('?').to_string();
        location.version += 1;
    }
}

/// Parse a query string into ordered parameters.
///
/// A repeated key keeps its last value.
#[must_use]
pub fn parse_query(search: &str) -> QueryParams {
    url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Serialize parameters into a query string, in key order.
#[must_use]
pub fn stringify_query(params: &QueryParams) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Merge `updates` into `existing` and serialize the result with sorted keys.
///
/// `Keep` leaves a parameter untouched, `Remove` deletes it and `Set`
/// overwrites it.
pub fn trim_and_stringify<I>(mut existing: QueryParams, updates: I) -> String
where
    I: IntoIterator<Item = (String, ParamUpdate)>,
{
    apply_updates(&mut existing, updates);
    stringify_query(&existing)
}

/// Apply updates to a parameter map in place.
pub(crate) fn apply_updates<I>(params: &mut QueryParams, updates: I)
where
    I: IntoIterator<Item = (String, ParamUpdate)>,
{
    for (key, update) in updates {
        match update {
            ParamUpdate::Keep => {}
            ParamUpdate::Remove => {
                params.remove(&key);
            }
            ParamUpdate::Set(value) => {
                params.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updates(pairs: &[(&str, ParamUpdate)]) -> Vec<(String, ParamUpdate)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_write_semantics_keep_remove_set() {
        let existing = parse_query("a=old&b=old&c=old");
        let search = trim_and_stringify(
            existing,
            updates(&[
                ("a", ParamUpdate::Set("x".to_string())),
                ("b", ParamUpdate::Keep),
                ("c", ParamUpdate::Remove),
            ]),
        );
        assert_eq!(search, "a=x&b=old");
    }

    #[test]
    fn test_keys_are_sorted_on_write() {
        let search = trim_and_stringify(
            parse_query("zeta=1&alpha=2"),
            updates(&[("mid", ParamUpdate::Set("3".to_string()))]),
        );
        assert_eq!(search, "alpha=2&mid=3&zeta=1");
    }

    #[test]
    fn test_values_are_encoded() {
        let search = trim_and_stringify(
            QueryParams::new(),
            updates(&[("t:filter.name", ParamUpdate::Set("log4j core".to_string()))]),
        );
        assert_eq!(search, "t%3Afilter.name=log4j+core");
        assert_eq!(
            parse_query(&search).get("t:filter.name").map(String::as_str),
            Some("log4j core")
        );
    }

    #[test]
    fn test_from_href_drops_fragment() {
        let location = DocumentLocation::from_href("/sboms?b=2&a=1#details");
        let snapshot = location.snapshot();
        assert_eq!(snapshot.pathname, "/sboms");
        assert_eq!(snapshot.search, "b=2&a=1");
        assert_eq!(location.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_apply_bumps_version_and_merges_live_state() {
        let location = DocumentLocation::new("/sboms", "");
        let other = location.clone();

        assert!(location.apply(updates(&[("a:page", ParamUpdate::Set("2".to_string()))])));
        assert!(other.apply(updates(&[("b:page", ParamUpdate::Set("5".to_string()))])));

        assert_eq!(location.search(), "a%3Apage=2&b%3Apage=5");
        assert_eq!(location.version(), 2);
        assert_eq!(location.href(), "/sboms?a%3Apage=2&b%3Apage=5");
    }

    #[test]
    fn test_apply_with_only_keep_does_not_commit() {
        let location = DocumentLocation::new("/", "a=1");
        assert!(!location.apply(updates(&[("a", ParamUpdate::Keep)])));
        assert_eq!(location.version(), 0);
        assert_eq!(location.search(), "a=1");
    }
}
