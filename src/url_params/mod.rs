//! URL query-string persistence for table state.
//!
//! - [`DocumentLocation`] - the page location, shared by every table instance
//! - [`ParamCodec`] - converts one piece of state to and from flat string params
//! - [`UrlParamStore`] - binds a codec to the location under a key prefix
//!
//! Writes use three-way semantics: [`ParamUpdate::Keep`] leaves a parameter
//! untouched, [`ParamUpdate::Remove`] deletes it and [`ParamUpdate::Set`]
//! overwrites it. Every commit merges against the live query string and
//! sorts the keys, so the same logical state always yields the same URL.
//!
//! ```
//! use sbom_table_controls::url_params::{trim_and_stringify, parse_query, ParamUpdate};
//!
//! let search = trim_and_stringify(
//!     parse_query("a=old&b=old&c=old"),
//!     vec![
//!         ("a".to_string(), ParamUpdate::Set("x".to_string())),
//!         ("b".to_string(), ParamUpdate::Keep),
//!         ("c".to_string(), ParamUpdate::Remove),
//!     ],
//! );
//! assert_eq!(search, "a=x&b=old");
//! ```

mod codec;
pub mod escape;
mod location;
mod store;

pub use codec::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};
pub use location::{
    DocumentLocation, LocationSnapshot, QueryParams, parse_query, stringify_query,
    trim_and_stringify,
};
pub(crate) use location::apply_updates;
pub use store::{PREFIX_SEPARATOR, UrlParamStore, validate_param_key};
