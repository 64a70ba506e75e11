//! **Filter, sort, pagination, expansion and selection state for SBOM data tables.**
//!
//! `sbom-table-controls` holds the view state of a paginated table of SBOM
//! artifacts (SBOMs, packages, advisories, vulnerabilities) and keeps it
//! addressable: every feature can be persisted to the query string of a shared
//! document location, to a key/value store, or kept in memory. From that state
//! it derives either the remote request for a hub API or, when the whole
//! dataset is at hand, the locally filtered, sorted and paginated page.
//!
//! ## Core Concepts & Modules
//!
//! - **[`controls`]**: the [`TableControls`] facade and its builder. Start here.
//! - **[`url_params`]**: [`DocumentLocation`] and the prefixed, typed URL
//!   parameter store every feature persists through.
//! - **[`filtering`]**: filter categories, values, local matching rules and
//!   their URL codec.
//! - **[`state`]**: sort, pagination, expansion, selection and active-item
//!   state machines.
//! - **[`hub`]**: the normalized [`HubRequestParams`] and the hub query string.
//! - **[`local`]**: the filter, sort and paginate pipeline.
//! - **[`persistence`]**: key/value storage and per-feature routing.
//! - **[`config`]**: options, declarative table schemas, YAML discovery and
//!   validation.
//!
//! ## Getting Started
//!
//! ```
//! use sbom_table_controls::{TableControls, TableOptions};
//! use sbom_table_controls::filtering::FilterCategory;
//!
//! #[derive(Debug)]
//! struct Package {
//!     purl: String,
//!     name: String,
//! }
//!
//! let packages = vec![
//!     Package { purl: "pkg:cargo/serde@1.0".into(), name: "serde".into() },
//!     Package { purl: "pkg:cargo/tokio@1.40".into(), name: "tokio".into() },
//! ];
//!
//! let mut table = TableControls::builder(TableOptions::new("packages"))
//!     .column("name", "Name")
//!     .filter_category(FilterCategory::free_text("Search").with_item_value(|p: &Package| p.name.clone()))
//!     .row_key(|p: &Package| p.purl.clone())
//!     .local(packages)
//!     .build()?;
//!
//! table.set_filter_value("", Some(vec!["tok".to_string()]));
//! let page = table.current_page();
//! assert_eq!(page.total_count, 1);
//! assert_eq!(page.items[0].name, "tokio");
//! # Ok::<(), sbom_table_controls::TableControlsError>(())
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Page math converts between usize and f64 for sort values only
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Feature toggles are plain bool flags
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod controls;
pub mod error;
pub mod filtering;
pub mod hub;
pub mod local;
pub mod persistence;
pub mod state;
pub mod url_params;

// Re-export main types for convenience
pub use config::{ConfigError, Validatable};
pub use config::{PersistTarget, TableFeature, TableOptions, TableSchema};
pub use controls::{DataMode, TableControls, TableControlsBuilder, TablePage};
pub use error::{ConfigErrorKind, ErrorContext, OptionContext, Result, TableControlsError};
pub use filtering::{FilterCategory, FilterKind, FilterType, FilterValues};
pub use hub::{FilterOperator, HubFilter, HubQuery, HubRequestParams};
pub use persistence::{KeyValueStorage, MemoryStorage};
pub use state::{ActiveSort, PageWindow, SortDirection, SortValue};
pub use url_params::{DocumentLocation, ParamUpdate};
