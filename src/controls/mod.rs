//! The table controls facade.
//!
//! [`TableControls`] composes every per-feature state behind one read model
//! and one set of mutators, and chooses between local processing and remote
//! request building from the [`DataMode`] it is built with.
//!
//! ```
//! use sbom_table_controls::controls::TableControls;
//! use sbom_table_controls::config::{PersistTarget, TableOptions};
//! use sbom_table_controls::state::ActiveSort;
//! use sbom_table_controls::url_params::DocumentLocation;
//!
//! let location = DocumentLocation::new("/sboms", "");
//! let options = TableOptions::builder("sboms")
//!     .persistence_key_prefix("s")
//!     .persist_to(PersistTarget::UrlParams)
//!     .build();
//!
//! let mut table = TableControls::<(String, u32)>::builder(options)
//!     .column("name", "Name")
//!     .sortable("name")
//!     .remote_sort_field("name", "name")
//!     .row_key(|row| row.0.clone())
//!     .remote()
//!     .location(location.clone())
//!     .build()?;
//!
//! table.set_active_sort(ActiveSort::desc("name"));
//! assert_eq!(location.get("s:sort").as_deref(), Some("name:desc"));
//! assert_eq!(table.hub_query()?.sort.as_deref(), Some("name:desc"));
//! # Ok::<(), sbom_table_controls::TableControlsError>(())
//! ```

mod builder;
mod table;

pub use builder::TableControlsBuilder;
pub use table::{DataMode, RowKeyFn, TableControls, TablePage};
