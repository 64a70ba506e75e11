//! Configuration module for sbom-table-controls.
//!
//! This module provides:
//! - Type-safe table options and a declarative table schema
//! - Validation for all configuration values
//! - Named presets for common persistence setups
//! - YAML schema file loading and discovery
//!
//! # Schema File
//!
//! Place a `.sbom-table.yaml` file in your working directory or
//! `~/.config/sbom-table-controls/`:
//!
//! ```yaml
//! options:
//!   table_name: sboms
//!   persist_to:
//!     default: url_params
//! columns:
//!   - key: name
//!     label: Name
//! sortable_columns: [name]
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_PAGE_SIZE_OPTIONS, DEFAULT_PATHNAME, OptionsPreset,
};
pub use types::{
    ColumnSpec, FeatureToggles, FilterCategorySpec, PaginationOptions, PersistConfig,
    PersistTarget, TableFeature, TableOptions, TableOptionsBuilder, TableSchema,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    ConfigFileError, discover_config_file, generate_example_config, load_config_file,
    load_or_default,
};

/// Generate a JSON Schema for the table schema file format.
///
/// It can be used by editors for validation and autocompletion of
/// `.sbom-table.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(TableSchema);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_mentions_options() {
        let schema = generate_json_schema();
        assert!(schema.contains("\"TableOptions\""));
        assert!(schema.contains("persistence_key_prefix"));
    }
}
