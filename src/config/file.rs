//! Table schema file loading and discovery.
//!
//! Supports loading a [`TableSchema`] from YAML files with automatic
//! discovery.

use super::types::TableSchema;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard schema file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbom-table.yaml",
    ".sbom-table.yml",
    "sbom-table.yaml",
    "sbom-table.yml",
];

/// Directory under the user config directory searched last.
const CONFIG_DIR_NAME: &str = "sbom-table-controls";

/// Discover a schema file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/sbom-table-controls/)
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join(CONFIG_DIR_NAME)))
}

/// Find a schema file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for schema file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Table schema not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read table schema: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse table schema: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load a `TableSchema` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<TableSchema, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let schema: TableSchema = serde_yaml::from_str(&content)?;
    Ok(schema)
}

/// Load the schema from a discovered file, or return the default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (TableSchema, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (TableSchema::default(), None),
        |path| match load_config_file(&path) {
            Ok(schema) => (schema, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load table schema from {}: {}", path.display(), e);
                (TableSchema::default(), None)
            }
        },
    )
}

/// Generate an example schema file.
#[must_use]
pub fn generate_example_config() -> String {
    r"# Table schema for sbom-table
# Place this file at .sbom-table.yaml or ~/.config/sbom-table-controls/sbom-table.yaml

options:
  table_name: advisories
  # Namespaces URL params as `a:sort=...`
  persistence_key_prefix: a
  persist_to:
    # state, url_params or storage
    default: url_params
    expansion: state
  pagination:
    initial_items_per_page: 10
  initial_sort:
    columnKey: published
    direction: desc
  # single, multiple or compound
  expansion: single

id_field: id
columns:
  - key: id
    label: ID
  - key: title
    label: Title
  - key: severity
    label: Severity
  - key: published
    label: Published
sortable_columns: [id, severity, published]
remote_sort_fields:
  id: id
  severity: average_score
  published: published
filters:
  - type: search
    title: Search
    field: title
  - key: severity
    type: multiselect
    title: Severity
    options:
      - value: critical
      - value: high
      - value: medium
      - value: low
  - key: published
    type: dateRange
    title: Published
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
