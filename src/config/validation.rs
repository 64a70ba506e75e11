//! Configuration validation for table controls.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{PaginationOptions, TableOptions, TableSchema};
use crate::error::{ConfigErrorKind, TableControlsError};
use crate::url_params::PREFIX_SEPARATOR;
use std::collections::HashSet;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validate into a single crate error.
    fn ensure_valid(&self, context: &str) -> crate::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(TableControlsError::config(
            context,
            ConfigErrorKind::Options(message),
        ))
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for TableOptions {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(prefix) = &self.persistence_key_prefix {
            if prefix.contains(PREFIX_SEPARATOR) {
                errors.push(ConfigError::new(
                    "persistence_key_prefix",
                    format!("Prefix '{prefix}' must not contain '{PREFIX_SEPARATOR}'"),
                ));
            }
        }

        errors.extend(self.pagination.validate());
        errors
    }
}

impl Validatable for PaginationOptions {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.initial_items_per_page == 0 {
            errors.push(ConfigError::new(
                "pagination.initial_items_per_page",
                "Items per page must be at least 1",
            ));
        }

        if self.page_size_options.contains(&0) {
            errors.push(ConfigError::new(
                "pagination.page_size_options",
                "Page size options must all be at least 1",
            ));
        }

        errors
    }
}

impl Validatable for TableSchema {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.options.validate();

        if self.id_field.is_empty() {
            errors.push(ConfigError::new("id_field", "Row identity field must not be empty"));
        }

        let mut seen = HashSet::new();
        for filter in &self.filters {
            if !seen.insert(filter.key.as_str()) {
                errors.push(ConfigError::new(
                    "filters",
                    if filter.key.is_empty() {
                        "More than one free-text filter category".to_string()
                    } else {
                        format!("Duplicate filter category key '{}'", filter.key)
                    },
                ));
            }
            if filter.key.contains(PREFIX_SEPARATOR) {
                errors.push(ConfigError::new(
                    "filters",
                    format!("Key '{}' must not contain '{PREFIX_SEPARATOR}'", filter.key),
                ));
            }
        }

        let columns: HashSet<&str> = self.columns.iter().map(|c| c.key.as_str()).collect();
        for column in &self.sortable_columns {
            if !columns.contains(column.as_str()) {
                errors.push(ConfigError::new(
                    "sortable_columns",
                    format!("Sortable column '{column}' is not a declared column"),
                ));
            }
        }

        if let Some(sort) = &self.options.initial_sort {
            if !self.sortable_columns.contains(&sort.column_key) {
                errors.push(ConfigError::new(
                    "options.initial_sort",
                    format!("Initial sort column '{}' is not sortable", sort.column_key),
                ));
            }
        }

        errors
    }
}
