//! Unified error types for sbom-table-controls.
//!
//! Only programmer mistakes surface as errors. State that arrives through the
//! URL or a storage backend is user-editable and is never turned into an error:
//! it is logged and replaced with the last good or default value instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for table-controls operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TableControlsError {
    /// Invalid table configuration, detected at construction time
    #[error("Invalid table configuration: {context}")]
    Config {
        context: String,
        #[source]
        source: ConfigErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific configuration error kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    #[error("Duplicate filter category key '{0}'")]
    DuplicateCategoryKey(String),

    #[error("More than one free-text filter category")]
    MultipleFreeTextCategories,

    #[error("Sortable column '{0}' has no remote sort field")]
    MissingRemoteSortField(String),

    #[error("Sortable column '{0}' is not a declared column")]
    UnknownSortableColumn(String),

    #[error("Sortable columns need a sort value projection for local sorting")]
    MissingSortValues,

    #[error("Initial sort column '{0}' is not sortable")]
    InvalidInitialSort(String),

    #[error("Key '{0}' must not contain ':'")]
    InvalidParamKey(String),

    #[error("Filter category '{0}' needs a matcher or item value accessor for local filtering")]
    MissingItemValue(String),

    #[error("Items per page must be at least 1")]
    ZeroItemsPerPage,

    #[error("{0}")]
    Options(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for table-controls operations
pub type Result<T> = std::result::Result<T, TableControlsError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl TableControlsError {
    /// Create a configuration error with context
    pub fn config(context: impl Into<String>, source: ConfigErrorKind) -> Self {
        Self::Config {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The configuration error kind, if this is a configuration error.
    #[must_use]
    pub const fn config_kind(&self) -> Option<&ConfigErrorKind> {
        match self {
            Self::Config { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TableControlsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, so the outermost caller appears first:
/// `"table 'sboms': filter category 'severity': ..."`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<TableControlsError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: TableControlsError, new_ctx: &str) -> TableControlsError {
    match err {
        TableControlsError::Config {
            context: existing,
            source,
        } => TableControlsError::Config {
            context: chain_context(new_ctx, &existing),
            source,
        },
        TableControlsError::Io {
            path,
            message,
            source,
        } => TableControlsError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        TableControlsError::Validation(msg) => {
            TableControlsError::Validation(chain_context(new_ctx, &msg))
        }
    }
}

/// Chain two context strings together.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| TableControlsError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| TableControlsError::Validation(f().into()))
    }
}
