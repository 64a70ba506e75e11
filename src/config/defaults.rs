//! Default values for table controls.

use super::types::{PersistTarget, TableOptions};

/// Page size used when a table does not configure one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Page sizes offered by default.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// Default location pathname for tables not bound to a page.
pub const DEFAULT_PATHNAME: &str = "/";

/// Named option presets for common table setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsPreset {
    /// Everything in memory
    InMemory,
    /// Every feature in the URL, so views can be shared as links
    Shareable,
    /// Every feature in storage, so views survive reloads
    Remembered,
}

impl OptionsPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InMemory => "in-memory",
            Self::Shareable => "shareable",
            Self::Remembered => "remembered",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "in-memory" | "memory" | "state" => Some(Self::InMemory),
            "shareable" | "url" | "url-params" => Some(Self::Shareable),
            "remembered" | "storage" => Some(Self::Remembered),
            _ => None,
        }
    }

    #[must_use]
    pub const fn persist_target(&self) -> PersistTarget {
        match self {
            Self::InMemory => PersistTarget::State,
            Self::Shareable => PersistTarget::UrlParams,
            Self::Remembered => PersistTarget::Storage,
        }
    }
}

impl TableOptions {
    /// Options for a named preset.
    pub fn from_preset(table_name: impl Into<String>, preset: OptionsPreset) -> Self {
        Self::builder(table_name)
            .persist_to(preset.persist_target())
            .build()
    }
}
