//! CLI command handlers.
//!
//! Handlers hold the logic of each `sbom-table` subcommand so that it can be
//! tested without spawning the binary.

mod dataset;
mod query;

pub use dataset::{field_text, json_table, sort_value};
pub use query::{PageOutput, QueryConfig, QueryOutput, evaluate_query, run_query};
