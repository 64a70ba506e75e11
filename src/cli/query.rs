//! Query command handler.
//!
//! Evaluates one table view, as addressed by a URL, against a JSON dataset.

use super::dataset::json_table;
use crate::config::{
    DEFAULT_PATHNAME, TableSchema, Validatable, load_config_file, load_or_default,
};
use crate::hub::{HubQuery, HubRequestParams};
use crate::state::{ActiveSort, PageWindow};
use crate::url_params::DocumentLocation;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Inputs of the `query` command.
#[derive(Debug, Clone, Default)]
pub struct QueryConfig {
    /// Table schema file; discovered when absent
    pub schema_path: Option<PathBuf>,
    /// JSON array of rows
    pub data_path: Option<PathBuf>,
    /// Location whose query string addresses the view, e.g. `/advisories?sort=id:asc`
    pub url: String,
    /// Build the hub request instead of processing rows locally
    pub remote: bool,
}

/// The rendered page of a local evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOutput {
    pub window: PageWindow,
    pub total_count: usize,
    pub page_count: Option<usize>,
    pub items: Vec<Value>,
}

/// What the `query` command prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutput {
    pub table: String,
    pub mode: &'static str,
    /// The location after defaults were seeded
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ActiveSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HubRequestParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<HubQuery>,
    /// `query` rendered as a query string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
}

/// Evaluate a schema over rows at a location.
pub fn evaluate_query(
    schema: &TableSchema,
    items: Vec<Value>,
    url: &str,
    remote: bool,
) -> crate::Result<QueryOutput> {
    let location = DocumentLocation::from_href(if url.is_empty() { DEFAULT_PATHNAME } else { url });
    let table = json_table(schema, items, location.clone(), remote)?;

    let mut output = QueryOutput {
        table: table.options().table_name.clone(),
        mode: if remote { "remote" } else { "local" },
        url: location.href(),
        sort: table.active_sort().cloned(),
        page: None,
        request: None,
        query: None,
        query_string: None,
    };

    if remote {
        let request = table.request_params()?;
        let query = request.to_query();
        output.query_string = Some(query.to_query_string());
        output.query = Some(query);
        output.request = Some(request);
    } else {
        let page = table.current_page();
        output.page = Some(PageOutput {
            window: table.page_window(),
            total_count: page.total_count,
            page_count: table.page_count(),
            items: page.items.into_iter().cloned().collect(),
        });
    }
    Ok(output)
}

fn load_schema(path: Option<&Path>) -> Result<TableSchema> {
    let schema = match path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load table schema {}", path.display()))?,
        None => {
            let (schema, loaded_from) = load_or_default(None);
            match loaded_from {
                Some(found) => tracing::debug!("Using table schema {}", found.display()),
                None => tracing::debug!("No table schema found, using defaults"),
            }
            schema
        }
    };

    let errors = schema.validate();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("{error}");
        }
        bail!("Table schema has {} error(s)", errors.len());
    }
    Ok(schema)
}

fn load_rows(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    match value {
        Value::Array(rows) => Ok(rows),
        _ => bail!("{} must contain a JSON array of rows", path.display()),
    }
}

/// Run the `query` command and print the result as JSON.
pub fn run_query(config: &QueryConfig) -> Result<()> {
    let schema = load_schema(config.schema_path.as_deref())?;
    let rows = match &config.data_path {
        Some(path) => load_rows(path)?,
        None if config.remote => Vec::new(),
        None => bail!("--data is required unless --remote is given"),
    };
    tracing::debug!(rows = rows.len(), remote = config.remote, "evaluating table view");

    let output = evaluate_query(&schema, rows, &config.url, config.remote)
        .context("Failed to evaluate table view")?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> TableSchema {
        serde_yaml::from_str(
            r"
options:
  table_name: packages
  persist_to:
    default: url_params
  pagination:
    initial_items_per_page: 2
columns:
  - key: name
  - key: version
sortable_columns: [name]
remote_sort_fields:
  name: pkg_name
filters:
  - type: search
    field: name
",
        )
        .expect("schema parses")
    }

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": "1", "name": "zlib", "version": "1.3"}),
            json!({"id": "2", "name": "openssl", "version": "3.0"}),
            json!({"id": "3", "name": "openldap", "version": "2.6"}),
        ]
    }

    #[test]
    fn test_local_evaluation_seeds_url() {
        let output = evaluate_query(&schema(), rows(), "/packages?sort=name:asc", false)
            .expect("evaluates");
        let page = output.page.expect("local page");
        assert_eq!(page.total_count, 3);
        assert_eq!(page.items[0]["name"], "openldap");
        assert_eq!(page.items.len(), 2);
        assert!(output.url.contains("pageNumber=1"));
        assert!(output.request.is_none());
    }

    #[test]
    fn test_remote_evaluation() {
        let output = evaluate_query(&schema(), Vec::new(), "/packages?search=ssl&sort=name:desc", true)
            .expect("evaluates");
        let query = output.query.expect("hub query");
        assert_eq!(query.q.as_deref(), Some("ssl"));
        assert_eq!(query.sort.as_deref(), Some("pkg_name:desc"));
        assert_eq!(query.limit, Some(2));
        assert!(output.page.is_none());
    }

    #[test]
    fn test_rows_must_be_an_array() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("rows.json");
        std::fs::write(&path, r#"{"id": 1}"#).expect("write rows");
        assert!(load_rows(&path).is_err());
    }
}
