//! sbom-table: evaluate SBOM table views from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sbom_table_controls::{
    cli::{self, QueryConfig},
    config::{discover_config_file, generate_example_config, generate_json_schema},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sbom-table")]
#[command(version)]
#[command(about = "Evaluate filter, sort and pagination state of SBOM tables", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Render the page a shared link points at
    sbom-table query --schema advisories.yaml --data advisories.json --url \"/advisories?sort=published:desc\"

    # Show the hub request the same link produces
    sbom-table query --schema advisories.yaml --url \"/advisories?a:filter.severity=critical\" --remote

    # Emit the JSON schema for editor completion
    sbom-table schema > sbom-table.schema.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a table view addressed by a URL
    Query {
        /// Table schema file (YAML); discovered when omitted
        #[arg(short, long, env = "SBOM_TABLE_SCHEMA")]
        schema: Option<PathBuf>,

        /// JSON file holding an array of rows
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Location addressing the view, e.g. "/sboms?sort=name:asc"
        #[arg(short, long, default_value = "/")]
        url: String,

        /// Print the hub request instead of processing rows locally
        #[arg(long)]
        remote: bool,
    },

    /// Print the JSON schema of table schema files
    Schema,

    /// Schema file helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the discovered schema file path
    Path,
    /// Print an example schema file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Query {
            schema,
            data,
            url,
            remote,
        } => cli::run_query(&QueryConfig {
            schema_path: schema,
            data_path: data,
            url,
            remote,
        }),
        Commands::Schema => {
            println!("{}", generate_json_schema());
            Ok(())
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Path => match discover_config_file(None) {
                    Some(path) => println!("{}", path.display()),
                    None => println!("No table schema file found"),
                },
                ConfigAction::Init => print!("{}", generate_example_config()),
            }
            Ok(())
        }
    }
}
