//! Command implementations for the Vigitel loader CLI
//!
//! Each command is implemented in its own module:
//! - `import`: Delete and rebuild the destination store
//! - `query`: Run SQL against an imported store
//! - `fields`: Show the per-year source field mapping

pub mod fields;
pub mod import;
pub mod query;
pub mod shared;

use crate::cli::args::Commands;

/// Dispatch to the handler for `command`
pub fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Import(import_args) => import::run_import(import_args),
        Commands::Query(query_args) => query::run_query(query_args),
        Commands::Fields(fields_args) => fields::run_fields(fields_args),
    }
}
