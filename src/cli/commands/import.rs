//! Import command implementation
//!
//! Resolves the configuration, then hands the run to the [`Loader`]. The
//! destination store is deleted before anything is fetched.

use super::shared::{create_progress_bar, load_configuration, setup_logging};
use crate::app::services::loader::{ImportSummary, Loader};
use crate::app::services::source_fetcher::{Origin, SpreadsheetFetcher};
use crate::cli::args::ImportArgs;
use crate::config::Config;
use anyhow::Context;
use colored::*;
use std::path::Path;
use tracing::{debug, info};

/// Import command runner
pub fn run_import(args: ImportArgs) -> anyhow::Result<()> {
    args.validate()?;
    let config = build_config(&args)?;

    setup_logging(&config.logging.level, args.quiet);
    debug!("Import arguments: {:?}", args);
    info!(
        "Importing {} years from {} into {}",
        config.source.years.len(),
        config.source.origin,
        config.store.destination.display()
    );
    let origin = Origin::parse(&config.source.origin)?;
    let loader = Loader::new(&config.source, SpreadsheetFetcher::new()?)?;

    if args.dry_run {
        print_plan(&loader, &origin, &config.store.destination);
        return Ok(());
    }

    let destination = config.store.destination.clone();
    let files = loader.source_files();
    let progress = args
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Importing survey files..."));

    let result = loader.recreate_and_import_with_progress(&origin, &destination, |file, rows| {
        if let Some(pb) = &progress {
            pb.inc(1);
            pb.set_message(format!("{} ({} rows)", file.filename, rows));
        }
    });

    if let Some(pb) = &progress {
        match &result {
            Ok(_) => pb.finish_with_message("Import complete"),
            Err(_) => pb.abandon_with_message("Import failed"),
        }
    }

    let summary = result.with_context(|| {
        format!(
            "Import into {} stopped; years before the failing one remain committed",
            destination.display()
        )
    })?;

    if !args.quiet {
        print_summary(&summary, &destination);
    }
    Ok(())
}

/// Layered configuration with this command's flags applied last
fn build_config(args: &ImportArgs) -> crate::Result<Config> {
    let mut config = load_configuration(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &ImportArgs) {
    if let Some(origin) = &args.origin {
        config.source.origin = origin.clone();
    }
    if let Some(destination) = &args.destination {
        config.store.destination = destination.clone();
    }
    if let Some(extension) = &args.extension {
        config.source.extension = extension.clone();
    }
    if let Some(years) = &args.years {
        config.source.years = years.years.clone();
        // Overrides for years no longer imported are dropped
        config
            .source
            .field_overrides
            .retain(|o| years.years.contains(&o.year));
    }
    if let Some(level) = args.get_log_level() {
        config.logging.level = level.to_string();
    }
}

fn print_plan(loader: &Loader, origin: &Origin, destination: &Path) {
    println!("{}", "Dry run: nothing will be deleted or written".bright_yellow().bold());
    println!(
        "  {} {}",
        "Destination:".bright_cyan(),
        destination.display().to_string().bright_white()
    );
    for file in loader.source_files() {
        println!("  {} {}", file.year.to_string().bright_white(), origin.locate(&file.filename));
    }
}

fn print_summary(summary: &ImportSummary, destination: &Path) {
    println!("\n{}", "Import Summary".bright_green().bold());
    println!(
        "  {} {:.2}s",
        "Time elapsed:".bright_cyan(),
        summary.duration.as_secs_f64()
    );
    println!(
        "  {} {}",
        "Store:".bright_cyan(),
        destination.display().to_string().bright_white()
    );
    for file in &summary.files {
        println!(
            "  {} {} rows",
            format!("{}:", file.year).bright_cyan(),
            file.rows.to_string().bright_white()
        );
    }
    println!(
        "  {} {}",
        "Total rows:".bright_cyan(),
        summary.total_rows.to_string().bright_white().bold()
    );
}
