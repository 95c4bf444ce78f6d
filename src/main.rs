use clap::Parser;
use std::process;
use vigitel_loader::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match commands::run(command) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Vigitel Loader - Survey Spreadsheet Importer");
    println!("============================================");
    println!();
    println!("Import the yearly Vigitel telephone survey spreadsheets (2009-2019)");
    println!("into a single normalized SQLite table.");
    println!();
    println!("USAGE:");
    println!("    vigitel-loader <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    import      Delete the destination store and import every configured year");
    println!("    query       Run a SQL query against an imported store");
    println!("    fields      Show the source fields read for each survey year");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Import from the public download area into DB_VIGITEL.db:");
    println!("    vigitel-loader import");
    println!();
    println!("    # Import local copies of the files into a custom store:");
    println!("    vigitel-loader import --origin ./vigitel --destination survey.db");
    println!();
    println!("    # Count respondents per year, with labels for coded answers:");
    println!("    vigitel-loader query \"select ANO, count(*) from VIGITEL group by ANO\"");
    println!("    vigitel-loader query --decode \"select CIDADE, FUMANTE from VIGITEL limit 10\"");
    println!();
    println!("For detailed help on any command, use:");
    println!("    vigitel-loader <COMMAND> --help");
}
