//! Fields command implementation
//!
//! Prints the source field read for each destination column, per survey
//! year, as resolved from the configuration.

use super::shared::{load_configuration, setup_logging};
use crate::app::models::CanonicalField;
use crate::app::services::schema_registry::SchemaRegistry;
use crate::cli::args::FieldsArgs;
use colored::*;

/// Fields command runner
pub fn run_fields(args: FieldsArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config_file.as_deref())?;
    setup_logging(&config.logging.level, false);
    let registry = SchemaRegistry::from_config(&config.source)?;

    let years: Vec<u16> = match args.year {
        Some(year) => {
            // Fails with a schema error for unregistered years
            registry.fields_for(year)?;
            vec![year]
        }
        None => registry.years().collect(),
    };

    for line in field_lines(&registry, &years)? {
        println!("{}", line);
    }
    Ok(())
}

/// One header line plus one line per canonical column and year
///
/// Sources that differ from the standard name are highlighted.
pub fn field_lines(registry: &SchemaRegistry, years: &[u16]) -> crate::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(years.len() * (CanonicalField::ALL.len() + 1));

    for &year in years {
        lines.push(format!("{}", format!("Survey year {}", year).bright_green().bold()));
        for field in CanonicalField::ALL {
            let source = registry.source_for(year, field)?;
            let rendered = if source == field.standard_source() {
                source.normal()
            } else {
                source.bright_yellow().bold()
            };
            lines.push(format!(
                "  {:>2}  {:<18} {}",
                field.index() + 1,
                field.column_name(),
                rendered
            ));
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lines_for_one_year() {
        colored::control::set_override(false);
        let registry = SchemaRegistry::vigitel().unwrap();

        let lines = field_lines(&registry, &[2014]).unwrap();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "Survey year 2014");
        assert!(lines[1].contains("ANO") && lines[1].ends_with("ano"));
        assert!(lines[14].contains("DIABETES") && lines[14].ends_with("q76a"));
        assert!(lines[15].contains("IMC") && lines[15].ends_with("imc"));
    }

    #[test]
    fn test_field_lines_unknown_year() {
        let registry = SchemaRegistry::vigitel().unwrap();
        assert!(field_lines(&registry, &[2030]).unwrap_err().is_schema());
    }
}
