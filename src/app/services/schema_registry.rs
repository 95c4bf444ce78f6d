//! Per-year source field registry
//!
//! Every survey year publishes the same fifteen questions, but not always
//! under the same column names. The registry resolves, for each registered
//! year, the ordered list of source columns to extract so that position `i`
//! always feeds canonical column `i`.

use crate::app::models::CanonicalField;
use crate::config::{FieldOverride, SourceConfig};
use crate::constants::CANONICAL_ARITY;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Immutable mapping from survey year to ordered source field names
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    mappings: BTreeMap<u16, Vec<String>>,
}

impl SchemaRegistry {
    /// Build a registry for the given years, applying per-year overrides
    ///
    /// Overrides replace the source name at the field's canonical position;
    /// they never add or remove columns.
    pub fn new(years: &[u16], overrides: &[FieldOverride]) -> Result<Self> {
        let standard: Vec<String> = CanonicalField::ALL
            .iter()
            .map(|field| field.standard_source().to_string())
            .collect();

        let mut mappings: BTreeMap<u16, Vec<String>> = years
            .iter()
            .map(|year| (*year, standard.clone()))
            .collect();

        let mut applied = HashSet::new();
        for field_override in overrides {
            let fields = mappings.get_mut(&field_override.year).ok_or_else(|| {
                Error::schema_for_year(
                    field_override.year,
                    format!(
                        "override for {} targets a year with no registered mapping",
                        field_override.field
                    ),
                )
            })?;

            if !applied.insert((field_override.year, field_override.field)) {
                return Err(Error::schema_for_year(
                    field_override.year,
                    format!("{} is overridden more than once", field_override.field),
                ));
            }

            debug!(
                "Year {}: {} read from '{}' instead of '{}'",
                field_override.year,
                field_override.field,
                field_override.source,
                field_override.field.standard_source()
            );
            fields[field_override.field.index()] = field_override.source.clone();
        }

        let registry = Self { mappings };
        registry.verify()?;
        Ok(registry)
    }

    /// Build the registry described by a source configuration
    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        Self::new(&source.years, &source.field_overrides)
    }

    /// The published Vigitel mapping: 2009-2019, with `q76a` in 2014
    pub fn vigitel() -> Result<Self> {
        Self::from_config(&SourceConfig::default())
    }

    /// Ordered source fields to extract for a year
    pub fn fields_for(&self, year: u16) -> Result<&[String]> {
        self.mappings
            .get(&year)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::schema_for_year(year, "no field mapping registered for year"))
    }

    /// Source field feeding one canonical column in a year
    pub fn source_for(&self, year: u16, field: CanonicalField) -> Result<&str> {
        Ok(self.fields_for(year)?[field.index()].as_str())
    }

    /// Registered years in chronological order
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.mappings.keys().copied()
    }

    pub fn contains(&self, year: u16) -> bool {
        self.mappings.contains_key(&year)
    }

    /// Every list must have canonical arity and name each source column once
    fn verify(&self) -> Result<()> {
        for (year, fields) in &self.mappings {
            if fields.len() != CANONICAL_ARITY {
                return Err(Error::schema_for_year(
                    *year,
                    format!(
                        "field list has {} entries, expected {}",
                        fields.len(),
                        CANONICAL_ARITY
                    ),
                ));
            }

            let mut seen = HashSet::new();
            for (field, source) in CanonicalField::ALL.iter().zip(fields) {
                if !seen.insert(source.as_str()) {
                    return Err(Error::schema_for_year(
                        *year,
                        format!("source field '{}' is mapped twice (again at {})", source, field),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DIABETES_ALTERNATE_FIELD, DIABETES_RENAMED_YEAR};

    #[test]
    fn test_every_year_has_canonical_arity_and_order() {
        let registry = SchemaRegistry::vigitel().unwrap();
        assert_eq!(registry.years().count(), 11);

        for year in registry.years() {
            let fields = registry.fields_for(year).unwrap();
            assert_eq!(fields.len(), CANONICAL_ARITY);
            for field in CanonicalField::ALL {
                if year == DIABETES_RENAMED_YEAR && field == CanonicalField::Diabetes {
                    continue;
                }
                assert_eq!(fields[field.index()], field.standard_source());
            }
        }
    }

    #[test]
    fn test_standard_field_list() {
        let registry = SchemaRegistry::vigitel().unwrap();
        assert_eq!(
            registry.fields_for(2009).unwrap(),
            [
                "ano", "cidade", "q6", "q7", "civil", "q8_anos", "q9", "q11", "q42", "q45",
                "q60", "q69", "q75", "q76", "imc"
            ]
        );
    }

    #[test]
    fn test_renamed_diabetes_keeps_position() {
        let registry = SchemaRegistry::vigitel().unwrap();
        let renamed = registry.fields_for(DIABETES_RENAMED_YEAR).unwrap();
        let standard = registry.fields_for(2013).unwrap();

        assert_eq!(renamed.len(), standard.len());
        assert_eq!(
            renamed[CanonicalField::Diabetes.index()],
            DIABETES_ALTERNATE_FIELD
        );
        assert_eq!(standard[CanonicalField::Diabetes.index()], "q76");
        assert!(!renamed.iter().any(|f| f == "q76"));
        assert_eq!(
            registry
                .source_for(DIABETES_RENAMED_YEAR, CanonicalField::Bmi)
                .unwrap(),
            "imc"
        );
    }

    #[test]
    fn test_unregistered_year_is_schema_error() {
        let registry = SchemaRegistry::vigitel().unwrap();
        let err = registry.fields_for(2020).unwrap_err();
        assert!(matches!(err, Error::Schema { year: Some(2020), .. }));
        assert!(!registry.contains(2008));
    }

    #[test]
    fn test_override_for_unknown_year_fails() {
        let overrides = vec![FieldOverride {
            year: 2030,
            field: CanonicalField::Diabetes,
            source: "q76b".to_string(),
        }];
        let result = SchemaRegistry::new(&[2009], &overrides);
        assert!(matches!(result, Err(Error::Schema { .. })));
    }

    #[test]
    fn test_override_colliding_with_other_field_fails() {
        let overrides = vec![FieldOverride {
            year: 2009,
            field: CanonicalField::Diabetes,
            source: "q75".to_string(),
        }];
        let result = SchemaRegistry::new(&[2009], &overrides);
        assert!(matches!(result, Err(Error::Schema { year: Some(2009), .. })));
    }

    #[test]
    fn test_duplicate_override_fails() {
        let make = |source: &str| FieldOverride {
            year: 2009,
            field: CanonicalField::Age,
            source: source.to_string(),
        };
        let result = SchemaRegistry::new(&[2009], &[make("idade"), make("q6a")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_years_are_chronological() {
        let registry = SchemaRegistry::new(&[2012, 2010, 2011], &[]).unwrap();
        assert_eq!(registry.years().collect::<Vec<_>>(), vec![2010, 2011, 2012]);
    }
}
