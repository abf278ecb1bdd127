use crate::domain::model::{CellLine, Culture, Vessel};
use crate::domain::ports::CatalogProvider;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Vessels, cell lines and cultures that calculation requests refer to by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub vessels: Vec<Vessel>,
    #[serde(default)]
    pub cell_lines: Vec<CellLine>,
    #[serde(default)]
    pub cultures: Vec<Culture>,
}

impl Catalog {
    /// The reference vessels and cell lines shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalcError::ConfigParse {
            field: "catalog".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalcError::ConfigParse {
            field: "catalog".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn check_unique_ids(field: &str, ids: impl Iterator<Item = i64>) -> Result<()> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(CalcError::InvalidConfigValue {
                    field: field.to_string(),
                    value: id.to_string(),
                    reason: "Duplicate id".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Validate for Catalog {
    fn validate(&self) -> Result<()> {
        Self::check_unique_ids("vessels.id", self.vessels.iter().map(|v| v.id))?;
        Self::check_unique_ids("cell_lines.id", self.cell_lines.iter().map(|c| c.id))?;
        Self::check_unique_ids("cultures.id", self.cultures.iter().map(|c| c.id))?;

        for vessel in &self.vessels {
            validate_non_empty_string("vessels.name", &vessel.name)?;
            validate_positive("vessels.area_cm2", vessel.area_cm2)?;
            validate_positive(
                "vessels.cells_at_100_confluency",
                vessel.cells_at_100_confluency,
            )?;
        }

        for line in &self.cell_lines {
            validate_non_empty_string("cell_lines.name", &line.name)?;
            for (field, bound) in [
                ("cell_lines.doubling_time_min_hours", line.doubling_time_min_hours),
                ("cell_lines.doubling_time_max_hours", line.doubling_time_max_hours),
            ] {
                if let Some(hours) = bound {
                    validate_range(field, hours, 0.0, f64::MAX)?;
                }
            }
            if let (Some(min), Some(max)) =
                (line.doubling_time_min_hours, line.doubling_time_max_hours)
            {
                validate_range("cell_lines.doubling_time_min_hours", min, 0.0, max)?;
            }
        }

        for culture in &self.cultures {
            validate_non_empty_string("cultures.name", &culture.name)?;
            if self.cell_line(culture.cell_line_id).is_none() {
                return Err(CalcError::InvalidConfigValue {
                    field: "cultures.cell_line_id".to_string(),
                    value: culture.cell_line_id.to_string(),
                    reason: format!("Culture '{}' references an unknown cell line", culture.name),
                });
            }
        }

        Ok(())
    }
}

impl CatalogProvider for Catalog {
    fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    fn cell_lines(&self) -> &[CellLine] {
        &self.cell_lines
    }

    fn cultures(&self) -> &[Culture] {
        &self.cultures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMALL_CATALOG: &str = r#"
[[vessels]]
id = 7
name = "T75 flask"
area_cm2 = 75.0
cells_at_100_confluency = 1.0e7

[[cell_lines]]
id = 1
name = "HeLa"
doubling_time_min_hours = 20.0
doubling_time_max_hours = 24.0

[[cultures]]
id = 3
name = "HeLa WT p12"
cell_line_id = 1
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_toml_str(SMALL_CATALOG).unwrap();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.vessel(7).unwrap().name, "T75 flask");
        assert_eq!(catalog.vessel_by_name("t75 FLASK").unwrap().id, 7);
        assert_eq!(catalog.cell_line_for_culture(3).unwrap().name, "HeLa");
        assert!(catalog.cell_line_for_culture(99).is_none());
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.vessel_by_name("T75 flask").unwrap().area_cm2, 75.0);
        assert!(catalog.cell_lines.iter().all(|line| line.average_doubling_time().is_some()));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CELL_SPLITTER_TEST_T25_CELLS", "2.5e6");

        let catalog = Catalog::from_toml_str(
            r#"
[[vessels]]
id = 1
name = "T25 flask"
area_cm2 = 25.0
cells_at_100_confluency = ${CELL_SPLITTER_TEST_T25_CELLS}
"#,
        )
        .unwrap();
        assert_eq!(catalog.vessels[0].cells_at_100_confluency, 2.5e6);

        std::env::remove_var("CELL_SPLITTER_TEST_T25_CELLS");
    }

    #[test]
    fn test_validation_rejects_bad_entries() {
        let zero_area = Catalog::from_toml_str(
            r#"
[[vessels]]
id = 1
name = "Broken"
area_cm2 = 0.0
cells_at_100_confluency = 1.0e6
"#,
        )
        .unwrap();
        assert!(zero_area.validate().is_err());

        let orphan = Catalog::from_toml_str(
            r#"
[[cultures]]
id = 1
name = "Orphan"
cell_line_id = 42
"#,
        )
        .unwrap();
        assert!(orphan.validate().is_err());

        let inverted = Catalog::from_toml_str(
            r#"
[[cell_lines]]
id = 1
name = "Inverted"
doubling_time_min_hours = 30.0
doubling_time_max_hours = 20.0
"#,
        )
        .unwrap();
        assert!(inverted.validate().is_err());

        let duplicate = Catalog::from_toml_str(
            r#"
[[vessels]]
id = 1
name = "A"
area_cm2 = 1.0
cells_at_100_confluency = 1.0
[[vessels]]
id = 1
name = "B"
area_cm2 = 1.0
cells_at_100_confluency = 1.0
"#,
        )
        .unwrap();
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SMALL_CATALOG.as_bytes()).unwrap();

        let catalog = Catalog::from_file(temp_file.path()).unwrap();
        assert_eq!(catalog.cultures.len(), 1);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = Catalog::from_toml_str("[[vessels]\nid = ").unwrap_err();
        assert!(matches!(err, CalcError::ConfigParse { .. }));
    }
}
