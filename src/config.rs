//! Application configuration
//!
//! Settings come from an optional YAML file (`planillas.yaml`), and command
//! line flags override individual values. Everything has a default so the
//! tools run without any file at all.

use crate::core::plan::PlanContext;
use crate::error::{PlanillaError, PlanillaResult};
use crate::types::NameColumns;
use crate::variants::{FormVariant, VariantCatalog};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "planillas.yaml";

/// Issuing office data used to build the office code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Executing unit, e.g. `DAPA`.
    pub unit: String,
    /// Office letter number, zero-padded to three digits in the code.
    pub number: String,
    pub year: String,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            unit: "DAPCA".to_string(),
            number: "001".to_string(),
            year: Local::now().year().to_string(),
        }
    }
}

impl OfficeConfig {
    /// `{UNIT}-{NNN}-{YEAR}`
    pub fn office_code(&self) -> String {
        format!(
            "{}-{:0>3}-{}",
            self.unit.trim().to_uppercase(),
            self.number.trim(),
            self.year.trim()
        )
    }
}

fn default_unit_names() -> BTreeMap<String, String> {
    [
        ("DAPA", "Departamento de: Apoyo a la Producción de Alimentos"),
        ("DAU", "Departamento de: Agricultura Urbana"),
        ("DADA", "Departamento de: Almacenamiento de Alimentos"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub office: OfficeConfig,
    /// Template workbook holding one sheet per form variant.
    pub template: PathBuf,
    /// Logo image inserted on every sheet, skipped when the file is absent.
    pub logo: Option<PathBuf>,
    /// Root folder for generated documents.
    pub output_root: PathBuf,
    /// Office suite binary used for PDF export.
    pub office_program: String,
    pub name_columns: NameColumns,
    /// Unit code → full department name shown on the forms.
    pub unit_names: BTreeMap<String, String>,
    /// Variants replacing or extending the built-in catalog.
    pub variants: Vec<FormVariant>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            office: OfficeConfig::default(),
            template: PathBuf::from("FormatoPlanillas.xlsx"),
            logo: Some(PathBuf::from("logo_maga.png")),
            output_root: PathBuf::from("PLANILLAS"),
            office_program: "soffice".to_string(),
            name_columns: NameColumns::default(),
            unit_names: default_unit_names(),
            variants: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> PlanillaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, else `planillas.yaml` if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> PlanillaResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> PlanillaResult<()> {
        if self.office.unit.trim().is_empty() {
            return Err(PlanillaError::Config("office unit cannot be empty".to_string()));
        }
        for variant in &self.variants {
            variant.validate()?;
        }
        Ok(())
    }

    /// Full unit name for the form header, the code itself when unknown.
    pub fn unit_display_name(&self) -> String {
        let unit = self.office.unit.trim();
        self.unit_names
            .get(&unit.to_uppercase())
            .cloned()
            .unwrap_or_else(|| unit.to_string())
    }

    /// Built-in variants with the configured overrides applied.
    pub fn catalog(&self) -> PlanillaResult<VariantCatalog> {
        let mut catalog = VariantCatalog::builtin();
        catalog.merge(self.variants.clone())?;
        Ok(catalog)
    }

    /// Folder for one department's documents under the output root.
    pub fn output_dir(&self, department: &str) -> PathBuf {
        let folder = format!(
            "Planillas_{}_{}",
            department.trim().replace(' ', "_"),
            self.office.office_code()
        );
        self.output_root.join(sanitize_path_component(&folder))
    }

    /// Labels shared by every plan built with this configuration.
    pub fn plan_context(&self) -> PlanContext {
        PlanContext {
            office_code: self.office.office_code(),
            unit_name: self.office.unit.trim().to_string(),
            unit_display_name: self.unit_display_name(),
            name_columns: self.name_columns.clone(),
            date: Local::now().format("%d/%m/%Y").to_string(),
        }
    }
}

/// Replace characters that cannot appear in a single path component.
pub fn sanitize_path_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
