//! Form variant catalog
//!
//! Every planilla the office prints is the same stamping routine run against
//! a different worksheet of the template workbook. A [`FormVariant`] is the
//! data that tells the stamper which sheet to copy, which header cells get
//! which labels, where the beneficiary rows go and how the output file is
//! named. The built-in catalog mirrors the sheets of `FormatoPlanillas.xlsx`;
//! the YAML configuration can replace or extend any entry.

use crate::error::{PlanillaError, PlanillaResult};
use crate::excel::address::{column_letter_to_index, CellRef};
use crate::types::{columns, PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Label a header cell can be filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    UnitName,
    UnitDisplayName,
    OfficeCode,
    CompositeCode,
    Community,
    Department,
    Municipality,
    TechnicianName,
    TechnicianId,
    SupplyLabel,
    SchoolCode,
    TrainingRegistry,
    Date,
}

impl Field {
    /// Community table column the label is read from, if any.
    pub fn source_column(self) -> Option<&'static str> {
        match self {
            Field::Department => Some(columns::DEPARTMENT),
            Field::Municipality => Some(columns::MUNICIPALITY),
            Field::TechnicianName => Some(columns::TECHNICIAN_NAME),
            Field::TechnicianId => Some(columns::TECHNICIAN_ID),
            Field::SupplyLabel => Some(columns::SUPPLY),
            Field::SchoolCode => Some(columns::SCHOOL_CODE),
            Field::TrainingRegistry => Some(columns::TRAINING_REGISTRY),
            _ => None,
        }
    }
}

/// One stamped header cell: either a label or fixed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub cell: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl HeaderCell {
    pub fn field(cell: &str, field: Field) -> Self {
        Self {
            cell: cell.to_string(),
            field: Some(field),
            text: None,
        }
    }

    pub fn text(cell: &str, text: &str) -> Self {
        Self {
            cell: cell.to_string(),
            field: None,
            text: Some(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// One worksheet per page of beneficiaries.
    Roster,
    /// A single worksheet without beneficiary rows.
    Additional,
}

/// Where beneficiary rows land on a roster sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub name_column: String,
    pub identifier_column: String,
    /// 1-based row of the first slot inside a block.
    pub first_row: u32,
    #[serde(default = "default_row_budget")]
    pub row_budget: usize,
    /// Rows per stacked block. `None` means the template holds a single block.
    #[serde(default)]
    pub block_stride: Option<u32>,
    /// Rows (1-based, inclusive) hidden before the current block is revealed.
    #[serde(default)]
    pub hidden_rows: u32,
}

fn default_row_budget() -> usize {
    PAGE_SIZE.get()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoPlacement {
    pub cell: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormVariant {
    pub id: String,
    pub title: String,
    pub sheet: String,
    pub kind: VariantKind,
    /// Output worksheet prefix, defaults to the template sheet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_prefix: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<SlotLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoPlacement>,
    /// Pattern with `{index}`, `{department}`, `{municipality}`,
    /// `{community}`, `{code}` and `{office_code}` placeholders.
    pub file_name: String,
}

impl FormVariant {
    pub fn is_roster(&self) -> bool {
        self.kind == VariantKind::Roster
    }

    pub fn sheet_prefix(&self) -> &str {
        self.sheet_prefix.as_deref().unwrap_or(&self.sheet)
    }

    /// Beneficiary rows per page.
    pub fn page_size(&self) -> NonZeroUsize {
        self.slots
            .as_ref()
            .and_then(|s| NonZeroUsize::new(s.row_budget))
            .unwrap_or(PAGE_SIZE)
    }

    /// Community columns this variant stamps.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut required: Vec<&'static str> = Vec::new();
        for column in self
            .headers
            .iter()
            .filter_map(|h| h.field.and_then(Field::source_column))
        {
            if !required.contains(&column) {
                required.push(column);
            }
        }
        required
    }

    /// Check addresses and layout before anything is written.
    pub fn validate(&self) -> PlanillaResult<()> {
        for header in &self.headers {
            CellRef::parse(&header.cell)?;
            if header.field.is_some() == header.text.is_some() {
                return Err(PlanillaError::Config(format!(
                    "variant '{}': header {} needs exactly one of field or text",
                    self.id, header.cell
                )));
            }
        }

        if let Some(logo) = &self.logo {
            CellRef::parse(&logo.cell)?;
        }

        match (&self.kind, &self.slots) {
            (VariantKind::Roster, None) => Err(PlanillaError::Config(format!(
                "variant '{}': roster variants need a slot layout",
                self.id
            ))),
            (VariantKind::Roster, Some(slots)) => {
                column_letter_to_index(&slots.name_column)?;
                column_letter_to_index(&slots.identifier_column)?;
                if slots.first_row == 0 {
                    return Err(PlanillaError::Config(format!(
                        "variant '{}': slot rows are 1-based",
                        self.id
                    )));
                }
                if slots.row_budget == 0 {
                    return Err(PlanillaError::Config(format!(
                        "variant '{}': row budget must be positive",
                        self.id
                    )));
                }
                if let Some(stride) = slots.block_stride {
                    let last_slot = slots.first_row as usize + slots.row_budget - 1;
                    if stride == 0 || last_slot > stride as usize {
                        return Err(PlanillaError::Config(format!(
                            "variant '{}': slots do not fit in a block of {} rows",
                            self.id, stride
                        )));
                    }
                }
                Ok(())
            }
            (VariantKind::Additional, _) => Ok(()),
        }
    }
}

//==============================================================================
// Catalog
//==============================================================================

#[derive(Debug, Clone, Default)]
pub struct VariantCatalog {
    variants: Vec<FormVariant>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<FormVariant>) -> PlanillaResult<Self> {
        let mut catalog = Self::default();
        catalog.merge(variants)?;
        Ok(catalog)
    }

    /// Replace variants with the same id, append the rest.
    pub fn merge(&mut self, variants: Vec<FormVariant>) -> PlanillaResult<()> {
        for variant in variants {
            variant.validate()?;
            match self.variants.iter_mut().find(|v| v.id == variant.id) {
                Some(existing) => *existing = variant,
                None => self.variants.push(variant),
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> PlanillaResult<&FormVariant> {
        let key = id.trim();
        self.variants
            .iter()
            .find(|v| v.id.eq_ignore_ascii_case(key))
            .ok_or_else(|| PlanillaError::UnknownVariant(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormVariant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// The sheets of the standard template workbook.
    pub fn builtin() -> Self {
        Self {
            variants: builtin_variants(),
        }
    }
}

const TECHNICAL_ASSISTANCE: &str = "Asistencia Técnica";

fn large_logo() -> Option<LogoPlacement> {
    Some(LogoPlacement {
        cell: "A1".to_string(),
        width: 133,
        height: 143,
    })
}

fn small_logo() -> Option<LogoPlacement> {
    Some(LogoPlacement {
        cell: "A2".to_string(),
        width: 79,
        height: 76,
    })
}

fn stacked(first_row: u32, stride: u32, hidden_rows: u32) -> Option<SlotLayout> {
    Some(SlotLayout {
        name_column: "B".to_string(),
        identifier_column: "D".to_string(),
        first_row,
        row_budget: PAGE_SIZE.get(),
        block_stride: Some(stride),
        hidden_rows,
    })
}

fn builtin_variants() -> Vec<FormVariant> {
    use Field::*;

    let roster = |id: &str, title: &str, sheet: &str, headers: Vec<HeaderCell>| FormVariant {
        id: id.to_string(),
        title: title.to_string(),
        sheet: sheet.to_string(),
        kind: VariantKind::Roster,
        sheet_prefix: None,
        headers,
        slots: None,
        logo: large_logo(),
        file_name: String::new(),
    };
    let additional = |id: &str, title: &str, sheet: &str, headers: Vec<HeaderCell>| FormVariant {
        kind: VariantKind::Additional,
        ..roster(id, title, sheet, headers)
    };

    vec![
        FormVariant {
            slots: stacked(12, 34, 3434),
            file_name: "{index} - {department}, {municipality}, PLANILLA.xlsx".to_string(),
            sheet_prefix: Some("PLANILLA".to_string()),
            ..roster(
                "planilla",
                "Planilla de entrega",
                "PLANILLAS",
                vec![
                    HeaderCell::field("C4", UnitDisplayName),
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("C9", Municipality),
                    HeaderCell::field("E9", Community),
                    HeaderCell::field("K1", CompositeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::field("G24", SupplyLabel),
                ],
            )
        },
        FormVariant {
            file_name: "{index} - {department}, PLANILLA ADICIONAL.xlsx".to_string(),
            ..additional(
                "planilla-adicional",
                "Planilla adicional",
                "ADICIONALPLA",
                vec![
                    HeaderCell::field("C4", UnitDisplayName),
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("K1", OfficeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::field("G24", SupplyLabel),
                ],
            )
        },
        FormVariant {
            slots: stacked(12, 34, 1428),
            file_name: "{index} - {department}, {municipality}, PLANILLA DE ASISTENCIA.xlsx"
                .to_string(),
            ..roster(
                "asistencia",
                "Planilla de asistencia",
                "PLANILLASASIST",
                vec![
                    HeaderCell::field("C4", UnitDisplayName),
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("C9", Municipality),
                    HeaderCell::field("E9", Community),
                    HeaderCell::field("K1", CompositeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::text("G24", TECHNICAL_ASSISTANCE),
                ],
            )
        },
        FormVariant {
            file_name: "{department}, ASISTENCIA ADICIONAL.xlsx".to_string(),
            ..additional(
                "asistencia-adicional",
                "Asistencia adicional",
                "ASISTENCIAAD",
                vec![
                    HeaderCell::field("C4", UnitDisplayName),
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("K1", OfficeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::text("G24", TECHNICAL_ASSISTANCE),
                ],
            )
        },
        FormVariant {
            slots: stacked(18, 41, 2090),
            logo: small_logo(),
            sheet_prefix: Some("PLANILLA".to_string()),
            file_name: "{index}-{department}, {municipality}, LISTADO DE CAPACITACIÓN.xlsx"
                .to_string(),
            ..roster(
                "capacitacion",
                "Listado de capacitación",
                "LISTADOCAPA",
                vec![
                    HeaderCell::field("A4", CompositeCode),
                    HeaderCell::field("A5", UnitDisplayName),
                    HeaderCell::field("C11", Department),
                    HeaderCell::field("C12", Municipality),
                    HeaderCell::field("C13", Community),
                    HeaderCell::field("C14", TrainingRegistry),
                    HeaderCell::field("A32", TechnicianName),
                ],
            )
        },
        FormVariant {
            logo: small_logo(),
            file_name: "{department}, CAPACITACIÓN ADICIONAL.xlsx".to_string(),
            ..additional(
                "capacitacion-adicional",
                "Capacitación adicional",
                "LISTADOCAPAAD",
                vec![
                    HeaderCell::field("A4", OfficeCode),
                    HeaderCell::field("A5", UnitDisplayName),
                    HeaderCell::field("C11", Department),
                    HeaderCell::field("A32", TechnicianName),
                ],
            )
        },
        FormVariant {
            slots: stacked(12, 34, 1700),
            file_name: "{index} - {department}, {municipality}, PLANILLA DAU.xlsx".to_string(),
            ..roster(
                "dau",
                "Planilla DAU",
                "PLANILLASDAU",
                vec![
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("C9", Municipality),
                    HeaderCell::field("E7", Community),
                    HeaderCell::field("E9", SchoolCode),
                    HeaderCell::field("K1", CompositeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::field("J24", SupplyLabel),
                ],
            )
        },
        FormVariant {
            file_name: "{department}, PLANILLA ADICIONAL DAU.xlsx".to_string(),
            ..additional(
                "dau-adicional",
                "Planilla adicional DAU",
                "PLANILLASDAUAD",
                vec![
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("K1", OfficeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                ],
            )
        },
        FormVariant {
            slots: stacked(12, 34, 1700),
            file_name: "{index} - {department}, {municipality}, PLANILLA DE ASISTENCIA DAU.xlsx"
                .to_string(),
            ..roster(
                "asistencia-dau",
                "Planilla de asistencia DAU",
                "ASISTENCIADAU",
                vec![
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("C9", Municipality),
                    HeaderCell::field("E7", Community),
                    HeaderCell::field("E9", SchoolCode),
                    HeaderCell::field("K1", CompositeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::text("J24", TECHNICAL_ASSISTANCE),
                ],
            )
        },
        FormVariant {
            file_name: "{department}, ASISTENCIA ADICIONAL DAU.xlsx".to_string(),
            ..additional(
                "asistencia-dau-adicional",
                "Asistencia adicional DAU",
                "ASISTENCIADAUAD",
                vec![
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("K1", OfficeCode),
                    HeaderCell::field("B23", TechnicianName),
                    HeaderCell::field("B27", TechnicianId),
                    HeaderCell::text("J24", TECHNICAL_ASSISTANCE),
                ],
            )
        },
        FormVariant {
            slots: Some(SlotLayout {
                name_column: "B".to_string(),
                identifier_column: "D".to_string(),
                first_row: 11,
                row_budget: PAGE_SIZE.get(),
                block_stride: None,
                hidden_rows: 0,
            }),
            sheet_prefix: Some("PLANILLA".to_string()),
            file_name: "Planilla_{code}.xlsx".to_string(),
            ..roster(
                "simplificada",
                "Planilla simplificada",
                "PLANILLAS",
                vec![
                    HeaderCell::field("C4", UnitName),
                    HeaderCell::field("C7", Department),
                    HeaderCell::field("C9", Municipality),
                    HeaderCell::field("E9", Community),
                    HeaderCell::field("K1", CompositeCode),
                ],
            )
        },
    ]
}
