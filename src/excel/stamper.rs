//! Template stamper - form plan → filled .xlsx
//!
//! The template worksheet is read with calamine (values, formulas, merged
//! regions) and re-emitted with rust_xlsxwriter once per page, with header
//! labels and beneficiary rows written over it.

use crate::core::FormPlan;
use crate::error::{PlanillaError, PlanillaResult};
use crate::excel::address::{column_letter_to_index, CellRef};
use crate::types::Page;
use crate::variants::{FormVariant, SlotLayout};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Formula, Image, Workbook, Worksheet};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Value of one template cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Formula(String),
    /// Cleared cell; nothing is written.
    Blank,
}

impl CellValue {
    fn from_data(cell: &Data) -> Option<Self> {
        match cell {
            Data::Empty => None,
            Data::String(s) => Some(CellValue::Text(s.clone())),
            Data::Float(f) => Some(CellValue::Number(*f)),
            Data::Int(i) => Some(CellValue::Number(*i as f64)),
            Data::Bool(b) => Some(CellValue::Bool(*b)),
            Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
            other => Some(CellValue::Text(other.to_string())),
        }
    }

    fn text(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

/// Inclusive, zero-based merged area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub first: CellRef,
    pub last: CellRef,
}

impl MergedRegion {
    pub fn contains(&self, at: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&at.row)
            && (self.first.col..=self.last.col).contains(&at.col)
    }
}

/// Snapshot of one template worksheet.
#[derive(Debug, Clone, Default)]
pub struct TemplateSheet {
    pub name: String,
    pub cells: BTreeMap<CellRef, CellValue>,
    pub merges: Vec<MergedRegion>,
}

impl TemplateSheet {
    /// Read a sheet of an .xlsx template.
    pub fn load(path: &Path, sheet: &str) -> PlanillaResult<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
            PlanillaError::Excel(format!("Failed to open template {}: {}", path.display(), e))
        })?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(PlanillaError::MissingSheet(sheet.to_string()));
        }

        let values = workbook
            .worksheet_range(sheet)
            .map_err(|e| PlanillaError::Excel(format!("Failed to read sheet '{}': {}", sheet, e)))?;

        let mut cells = BTreeMap::new();
        if let Some((row0, col0)) = values.start() {
            for (row, col, data) in values.used_cells() {
                if let Some(value) = CellValue::from_data(data) {
                    let at = CellRef::new(row0 + row as u32, (col0 as usize + col) as u16);
                    cells.insert(at, value);
                }
            }
        }

        // Formulas win over their cached values
        if let Ok(formulas) = workbook.worksheet_formula(sheet) {
            if let Some((row0, col0)) = formulas.start() {
                for (row, col, formula) in formulas.used_cells() {
                    let at = CellRef::new(row0 + row as u32, (col0 as usize + col) as u16);
                    cells.insert(at, CellValue::Formula(formula.clone()));
                }
            }
        }

        workbook
            .load_merged_regions()
            .map_err(|e| PlanillaError::Excel(format!("Failed to read merged cells: {}", e)))?;
        let merges = workbook
            .merged_regions_by_sheet(sheet)
            .iter()
            .map(|(_, _, dims)| MergedRegion {
                first: CellRef::new(dims.start.0, dims.start.1 as u16),
                last: CellRef::new(dims.end.0, dims.end.1 as u16),
            })
            .filter(|region| region.first != region.last)
            .collect();

        Ok(Self {
            name: sheet.to_string(),
            cells,
            merges,
        })
    }

    /// True for cells inside a merged region other than its top-left corner.
    pub fn is_covered(&self, at: CellRef) -> bool {
        self.merges
            .iter()
            .any(|region| region.contains(at) && region.first != at)
    }
}

/// One output worksheet being assembled.
struct SheetDraft<'a> {
    template: &'a TemplateSheet,
    cells: BTreeMap<CellRef, CellValue>,
    hidden_rows: BTreeSet<u32>,
}

impl<'a> SheetDraft<'a> {
    fn new(template: &'a TemplateSheet) -> Self {
        Self {
            template,
            cells: template.cells.clone(),
            hidden_rows: BTreeSet::new(),
        }
    }

    /// Writes into a merged region only land on its top-left cell.
    fn set(&mut self, at: CellRef, value: CellValue) {
        if self.template.is_covered(at) {
            return;
        }
        self.cells.insert(at, value);
    }
}

pub struct TemplateStamper {
    template: PathBuf,
    logo: Option<PathBuf>,
}

impl TemplateStamper {
    pub fn new<P: AsRef<Path>>(template: P, logo: Option<PathBuf>) -> Self {
        Self {
            template: template.as_ref().to_path_buf(),
            logo,
        }
    }

    /// Write the plan to `output`; returns the worksheet names created.
    pub fn stamp(&self, plan: &FormPlan, output: &Path) -> PlanillaResult<Vec<String>> {
        let template = TemplateSheet::load(&self.template, &plan.variant.sheet)?;
        let mut workbook = Workbook::new();
        let mut sheet_names = Vec::new();

        match &plan.variant.slots {
            Some(layout) if plan.variant.is_roster() => {
                if plan.pages.is_empty() {
                    return Err(PlanillaError::Validation(format!(
                        "no beneficiaries to stamp on '{}'",
                        plan.variant.id
                    )));
                }
                for page in &plan.pages {
                    let name = format!("{}{}", plan.variant.sheet_prefix(), page.index + 1);
                    let mut draft = SheetDraft::new(&template);
                    stamp_headers(&mut draft, plan)?;
                    stamp_page(&mut draft, layout, page)?;
                    self.write_sheet(&mut workbook, &name, &draft, &plan.variant)?;
                    sheet_names.push(name);
                }
            }
            _ => {
                let name = format!("{}1", plan.variant.sheet);
                let mut draft = SheetDraft::new(&template);
                stamp_headers(&mut draft, plan)?;
                self.write_sheet(&mut workbook, &name, &draft, &plan.variant)?;
                sheet_names.push(name);
            }
        }

        workbook
            .save(output)
            .map_err(|e| PlanillaError::Export(format!("Failed to save {}: {}", output.display(), e)))?;

        debug!(
            output = %output.display(),
            sheets = sheet_names.len(),
            "stamped template"
        );
        Ok(sheet_names)
    }

    fn write_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        draft: &SheetDraft<'_>,
        variant: &FormVariant,
    ) -> PlanillaResult<()> {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(|e| PlanillaError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let plain = Format::new();
        for region in &draft.template.merges {
            worksheet
                .merge_range(
                    region.first.row,
                    region.first.col,
                    region.last.row,
                    region.last.col,
                    "",
                    &plain,
                )
                .map_err(|e| PlanillaError::Export(format!("Failed to merge cells: {}", e)))?;
        }

        for (at, value) in &draft.cells {
            if draft.template.is_covered(*at) {
                continue;
            }
            write_value(worksheet, *at, value)?;
        }

        for row in &draft.hidden_rows {
            worksheet
                .set_row_hidden(*row)
                .map_err(|e| PlanillaError::Export(format!("Failed to hide row: {}", e)))?;
        }

        if let Some(placement) = &variant.logo {
            self.insert_logo(worksheet, &placement.cell, placement.width, placement.height)?;
        }

        Ok(())
    }

    fn insert_logo(
        &self,
        worksheet: &mut Worksheet,
        cell: &str,
        width: u32,
        height: u32,
    ) -> PlanillaResult<()> {
        let Some(path) = &self.logo else {
            return Ok(());
        };
        if !path.exists() {
            warn!(logo = %path.display(), "logo not found, continuing without it");
            return Ok(());
        }

        let at = CellRef::parse(cell)?;
        let image = Image::new(path)
            .map_err(|e| PlanillaError::Export(format!("Failed to load logo: {}", e)))?
            .set_scale_to_size(f64::from(width), f64::from(height), false);
        worksheet
            .insert_image(at.row, at.col, &image)
            .map_err(|e| PlanillaError::Export(format!("Failed to insert logo: {}", e)))?;
        Ok(())
    }
}

fn stamp_headers(draft: &mut SheetDraft<'_>, plan: &FormPlan) -> PlanillaResult<()> {
    for header in &plan.variant.headers {
        let at = CellRef::parse(&header.cell)?;
        let value = match (&header.field, &header.text) {
            (Some(field), _) => plan.labels.value(*field),
            (None, Some(text)) => text.as_str(),
            (None, None) => "",
        };
        draft.set(at, CellValue::text(value));
    }
    Ok(())
}

/// Place one page of slots, revealing only its block on stacked templates.
fn stamp_page(draft: &mut SheetDraft<'_>, layout: &SlotLayout, page: &Page) -> PlanillaResult<()> {
    let name_col = column_letter_to_index(&layout.name_column)?;
    let id_col = column_letter_to_index(&layout.identifier_column)?;
    let offset = layout
        .block_stride
        .map(|stride| page.index as u32 * stride)
        .unwrap_or(0);

    if let Some(stride) = layout.block_stride {
        let block = offset..offset + stride;
        draft
            .hidden_rows
            .extend((0..layout.hidden_rows).filter(|row| !block.contains(row)));
    }

    for (i, slot) in page.slots.iter().enumerate() {
        let name_cell = CellRef::new(layout.first_row - 1 + i as u32, name_col).offset_rows(offset);
        if slot.is_placeholder() {
            if layout.block_stride.is_none() {
                continue;
            }
            draft.hidden_rows.insert(name_cell.row);
        }
        draft.set(name_cell, CellValue::text(slot.full_name()));
        draft.set(
            CellRef::new(name_cell.row, id_col),
            CellValue::text(slot.identifier()),
        );
    }
    Ok(())
}

fn write_value(worksheet: &mut Worksheet, at: CellRef, value: &CellValue) -> PlanillaResult<()> {
    let result = match value {
        CellValue::Text(text) => worksheet.write_string(at.row, at.col, text).map(|_| ()),
        CellValue::Number(n) => worksheet.write_number(at.row, at.col, *n).map(|_| ()),
        CellValue::Bool(b) => worksheet.write_boolean(at.row, at.col, *b).map(|_| ()),
        CellValue::Formula(f) => worksheet
            .write_formula(at.row, at.col, Formula::new(f))
            .map(|_| ()),
        CellValue::Blank => Ok(()),
    };
    result.map_err(|e| PlanillaError::Export(format!("Failed to write {}: {}", at, e)))
}
