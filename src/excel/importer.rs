//! Roster importer - spreadsheet (.xlsx/.xls/.ods) → text tables

use crate::error::{PlanillaError, PlanillaResult};
use crate::types::{BeneficiaryTable, CommunityTable, RawTable};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the first worksheet of an uploaded roster.
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the first worksheet as header + text rows.
    pub fn import(&self) -> PlanillaResult<RawTable> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            PlanillaError::Excel(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| {
                PlanillaError::Excel(format!("{} has no worksheets", self.path.display()))
            })?;

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            PlanillaError::Excel(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        let table = range_to_table(&range);
        debug!(
            file = %self.path.display(),
            sheet = %sheet_name,
            columns = table.headers.len(),
            rows = table.len(),
            "imported roster"
        );
        Ok(table)
    }

    pub fn import_communities(&self) -> PlanillaResult<CommunityTable> {
        CommunityTable::from_raw(&self.import()?)
    }

    pub fn import_beneficiaries(&self) -> PlanillaResult<BeneficiaryTable> {
        BeneficiaryTable::from_raw(&self.import()?)
    }
}

/// First row is the header, the rest are data rows.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(col, cell)| match cell {
                Data::Empty => format!("col_{}", col),
                other => cell_text(other),
            })
            .collect(),
        None => return RawTable::default(),
    };

    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    RawTable::new(headers, data)
}

/// Cell contents as text. Whole numbers lose the trailing `.0` so numeric
/// identifiers read back exactly as typed.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
