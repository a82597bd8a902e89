//! Legacy workbook converter - .xls/.ods → .xlsx (first worksheet)

use crate::error::{PlanillaError, PlanillaResult};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct WorkbookConverter {
    input: PathBuf,
}

impl WorkbookConverter {
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
        }
    }

    /// Default output: same folder and stem, `.xlsx` extension.
    pub fn default_output(&self) -> PathBuf {
        self.input.with_extension("xlsx")
    }

    /// Copy the first worksheet's values into a new .xlsx file.
    /// Returns the number of cells written.
    pub fn convert(&self, output: &Path) -> PlanillaResult<usize> {
        if self.input == output {
            return Err(PlanillaError::Validation(format!(
                "input and output are the same file: {}",
                output.display()
            )));
        }

        let mut source = open_workbook_auto(&self.input).map_err(|e| {
            PlanillaError::Excel(format!("Failed to open {}: {}", self.input.display(), e))
        })?;
        let sheet_name = source.sheet_names().first().cloned().ok_or_else(|| {
            PlanillaError::Excel(format!("{} has no worksheets", self.input.display()))
        })?;
        let range = source.worksheet_range(&sheet_name).map_err(|e| {
            PlanillaError::Excel(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .map_err(|e| PlanillaError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut written = 0;
        for (row, col, cell) in range.used_cells() {
            let r = row0 + row as u32;
            let c = (col0 as usize + col) as u16;
            let result = match cell {
                Data::String(s) => worksheet.write_string(r, c, s).map(|_| ()),
                Data::Float(f) => worksheet.write_number(r, c, *f).map(|_| ()),
                Data::Int(i) => worksheet.write_number(r, c, *i as f64).map(|_| ()),
                Data::Bool(b) => worksheet.write_boolean(r, c, *b).map(|_| ()),
                Data::DateTime(dt) => worksheet.write_number(r, c, dt.as_f64()).map(|_| ()),
                Data::Empty => continue,
                other => worksheet.write_string(r, c, other.to_string()).map(|_| ()),
            };
            result.map_err(|e| PlanillaError::Export(format!("Failed to write cell: {}", e)))?;
            written += 1;
        }

        workbook
            .save(output)
            .map_err(|e| PlanillaError::Export(format!("Failed to save {}: {}", output.display(), e)))?;

        debug!(
            input = %self.input.display(),
            output = %output.display(),
            cells = written,
            "converted workbook"
        );
        Ok(written)
    }
}
