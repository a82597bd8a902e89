//! Spreadsheet → PDF export through an office suite

use crate::error::{PlanillaError, PlanillaResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Renders a generated workbook to PDF.
pub trait PdfConverter {
    /// Convert `xlsx`, writing the PDF into `out_dir`. Returns the PDF path.
    fn convert(&self, xlsx: &Path, out_dir: &Path) -> PlanillaResult<PathBuf>;
}

/// Headless LibreOffice / OpenOffice (`soffice --headless --convert-to pdf`).
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    program: String,
}

impl OfficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Where the office suite puts the PDF for `xlsx`.
    pub fn pdf_path(xlsx: &Path, out_dir: &Path) -> PathBuf {
        let stem = xlsx.file_stem().unwrap_or_default().to_string_lossy();
        out_dir.join(format!("{}.pdf", stem))
    }
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self::new("soffice")
    }
}

impl PdfConverter for OfficeConverter {
    fn convert(&self, xlsx: &Path, out_dir: &Path) -> PlanillaResult<PathBuf> {
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(xlsx)
            .output()
            .map_err(|e| {
                PlanillaError::Conversion(format!("Failed to run '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(PlanillaError::Conversion(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pdf = Self::pdf_path(xlsx, out_dir);
        if !pdf.exists() {
            return Err(PlanillaError::Conversion(format!(
                "no PDF produced for {}",
                xlsx.display()
            )));
        }

        debug!(pdf = %pdf.display(), "exported PDF");
        Ok(pdf)
    }
}
