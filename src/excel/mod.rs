//! Excel I/O for rosters and form templates
//!
//! - Import: roster workbook (.xlsx/.xls/.ods) → text tables
//! - Stamp: template sheet + form plan → filled .xlsx
//! - Convert: legacy .xls → .xlsx

pub mod address;
mod converter;
mod importer;
mod stamper;

pub use address::{column_index_to_letter, column_letter_to_index, CellRef};
pub use converter::WorkbookConverter;
pub use importer::{cell_text, ExcelImporter};
pub use stamper::{CellValue, MergedRegion, TemplateSheet, TemplateStamper};
