//! Planillas - community delivery and attendance forms from roster spreadsheets
//!
//! Joins a community roster with a beneficiary roster, resolves each
//! beneficiary's display name, splits the list into pages of ten and stamps
//! the pages onto a spreadsheet template (optionally exported to PDF).
//!
//! # Features
//!
//! - Case/whitespace-insensitive roster join with order preserved
//! - Fixed-size pagination with placeholder padding
//! - Data-driven form variants (template sheet, cell map, slot layout)
//! - Excel import (.xlsx/.xls/.ods) and template stamping (.xlsx)
//! - PDF export through a headless office suite
//!
//! # Example
//!
//! ```no_run
//! use planillas::config::AppConfig;
//! use planillas::core::GenerationRequest;
//! use planillas::excel::ExcelImporter;
//! use planillas::generator::Generator;
//!
//! let communities = ExcelImporter::new("Comunidades.xlsx").import_communities()?;
//! let beneficiaries = ExcelImporter::new("Beneficiarios.xlsx").import_beneficiaries()?;
//!
//! let generator = Generator::new(AppConfig::default())?;
//! let request = GenerationRequest::new("Aldea X", "planilla");
//! let plan = generator.plan(&communities, Some(&beneficiaries), &request)?;
//!
//! println!("Code: {}", plan.labels.composite_code);
//! println!("Pages: {}", plan.pages.len());
//! # Ok::<(), planillas::error::PlanillaError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod generator;
pub mod pdf;
pub mod types;
pub mod variants;

// Re-export commonly used types
pub use error::{PlanillaError, PlanillaResult};
pub use types::{BeneficiaryRecord, CommunityRecord, Page, ResolvedBeneficiary, Slot, PAGE_SIZE};
