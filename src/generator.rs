//! Form generation: plan → stamped workbook → optional PDF

use crate::config::{sanitize_path_component, AppConfig};
use crate::core::{build_plan, selectable_communities, FormPlan, GenerationRequest};
use crate::error::{PlanillaError, PlanillaResult};
use crate::excel::TemplateStamper;
use crate::pdf::PdfConverter;
use crate::types::{BeneficiaryTable, CommunityTable};
use crate::variants::VariantCatalog;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Archive written by [`BatchReport::package`].
pub const ARCHIVE_NAME: &str = "planillas_comunidades.zip";

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedForm {
    pub variant: String,
    pub community: String,
    pub composite_code: String,
    pub xlsx: PathBuf,
    pub pdf: Option<PathBuf>,
    pub sheets: Vec<String>,
    pub pages: usize,
    pub beneficiaries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Generated(GeneratedForm),
    /// Roster form requested for a community with no beneficiaries.
    NothingToGenerate { community: String, variant: String },
}

/// Result of generating one variant for every community.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<GenerationOutcome>,
    /// Community name and error message for each failed community.
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    pub fn generated(&self) -> impl Iterator<Item = &GeneratedForm> {
        self.outcomes.iter().filter_map(|o| match o {
            GenerationOutcome::Generated(form) => Some(form),
            GenerationOutcome::NothingToGenerate { .. } => None,
        })
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, GenerationOutcome::NothingToGenerate { .. }))
            .count()
    }

    /// Every generated workbook and PDF, in batch order.
    pub fn documents(&self) -> impl Iterator<Item = &Path> {
        self.generated()
            .flat_map(|form| std::iter::once(form.xlsx.as_path()).chain(form.pdf.as_deref()))
    }

    /// Pack every generated document into `{output_dir}/planillas_comunidades.zip`.
    ///
    /// Entries are stored flat under their file names; a repeated name keeps
    /// the first document.
    pub fn package(&self, output_dir: &Path) -> PlanillaResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let archive = output_dir.join(ARCHIVE_NAME);
        let mut zip = ZipWriter::new(File::create(&archive)?);
        let options = SimpleFileOptions::default();

        let mut seen = BTreeSet::new();
        for document in self.documents() {
            let Some(name) = document.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !seen.insert(name.clone()) {
                warn!(entry = %name, "duplicate archive entry skipped");
                continue;
            }
            zip.start_file(name.as_str(), options).map_err(archive_error)?;
            std::io::copy(&mut File::open(document)?, &mut zip)?;
        }
        zip.finish().map_err(archive_error)?;

        info!(file = %archive.display(), entries = seen.len(), "packaged batch");
        Ok(archive)
    }
}

fn archive_error(e: zip::result::ZipError) -> PlanillaError {
    PlanillaError::Export(format!("Failed to write archive: {}", e))
}

pub struct Generator {
    config: AppConfig,
    catalog: VariantCatalog,
    pdf: Option<Box<dyn PdfConverter + Send + Sync>>,
}

impl Generator {
    pub fn new(config: AppConfig) -> PlanillaResult<Self> {
        let catalog = config.catalog()?;
        Ok(Self {
            config,
            catalog,
            pdf: None,
        })
    }

    /// Also export every generated workbook to PDF.
    pub fn with_pdf(mut self, converter: Box<dyn PdfConverter + Send + Sync>) -> Self {
        self.pdf = Some(converter);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    pub fn plan(
        &self,
        communities: &CommunityTable,
        beneficiaries: Option<&BeneficiaryTable>,
        request: &GenerationRequest,
    ) -> PlanillaResult<FormPlan> {
        let variant = self.catalog.get(&request.variant)?;
        build_plan(
            communities,
            beneficiaries,
            request,
            variant,
            &self.config.plan_context(),
        )
    }

    /// File name from the variant's pattern.
    pub fn file_name(&self, plan: &FormPlan) -> String {
        let labels = &plan.labels;
        let name = plan
            .variant
            .file_name
            .replace("{index}", &labels.community_index.to_string())
            .replace("{department}", labels.department.trim())
            .replace("{municipality}", labels.municipality.trim())
            .replace("{community}", labels.community.trim())
            .replace("{code}", &labels.composite_code)
            .replace("{office_code}", &labels.office_code);
        sanitize_path_component(&name)
    }

    pub fn output_path(&self, plan: &FormPlan) -> PathBuf {
        self.config
            .output_dir(&plan.labels.department)
            .join(self.file_name(plan))
    }

    pub fn generate(
        &self,
        communities: &CommunityTable,
        beneficiaries: Option<&BeneficiaryTable>,
        request: &GenerationRequest,
    ) -> PlanillaResult<GenerationOutcome> {
        let plan = self.plan(communities, beneficiaries, request)?;
        if plan.is_empty_roster() {
            info!(
                community = %plan.labels.community,
                variant = %plan.variant.id,
                "no beneficiaries, nothing to generate"
            );
            return Ok(GenerationOutcome::NothingToGenerate {
                community: plan.labels.community,
                variant: plan.variant.id,
            });
        }

        let xlsx = self.output_path(&plan);
        let out_dir = self.config.output_dir(&plan.labels.department);
        std::fs::create_dir_all(&out_dir)?;

        let stamper = TemplateStamper::new(&self.config.template, self.config.logo.clone());
        let sheets = stamper.stamp(&plan, &xlsx)?;

        let pdf = match &self.pdf {
            Some(converter) => Some(converter.convert(&xlsx, &out_dir)?),
            None => None,
        };

        info!(
            file = %xlsx.display(),
            pages = plan.pages.len(),
            "generated form"
        );

        Ok(GenerationOutcome::Generated(GeneratedForm {
            variant: plan.variant.id.clone(),
            community: plan.labels.community.clone(),
            composite_code: plan.labels.composite_code.clone(),
            xlsx,
            pdf,
            sheets,
            pages: plan.pages.len(),
            beneficiaries: plan.beneficiary_count(),
        }))
    }

    /// Generate `variant` for every selectable community. A failing
    /// community is recorded and the batch continues.
    pub fn generate_all(
        &self,
        communities: &CommunityTable,
        beneficiaries: Option<&BeneficiaryTable>,
        variant: &str,
    ) -> PlanillaResult<BatchReport> {
        // Unknown variant fails the whole batch
        self.catalog.get(variant)?;

        let mut report = BatchReport::default();
        for community in selectable_communities(&communities.records) {
            let request = GenerationRequest::new(community.clone(), variant);
            match self.generate(communities, beneficiaries, &request) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    warn!(community = %community, error = %e, "generation failed");
                    report.failures.push((community, e.to_string()));
                }
            }
        }
        Ok(report)
    }
}
