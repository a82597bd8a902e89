//! Generation plans: everything a stamper needs for one form

use crate::core::matcher::{community_index, find_community, match_beneficiaries, CommunityIndex};
use crate::core::pages::{composite_code, paginate, resolve_all};
use crate::error::{PlanillaError, PlanillaResult};
use crate::types::{BeneficiaryTable, CommunityTable, NameColumns, Page, ResolvedBeneficiary};
use crate::variants::{Field, FormVariant};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the user asked for: one community, one form variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub community: String,
    pub variant: String,
}

impl GenerationRequest {
    pub fn new(community: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            variant: variant.into(),
        }
    }
}

/// Labels that do not come from the rosters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanContext {
    pub office_code: String,
    pub unit_name: String,
    pub unit_display_name: String,
    pub name_columns: NameColumns,
    pub date: String,
}

/// Scalar values stamped into header cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormLabels {
    pub office_code: String,
    pub composite_code: String,
    pub community_index: usize,
    pub community: String,
    pub unit_name: String,
    pub unit_display_name: String,
    pub department: String,
    pub municipality: String,
    pub technician_name: String,
    pub technician_id: String,
    pub supply_label: String,
    pub school_code: String,
    pub training_registry: String,
    pub date: String,
}

impl FormLabels {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::UnitName => &self.unit_name,
            Field::UnitDisplayName => &self.unit_display_name,
            Field::OfficeCode => &self.office_code,
            Field::CompositeCode => &self.composite_code,
            Field::Community => &self.community,
            Field::Department => &self.department,
            Field::Municipality => &self.municipality,
            Field::TechnicianName => &self.technician_name,
            Field::TechnicianId => &self.technician_id,
            Field::SupplyLabel => &self.supply_label,
            Field::SchoolCode => &self.school_code,
            Field::TrainingRegistry => &self.training_registry,
            Field::Date => &self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPlan {
    pub variant: FormVariant,
    pub labels: FormLabels,
    pub community_index: CommunityIndex,
    pub beneficiaries: Vec<ResolvedBeneficiary>,
    pub pages: Vec<Page>,
}

impl FormPlan {
    pub fn beneficiary_count(&self) -> usize {
        self.beneficiaries.len()
    }

    /// A roster form with nobody on it: there is no document to produce.
    pub fn is_empty_roster(&self) -> bool {
        self.variant.is_roster() && self.pages.is_empty()
    }
}

/// Match, resolve and paginate for one request.
///
/// Additional (beneficiary-free) variants accept a missing beneficiary table;
/// the composite code then counts zero beneficiaries.
pub fn build_plan(
    communities: &CommunityTable,
    beneficiaries: Option<&BeneficiaryTable>,
    request: &GenerationRequest,
    variant: &FormVariant,
    context: &PlanContext,
) -> PlanillaResult<FormPlan> {
    let index = community_index(&communities.records, &request.community);
    let community = find_community(&communities.records, &request.community)
        .ok_or_else(|| PlanillaError::UnresolvedCommunity(request.community.trim().to_string()))?;
    communities.require(&variant.required_columns())?;

    let (resolved, matched_count) = match beneficiaries {
        Some(table) => {
            let matched =
                match_beneficiaries(&communities.records, &table.records, &request.community);
            let count = matched.len();
            let resolved = if variant.is_roster() {
                resolve_all(table, &matched, &context.name_columns)?
            } else {
                Vec::new()
            };
            (resolved, count)
        }
        None if variant.is_roster() => {
            return Err(PlanillaError::Validation(format!(
                "form '{}' needs a beneficiary table",
                variant.id
            )))
        }
        None => (Vec::new(), 0),
    };

    let pages = if variant.is_roster() {
        paginate(&resolved, variant.page_size())
    } else {
        Vec::new()
    };

    let labels = FormLabels {
        office_code: context.office_code.clone(),
        composite_code: composite_code(&context.office_code, index.position, matched_count),
        community_index: index.position,
        community: community.establishment_name.clone(),
        unit_name: context.unit_name.clone(),
        unit_display_name: context.unit_display_name.clone(),
        department: community.department.clone(),
        municipality: community.municipality.clone(),
        technician_name: community.technician_name.clone(),
        technician_id: community.technician_id.clone(),
        supply_label: community.supply_label.clone(),
        school_code: community.school_code.clone().unwrap_or_default(),
        training_registry: community.training_registry_label.clone().unwrap_or_default(),
        date: context.date.clone(),
    };

    debug!(
        variant = %variant.id,
        community = %labels.community,
        beneficiaries = resolved.len(),
        pages = pages.len(),
        code = %labels.composite_code,
        "built form plan"
    );

    Ok(FormPlan {
        variant: variant.clone(),
        labels,
        community_index: index,
        beneficiaries: resolved,
        pages,
    })
}
