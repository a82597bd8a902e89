//! Name resolution and pagination of matched beneficiaries

use crate::error::{PlanillaError, PlanillaResult};
use crate::types::{BeneficiaryRecord, BeneficiaryTable, NameColumns, Page, ResolvedBeneficiary, Slot};
use std::num::NonZeroUsize;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full display name from the configured fragments.
///
/// Fragments are concatenated with one space between every pair, blanks
/// included, and the result is then collapsed. Missing fragments count as
/// empty strings.
pub fn resolve_name(record: &BeneficiaryRecord, fragment_order: &[String]) -> String {
    let joined = fragment_order
        .iter()
        .map(|column| record.field(column).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

/// Resolve a batch of matched rows. Every fragment column and the identifier
/// column must be present in the table or nothing is produced.
pub fn resolve_all(
    table: &BeneficiaryTable,
    rows: &[&BeneficiaryRecord],
    name_columns: &NameColumns,
) -> PlanillaResult<Vec<ResolvedBeneficiary>> {
    let missing: Vec<String> = name_columns
        .required()
        .into_iter()
        .filter(|column| !table.has_column(column))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PlanillaError::MissingColumns(missing));
    }

    Ok(rows
        .iter()
        .map(|record| ResolvedBeneficiary {
            full_name: resolve_name(record, &name_columns.fragments),
            identifier: record
                .field(&name_columns.identifier)
                .unwrap_or("")
                .trim()
                .to_string(),
        })
        .collect())
}

/// Split into consecutive pages of `page_size`, padding the last one.
pub fn paginate(resolved: &[ResolvedBeneficiary], page_size: NonZeroUsize) -> Vec<Page> {
    let size = page_size.get();
    resolved
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| {
            let mut slots: Vec<Slot> = chunk.iter().cloned().map(Slot::Filled).collect();
            slots.resize(size, Slot::Empty);
            Page { index, slots }
        })
        .collect()
}

/// Display label `{office}_CD{index}_P{count}`; `count` is the pre-padding total.
pub fn composite_code(office_code: &str, community_index: usize, beneficiary_count: usize) -> String {
    format!("{}_CD{}_P{}", office_code, community_index, beneficiary_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{columns, PAGE_SIZE};
    use pretty_assertions::assert_eq;

    fn person(fragments: [&str; 6]) -> BeneficiaryRecord {
        let names = NameColumns::default();
        names
            .fragments
            .iter()
            .zip(fragments)
            .fold(BeneficiaryRecord::new("aldea x"), |record, (column, value)| {
                record.with_field(column, value)
            })
    }

    fn resolved(n: usize) -> Vec<ResolvedBeneficiary> {
        (0..n)
            .map(|i| ResolvedBeneficiary {
                full_name: format!("Persona {}", i),
                identifier: format!("{:013}", i),
            })
            .collect()
    }

    #[test]
    fn test_resolve_name_collapses_blank_fragments() {
        let names = NameColumns::default();
        let record = person(["Ana", "", "", "López", " ", "de  Pérez"]);
        assert_eq!(resolve_name(&record, &names.fragments), "Ana López de Pérez");
    }

    #[test]
    fn test_resolve_name_all_empty_is_empty() {
        let names = NameColumns::default();
        let record = person(["", "", "", "", "", ""]);
        assert_eq!(resolve_name(&record, &names.fragments), "");
    }

    #[test]
    fn test_resolve_name_missing_fields_are_empty() {
        let names = NameColumns::default();
        let record = BeneficiaryRecord::new("x").with_field(columns::FIRST_SURNAME, "Tzoc");
        assert_eq!(resolve_name(&record, &names.fragments), "Tzoc");
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let once = collapse_whitespace("  María \t del\n Carmen ");
        assert_eq!(once, "María del Carmen");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn test_paginate_empty_gives_no_pages() {
        assert!(paginate(&[], PAGE_SIZE).is_empty());
    }

    #[test]
    fn test_paginate_pads_last_page() {
        let pages = paginate(&resolved(12), PAGE_SIZE);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].placeholder_count(), 0);
        assert_eq!(pages[1].index, 1);
        assert_eq!(pages[1].slots.len(), 10);
        assert_eq!(pages[1].beneficiaries().count(), 2);
        assert_eq!(pages[1].placeholder_count(), 8);
        assert_eq!(pages[1].slots[1].full_name(), "Persona 11");
    }

    #[test]
    fn test_paginate_exact_multiple_has_no_placeholders() {
        let pages = paginate(&resolved(20), PAGE_SIZE);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.placeholder_count() == 0));
    }

    #[test]
    fn test_composite_code() {
        assert_eq!(composite_code("DAPA-001-2025", 3, 12), "DAPA-001-2025_CD3_P12");
    }
}
