//! Roster join and pagination engine tests

use planillas::core::{
    collapse_whitespace, community_index, composite_code, match_beneficiaries, paginate,
    resolve_all, resolve_name, selectable_communities,
};
use planillas::types::{
    columns, BeneficiaryRecord, BeneficiaryTable, CommunityRecord, NameColumns,
    ResolvedBeneficiary, Slot,
};
use planillas::{PlanillaError, PAGE_SIZE};
use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;

fn people(n: usize) -> Vec<ResolvedBeneficiary> {
    (0..n)
        .map(|i| ResolvedBeneficiary {
            full_name: format!("Persona {}", i),
            identifier: i.to_string(),
        })
        .collect()
}

fn name_table(records: Vec<BeneficiaryRecord>) -> BeneficiaryTable {
    let mut headers = vec![columns::REFERENCE.to_string()];
    headers.extend(
        NameColumns::default()
            .required()
            .into_iter()
            .map(String::from),
    );
    BeneficiaryTable::from_records(headers, records)
}

fn aldea_x_scenario() -> (Vec<CommunityRecord>, Vec<BeneficiaryRecord>) {
    let communities = vec![
        CommunityRecord::new("Aldea W"),
        CommunityRecord::new("Aldea X"),
    ];
    let mut beneficiaries = Vec::new();
    for i in 0..12 {
        let key = if i % 3 == 0 { " aldea x" } else { "ALDEA X  " };
        beneficiaries.push(
            BeneficiaryRecord::new(key)
                .with_field(columns::FIRST_NAME, format!("N{}", i))
                .with_field(columns::IDENTIFIER, format!("{}", 100 + i)),
        );
        if i == 4 {
            beneficiaries.push(BeneficiaryRecord::new("Aldea Y"));
        }
    }
    (communities, beneficiaries)
}

// ═══════════════════════════════════════════════════════════════════════════
// PAGINATION PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_page_count_is_ceiling() {
    for n in [0usize, 1, 9, 10, 11, 20, 21, 99, 100] {
        let pages = paginate(&people(n), PAGE_SIZE);
        assert_eq!(pages.len(), n.div_ceil(10), "n = {}", n);
    }
}

#[test]
fn test_pagination_is_lossless_and_ordered() {
    let source = people(23);
    let pages = paginate(&source, PAGE_SIZE);

    let flattened: Vec<ResolvedBeneficiary> = pages
        .iter()
        .flat_map(|p| p.beneficiaries().cloned())
        .collect();
    assert_eq!(flattened, source);

    for page in &pages {
        assert_eq!(page.slots.len(), 10);
        for (i, slot) in page.slots.iter().enumerate() {
            let source_index = page.index * 10 + i;
            match slot {
                Slot::Filled(b) => assert_eq!(b, &source[source_index]),
                Slot::Empty => assert!(source_index >= source.len()),
            }
        }
    }
}

#[test]
fn test_only_last_page_has_placeholders() {
    let pages = paginate(&people(23), PAGE_SIZE);
    assert_eq!(pages[0].placeholder_count(), 0);
    assert_eq!(pages[1].placeholder_count(), 0);
    assert_eq!(pages[2].placeholder_count(), 7);
    assert_eq!(pages[2].slots[3].full_name(), "");
    assert_eq!(pages[2].slots[3].identifier(), "");
}

#[test]
fn test_custom_page_size() {
    let size = NonZeroUsize::new(4).unwrap();
    let pages = paginate(&people(5), size);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].slots.len(), 4);
    assert_eq!(pages[1].placeholder_count(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// NAME RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_collapse_whitespace_is_idempotent() {
    for input in ["  Ana   María \t López ", "", "   ", "Ana", "a\u{a0}\u{a0}b"] {
        let once = collapse_whitespace(input);
        assert_eq!(collapse_whitespace(&once), once);
        assert!(!once.contains("  "));
        assert_eq!(once.trim(), once);
    }
}

#[test]
fn test_empty_middle_fragments_collapse() {
    let record = BeneficiaryRecord::new("x")
        .with_field(columns::FIRST_NAME, "Ana")
        .with_field(columns::SECOND_NAME, "")
        .with_field(columns::THIRD_NAME, "  ")
        .with_field(columns::FIRST_SURNAME, "Tum")
        .with_field(columns::SECOND_SURNAME, "Ajú")
        .with_field(columns::MARRIED_SURNAME, "");
    let names = NameColumns::default();
    assert_eq!(resolve_name(&record, &names.fragments), "Ana Tum Ajú");
}

#[test]
fn test_all_empty_fragments_resolve_to_empty() {
    let record = BeneficiaryRecord::new("x").with_field(columns::IDENTIFIER, "1");
    let table = name_table(vec![record]);
    let matched: Vec<&BeneficiaryRecord> = table.records.iter().collect();
    let resolved = resolve_all(&table, &matched, &NameColumns::default()).unwrap();
    assert_eq!(resolved[0].full_name, "");
    assert_eq!(resolved[0].identifier, "1");
}

#[test]
fn test_missing_second_surname_column() {
    let mut table = name_table(vec![BeneficiaryRecord::new("x")]);
    table.columns.retain(|c| c != columns::SECOND_SURNAME);
    let matched: Vec<&BeneficiaryRecord> = table.records.iter().collect();

    let err = resolve_all(&table, &matched, &NameColumns::default()).unwrap_err();
    assert!(matches!(err, PlanillaError::MissingColumns(_)));
    assert_eq!(err.missing_columns(), [columns::SECOND_SURNAME]);
    assert!(err.to_string().contains("SEGUNDO APELLIDO"));
}

#[test]
fn test_every_missing_column_is_named() {
    let table = BeneficiaryTable::from_records(
        vec![columns::REFERENCE.to_string(), columns::FIRST_NAME.to_string()],
        Vec::new(),
    );
    let err = resolve_all(&table, &[], &NameColumns::default()).unwrap_err();
    assert_eq!(err.missing_columns().len(), 6);
}

// ═══════════════════════════════════════════════════════════════════════════
// MATCHING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_matching_ignores_case_and_padding() {
    let (communities, beneficiaries) = aldea_x_scenario();
    for selection in ["Aldea X", " aldea x ", "ALDEA X"] {
        let matched = match_beneficiaries(&communities, &beneficiaries, selection);
        assert_eq!(matched.len(), 12, "selection {:?}", selection);
    }
}

#[test]
fn test_matching_preserves_order_and_duplicates() {
    let communities = vec![CommunityRecord::new("A")];
    let beneficiaries = vec![
        BeneficiaryRecord::new("a").with_field(columns::IDENTIFIER, "1"),
        BeneficiaryRecord::new("b").with_field(columns::IDENTIFIER, "2"),
        BeneficiaryRecord::new("A").with_field(columns::IDENTIFIER, "3"),
        BeneficiaryRecord::new("a").with_field(columns::IDENTIFIER, "1"),
    ];
    let ids: Vec<&str> = match_beneficiaries(&communities, &beneficiaries, "A")
        .iter()
        .filter_map(|b| b.field(columns::IDENTIFIER))
        .collect();
    assert_eq!(ids, vec!["1", "3", "1"]);
}

#[test]
fn test_no_match_is_empty_not_error() {
    let (communities, beneficiaries) = aldea_x_scenario();
    assert!(match_beneficiaries(&communities, &beneficiaries, "Aldea W").is_empty());
}

#[test]
fn test_community_index_and_fallback() {
    let (communities, _) = aldea_x_scenario();
    let found = community_index(&communities, "aldea x");
    assert_eq!(found.position, 2);
    assert!(found.resolved);

    let missing = community_index(&communities, "Aldea Z");
    assert_eq!(missing.position, 1);
    assert!(!missing.resolved);
}

#[test]
fn test_selectable_communities_skip_blank_names() {
    let communities = vec![
        CommunityRecord::new(" Aldea W "),
        CommunityRecord::new("   "),
        CommunityRecord::new("Aldea X"),
        CommunityRecord::new("Aldea W"),
    ];
    assert_eq!(
        selectable_communities(&communities),
        vec!["Aldea W".to_string(), "Aldea X".to_string()]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// END TO END: "ALDEA X"
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_aldea_x_scenario() {
    let (communities, records) = aldea_x_scenario();
    assert_eq!(records.len(), 13);
    let table = name_table(records);

    let matched = match_beneficiaries(&communities, &table.records, "Aldea X");
    assert_eq!(matched.len(), 12);

    let resolved = resolve_all(&table, &matched, &NameColumns::default()).unwrap();
    let pages = paginate(&resolved, PAGE_SIZE);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].placeholder_count(), 0);
    assert_eq!(pages[1].beneficiaries().count(), 2);
    assert_eq!(pages[1].placeholder_count(), 8);
    assert_eq!(pages[1].slots[1].full_name(), "N11");

    let index = community_index(&communities, "Aldea X");
    assert_eq!(
        composite_code("DAPA-001-2025", index.position, resolved.len()),
        "DAPA-001-2025_CD2_P12"
    );
}
