//! Roster matching: join the selected community against the beneficiary table

use crate::types::{BeneficiaryRecord, CommunityRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// Normalize a join key: trim, then a locale-invariant lowercase fold.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// One-based position of the selected community, used only as a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommunityIndex {
    pub position: usize,
    /// False when the selection matched no community and `position` fell back to 1.
    pub resolved: bool,
}

/// Every beneficiary whose reference key matches the selected community,
/// in original order. Duplicates are preserved and an empty result is valid.
pub fn match_beneficiaries<'a>(
    communities: &[CommunityRecord],
    beneficiaries: &'a [BeneficiaryRecord],
    selected: &str,
) -> Vec<&'a BeneficiaryRecord> {
    let key = normalize_key(selected);
    let matched: Vec<&BeneficiaryRecord> = beneficiaries
        .iter()
        .filter(|b| normalize_key(&b.reference_key) == key)
        .collect();

    debug!(
        community = %selected.trim(),
        communities = communities.len(),
        matched = matched.len(),
        "matched beneficiaries"
    );
    matched
}

/// Locate the selected community. Recomputed on every call since the table
/// may have been edited between generations.
pub fn community_index(communities: &[CommunityRecord], selected: &str) -> CommunityIndex {
    let key = normalize_key(selected);
    match communities
        .iter()
        .position(|c| normalize_key(&c.establishment_name) == key)
    {
        Some(idx) => CommunityIndex {
            position: idx + 1,
            resolved: true,
        },
        None => {
            warn!(
                community = %selected.trim(),
                "community not found in table, numbering it as 1"
            );
            CommunityIndex {
                position: 1,
                resolved: false,
            }
        }
    }
}

/// The community record for a selection, first match wins.
pub fn find_community<'a>(
    communities: &'a [CommunityRecord],
    selected: &str,
) -> Option<&'a CommunityRecord> {
    let key = normalize_key(selected);
    communities
        .iter()
        .find(|c| normalize_key(&c.establishment_name) == key)
}

/// Names offered for selection: trimmed, non-empty, first occurrence only.
pub fn selectable_communities(communities: &[CommunityRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for community in communities {
        let name = community.establishment_name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn communities(names: &[&str]) -> Vec<CommunityRecord> {
        names.iter().map(|n| CommunityRecord::new(*n)).collect()
    }

    fn beneficiary(reference: &str, cui: &str) -> BeneficiaryRecord {
        BeneficiaryRecord::new(reference).with_field("CUI", cui)
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Aldea X \t"), "aldea x");
        assert_eq!(normalize_key("SAN JOSÉ"), "san josé");
    }

    #[test]
    fn test_match_is_stable_and_keeps_duplicates() {
        let table = communities(&["Aldea X"]);
        let rows = vec![
            beneficiary("aldea x", "1"),
            beneficiary("Aldea Y", "2"),
            beneficiary(" ALDEA X ", "3"),
            beneficiary("aldea x", "1"),
        ];
        let matched = match_beneficiaries(&table, &rows, "Aldea X");
        let ids: Vec<&str> = matched.iter().filter_map(|b| b.field("CUI")).collect();
        assert_eq!(ids, vec!["1", "3", "1"]);
    }

    #[test]
    fn test_match_empty_result_is_not_an_error() {
        let table = communities(&["Aldea X"]);
        let rows = vec![beneficiary("aldea y", "1")];
        assert!(match_beneficiaries(&table, &rows, "Aldea X").is_empty());
    }

    #[test]
    fn test_community_index_first_match() {
        let table = communities(&["Aldea A", " aldea b ", "Aldea B"]);
        let idx = community_index(&table, "ALDEA B");
        assert_eq!(idx.position, 2);
        assert!(idx.resolved);
    }

    #[test]
    fn test_community_index_falls_back_to_one() {
        let table = communities(&["Aldea A"]);
        let idx = community_index(&table, "Nowhere");
        assert_eq!(
            idx,
            CommunityIndex {
                position: 1,
                resolved: false
            }
        );
    }

    #[test]
    fn test_selectable_communities_skips_blank_and_duplicates() {
        let table = communities(&["Aldea A", "  ", "Aldea B", "Aldea A", ""]);
        assert_eq!(selectable_communities(&table), vec!["Aldea A", "Aldea B"]);
    }

    #[test]
    fn test_find_community() {
        let table = communities(&["Aldea A", "Aldea B"]);
        assert_eq!(
            find_community(&table, " aldea b").map(|c| c.establishment_name.as_str()),
            Some("Aldea B")
        );
        assert!(find_community(&table, "Aldea C").is_none());
    }
}
