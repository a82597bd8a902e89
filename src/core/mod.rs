//! Roster join and pagination engine

pub mod matcher;
pub mod pages;
pub mod plan;

pub use matcher::{
    community_index, find_community, match_beneficiaries, normalize_key, selectable_communities,
    CommunityIndex,
};
pub use pages::{collapse_whitespace, composite_code, paginate, resolve_all, resolve_name};
pub use plan::{build_plan, FormLabels, FormPlan, GenerationRequest, PlanContext};
