//! API request handlers
//!
//! Spreadsheet work runs on the blocking pool; every response is wrapped in
//! [`ApiResponse`] with a request id.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{community_index, selectable_communities, GenerationRequest};
use crate::error::{PlanillaError, PlanillaResult};
use crate::excel::ExcelImporter;
use crate::generator::{GenerationOutcome, Generator};
use crate::pdf::OfficeConverter;
use crate::types::{Page, ResolvedBeneficiary};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Run spreadsheet I/O off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T, String>
where
    F: FnOnce() -> PlanillaResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("worker failed: {}", e)),
    }
}

fn respond<T: Serialize>(result: Result<T, String>) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(message) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))),
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Planillas API Server".to_string(),
        version: state.version.clone(),
        description: "Roster matching and form generation".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint("/api/v1/variants", "GET", "List form variants"),
            endpoint("/api/v1/communities", "POST", "List communities of a roster"),
            endpoint("/api/v1/roster", "POST", "Match and paginate one community"),
            endpoint("/api/v1/generate", "POST", "Generate a form (xlsx, optional pdf)"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["communities", "roster", "generate", "pdf"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }))
}

#[derive(Serialize)]
pub struct VariantInfo {
    pub id: String,
    pub title: String,
    pub sheet: String,
    pub roster: bool,
}

/// GET /api/v1/variants - Form variants
pub async fn variants(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let result = state
        .config
        .catalog()
        .map(|catalog| {
            catalog
                .iter()
                .map(|v| VariantInfo {
                    id: v.id.clone(),
                    title: v.title.clone(),
                    sheet: v.sheet.clone(),
                    roster: v.is_roster(),
                })
                .collect::<Vec<_>>()
        })
        .map_err(|e| e.to_string());
    respond(result)
}

/// Communities request
#[derive(Deserialize)]
pub struct CommunitiesRequest {
    pub file_path: String,
}

#[derive(Serialize)]
pub struct CommunityInfo {
    pub index: usize,
    pub name: String,
}

/// POST /api/v1/communities - Selectable communities
pub async fn communities(Json(req): Json<CommunitiesRequest>) -> impl IntoResponse {
    let path = PathBuf::from(req.file_path);
    let result = blocking(move || {
        let table = ExcelImporter::new(&path).import_communities()?;
        Ok(selectable_communities(&table.records)
            .into_iter()
            .map(|name| CommunityInfo {
                index: community_index(&table.records, &name).position,
                name,
            })
            .collect::<Vec<_>>())
    })
    .await;
    respond(result)
}

/// Roster request
#[derive(Deserialize)]
pub struct RosterRequest {
    pub communities_path: String,
    pub beneficiaries_path: String,
    pub community: String,
    #[serde(default = "default_variant")]
    pub variant: String,
}

fn default_variant() -> String {
    "planilla".to_string()
}

#[derive(Serialize)]
pub struct RosterResponse {
    pub community: String,
    pub community_index: usize,
    pub composite_code: String,
    pub beneficiaries: Vec<ResolvedBeneficiary>,
    pub pages: Vec<Page>,
}

/// POST /api/v1/roster - Matched beneficiaries and pages
pub async fn roster(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RosterRequest>,
) -> impl IntoResponse {
    let config = state.config.clone();
    let result = blocking(move || {
        let generator = Generator::new(config)?;
        let communities = ExcelImporter::new(&req.communities_path).import_communities()?;
        let beneficiaries = ExcelImporter::new(&req.beneficiaries_path).import_beneficiaries()?;
        let request = GenerationRequest::new(req.community, req.variant);
        let plan = generator.plan(&communities, Some(&beneficiaries), &request)?;
        Ok(RosterResponse {
            community: plan.labels.community,
            community_index: plan.community_index.position,
            composite_code: plan.labels.composite_code,
            beneficiaries: plan.beneficiaries,
            pages: plan.pages,
        })
    })
    .await;
    respond(result)
}

/// Generate request
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub communities_path: String,
    #[serde(default)]
    pub beneficiaries_path: Option<String>,
    /// Required unless `all` is set
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub pdf: bool,
}

#[derive(Serialize, Default)]
pub struct GenerateResponse {
    pub outcomes: Vec<GenerationOutcome>,
    pub failures: Vec<(String, String)>,
}

/// POST /api/v1/generate - Generate forms
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> impl IntoResponse {
    let config = state.config.clone();
    let result = blocking(move || {
        if req.zip && !req.all {
            return Err(PlanillaError::Validation(
                "zip packaging requires all".to_string(),
            ));
        }
        let office_program = config.office_program.clone();
        let mut generator = Generator::new(config)?;
        if req.pdf {
            generator = generator.with_pdf(Box::new(OfficeConverter::new(office_program)));
        }
        let communities = ExcelImporter::new(&req.communities_path).import_communities()?;
        let beneficiaries = match &req.beneficiaries_path {
            Some(path) => Some(ExcelImporter::new(path).import_beneficiaries()?),
            None => None,
        };

        if req.all {
            let report =
                generator.generate_all(&communities, beneficiaries.as_ref(), &req.variant)?;
            let archive = if req.zip {
                Some(report.package(&generator.config().output_root)?)
            } else {
                None
            };
            return Ok(GenerateResponse {
                outcomes: report.outcomes,
                failures: report.failures,
                archive,
            });
        }

        let community = req.community.unwrap_or_default();
        let request = GenerationRequest::new(community, req.variant);
        let outcome = generator.generate(&communities, beneficiaries.as_ref(), &request)?;
        Ok(GenerateResponse {
            outcomes: vec![outcome],
            ..Default::default()
        })
    })
    .await;
    respond(result)
}
