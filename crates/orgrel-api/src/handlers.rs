use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use orgrel_core::{parse_csv, validate_rows, ImportCommitter};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn api_err(error: impl Into<ApiError>) -> HandlerError {
    error.into().into()
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List the members of a company
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/members",
    params(
        ("company_id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 200, description = "Company members", body = MemberList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<MemberList>, HandlerError> {
    debug!("Listing members of company {}", company_id);

    let graph = state.store.load_graph(company_id).await.map_err(api_err)?;
    let members: Vec<Member> = graph.members().into_iter().map(Member::from).collect();
    let total = members.len();

    Ok(Json(MemberList { members, total }))
}

/// Get the manager chain above a member
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/members/{member_id}/chain",
    params(
        ("company_id" = Uuid, Path, description = "Company ID"),
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Managers above the member, nearest first", body = ManagerChain),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Circular manager reference in stored data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn get_manager_chain(
    State(state): State<Arc<AppState>>,
    Path((company_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ManagerChain>, HandlerError> {
    debug!("Getting manager chain of {} in {}", member_id, company_id);

    let graph = state.store.load_graph(company_id).await.map_err(api_err)?;
    let chain = graph.manager_chain(member_id).map_err(api_err)?;

    let chain = chain
        .iter()
        .filter_map(|link| {
            graph.member(link.manager_id).map(|manager| ChainEntry {
                manager: Member::from(manager),
                distance: link.distance,
            })
        })
        .collect();

    Ok(Json(ManagerChain { member_id, chain }))
}

/// List the direct reports of a member
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/members/{member_id}/reports",
    params(
        ("company_id" = Uuid, Path, description = "Company ID"),
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Direct reports", body = MemberList),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn list_direct_reports(
    State(state): State<Arc<AppState>>,
    Path((company_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MemberList>, HandlerError> {
    debug!("Listing direct reports of {} in {}", member_id, company_id);

    let graph = state.store.load_graph(company_id).await.map_err(api_err)?;
    let members: Vec<Member> = graph
        .direct_reports(member_id)
        .map_err(api_err)?
        .into_iter()
        .map(Member::from)
        .collect();
    let total = members.len();

    Ok(Json(MemberList { members, total }))
}

/// Classify the relationship between two members
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/relationship",
    params(
        ("company_id" = Uuid, Path, description = "Company ID"),
        RelationshipQuery
    ),
    responses(
        (status = 200, description = "Relationship of `from` to `to`", body = Relationship),
        (status = 400, description = "Both IDs name the same member", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Circular manager reference in stored data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "relationships"
)]
pub async fn get_relationship(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<RelationshipQuery>,
) -> Result<Json<Relationship>, HandlerError> {
    debug!(
        "Classifying {} -> {} in company {}",
        query.from, query.to, company_id
    );

    let graph = state.store.load_graph(company_id).await.map_err(api_err)?;
    let result = graph.classify(query.from, query.to).map_err(api_err)?;

    Ok(Json(result.into()))
}

/// Classify the relationship between two members looked up by email
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/relationship/by-email",
    params(
        ("company_id" = Uuid, Path, description = "Company ID"),
        RelationshipByEmailQuery
    ),
    responses(
        (status = 200, description = "Relationship of `from` to `to`", body = Relationship),
        (status = 400, description = "Both emails name the same member", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Circular manager reference in stored data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "relationships"
)]
pub async fn get_relationship_by_email(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<RelationshipByEmailQuery>,
) -> Result<Json<Relationship>, HandlerError> {
    debug!(
        "Classifying {} -> {} in company {}",
        query.from, query.to, company_id
    );

    let graph = state.store.load_graph(company_id).await.map_err(api_err)?;
    let result = graph
        .classify_by_email(&query.from, &query.to)
        .map_err(api_err)?;

    Ok(Json(result.into()))
}

/// Validate an org-chart CSV without writing anything
#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/org-chart/validate",
    params(
        ("company_id" = Uuid, Path, description = "Company ID")
    ),
    request_body(content = String, content_type = "text/csv", description = "Org-chart CSV with email and managerEmail columns"),
    responses(
        (status = 200, description = "Validation report", body = ValidationReport),
        (status = 400, description = "CSV could not be parsed", body = ErrorResponse)
    ),
    tag = "org-chart"
)]
pub async fn validate_org_chart(
    Path(company_id): Path<Uuid>,
    body: String,
) -> Result<Json<ValidationReport>, HandlerError> {
    debug!("Validating org chart for company {}", company_id);

    let rows = parse_csv(&body).map_err(api_err)?;
    let errors: Vec<ImportIssue> = validate_rows(&rows).into_iter().map(Into::into).collect();

    Ok(Json(ValidationReport {
        valid: errors.is_empty(),
        errors,
    }))
}

/// Validate and commit an org-chart CSV as the company's reporting structure
#[utoipa::path(
    post,
    path = "/api/companies/{company_id}/org-chart/import",
    params(
        ("company_id" = Uuid, Path, description = "Company ID")
    ),
    request_body(content = String, content_type = "text/csv", description = "Org-chart CSV with email and managerEmail columns"),
    responses(
        (status = 200, description = "Import committed, possibly with per-row errors", body = ImportReport),
        (status = 400, description = "CSV could not be parsed", body = ErrorResponse),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 422, description = "Validation failed, nothing was written", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "org-chart"
)]
pub async fn import_org_chart(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<Uuid>,
    body: String,
) -> Result<Json<ImportReport>, HandlerError> {
    info!("Importing org chart for company {}", company_id);

    let committer = ImportCommitter::new(state.store.clone(), state.import_options.clone());
    let summary = committer
        .import_csv(company_id, &body)
        .await
        .map_err(api_err)?;

    Ok(Json(summary.into()))
}
