//! Integration tests for the relationship and org-chart endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use orgrel_api::{models::*, ApiServer, ApiServerConfig};
use orgrel_core::{ImportOptions, MembershipState as CoreState, MembershipStore, NewMember};
use orgrel_db::{connect, migrate, SeaOrmMembershipStore};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method
use uuid::Uuid;

const ORG_CHART: &str = "email,managerEmail,name,title\n\
                         ceo@acme.com,,Cee,CEO\n\
                         vp@acme.com,ceo@acme.com,Vic,VP\n\
                         lead@acme.com,vp@acme.com,Lee,Lead\n\
                         dev@acme.com,lead@acme.com,Dee,Engineer\n\
                         ops@acme.com,vp@acme.com,Oz,Ops\n";

/// Helper to create a migrated in-memory store
async fn create_test_store() -> Arc<SeaOrmMembershipStore> {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    Arc::new(SeaOrmMembershipStore::new(db))
}

/// Helper to create a test router
fn create_test_router(store: Arc<SeaOrmMembershipStore>, options: ImportOptions) -> Router {
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
        enable_cors: true,
    };

    ApiServer::new(config, store, options).build_router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn get(uri: String) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn post_csv(uri: String, csv: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}

/// Create a company and import the standard org chart through the API
async fn seeded_app() -> (Router, Arc<SeaOrmMembershipStore>, Uuid) {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(store.clone(), ImportOptions::default());

    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            ORG_CHART,
        ),
    )
    .await;
    assert_eq!(
        status,
        StatusCode::OK,
        "import failed: {}",
        String::from_utf8_lossy(&body)
    );

    (app, store, company.id)
}

async fn member_id(store: &SeaOrmMembershipStore, company_id: Uuid, email: &str) -> Uuid {
    store
        .find_member_by_email(company_id, email)
        .await
        .unwrap()
        .expect("member should exist")
        .id
}

#[tokio::test]
async fn test_health_check() {
    let store = create_test_store().await;
    let app = create_test_router(store, ImportOptions::default());

    let (status, body) = send(&app, get("/api/health".to_string())).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_import_reports_counts() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(store.clone(), ImportOptions::default());

    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            ORG_CHART,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: ImportReport = serde_json::from_slice(&body).unwrap();
    assert_eq!(report.users_added, 5);
    assert_eq!(report.relationships_created, 4);
    assert!(report.errors.is_empty());

    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(raw.get("usersAdded").is_some());
    assert!(raw.get("relationshipsCreated").is_some());
}

#[tokio::test]
async fn test_list_members_sorted_by_email() {
    let (app, _store, company_id) = seeded_app().await;

    let (status, body) = send(&app, get(format!("/api/companies/{}/members", company_id))).await;

    assert_eq!(status, StatusCode::OK);
    let list: MemberList = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.total, 5);
    let emails: Vec<&str> = list.members.iter().map(|m| m.email.as_str()).collect();
    assert_eq!(
        emails,
        vec![
            "ceo@acme.com",
            "dev@acme.com",
            "lead@acme.com",
            "ops@acme.com",
            "vp@acme.com"
        ]
    );
    assert!(list
        .members
        .iter()
        .all(|m| m.membership_state == MembershipState::Invited));
}

#[tokio::test]
async fn test_relationship_by_id() {
    let (app, store, company_id) = seeded_app().await;
    let ceo = member_id(&store, company_id, "ceo@acme.com").await;
    let dev = member_id(&store, company_id, "dev@acme.com").await;

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/relationship?from={}&to={}",
            company_id, ceo, dev
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let relationship: Relationship = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        relationship.relationship_type,
        RelationshipType::SkipLevelManager
    );
    assert_eq!(relationship.distance, 3);
    assert_eq!(
        relationship.description,
        "Cee is Dee's skip-level manager (3 levels up)"
    );

    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw["type"], "skip-level-manager");
}

#[tokio::test]
async fn test_relationship_by_email() {
    let (app, _store, company_id) = seeded_app().await;

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/relationship/by-email?from=ops@acme.com&to=lead@acme.com",
            company_id
        )),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let relationship: Relationship = serde_json::from_slice(&body).unwrap();
    assert_eq!(relationship.relationship_type, RelationshipType::Peer);
    assert_eq!(relationship.distance, 0);
    assert_eq!(relationship.description, "Oz and Lee share the same manager");
}

#[tokio::test]
async fn test_relationship_with_self_is_rejected() {
    let (app, store, company_id) = seeded_app().await;
    let vp = member_id(&store, company_id, "vp@acme.com").await;

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/relationship?from={}&to={}",
            company_id, vp, vp
        )),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code.as_deref(), Some("SELF_RELATIONSHIP"));
}

#[tokio::test]
async fn test_relationship_unknown_member() {
    let (app, store, company_id) = seeded_app().await;
    let vp = member_id(&store, company_id, "vp@acme.com").await;

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/relationship?from={}&to={}",
            company_id,
            vp,
            Uuid::new_v4()
        )),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code.as_deref(), Some("MEMBER_NOT_FOUND"));
}

#[tokio::test]
async fn test_import_into_unknown_company() {
    let store = create_test_store().await;
    let app = create_test_router(store.clone(), ImportOptions::default());
    let company_id = Uuid::new_v4();

    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company_id),
            ORG_CHART,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code.as_deref(), Some("NOT_FOUND"));
    assert!(store.list_members(company_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_manager_chain_and_reports() {
    let (app, store, company_id) = seeded_app().await;
    let dev = member_id(&store, company_id, "dev@acme.com").await;
    let vp = member_id(&store, company_id, "vp@acme.com").await;

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/members/{}/chain",
            company_id, dev
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chain: ManagerChain = serde_json::from_slice(&body).unwrap();
    let chain: Vec<(&str, u32)> = chain
        .chain
        .iter()
        .map(|entry| (entry.manager.email.as_str(), entry.distance))
        .collect();
    assert_eq!(
        chain,
        vec![("lead@acme.com", 1), ("vp@acme.com", 2), ("ceo@acme.com", 3)]
    );

    let (status, body) = send(
        &app,
        get(format!(
            "/api/companies/{}/members/{}/reports",
            company_id, vp
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reports: MemberList = serde_json::from_slice(&body).unwrap();
    let emails: Vec<&str> = reports.members.iter().map(|m| m.email.as_str()).collect();
    assert_eq!(emails, vec!["lead@acme.com", "ops@acme.com"]);
}

#[tokio::test]
async fn test_validate_reports_errors_without_writing() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(store.clone(), ImportOptions::default());

    let csv = "email,managerEmail\n\
               a@acme.com,b@acme.com\n\
               b@acme.com,a@acme.com\n\
               not-an-email,a@acme.com\n";
    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/validate", company.id),
            csv,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: ValidationReport = serde_json::from_slice(&body).unwrap();
    assert!(!report.valid);
    assert!(report
        .errors
        .iter()
        .any(|e| e.error_type == ImportErrorType::InvalidEmail && e.row == 3));
    assert_eq!(
        report
            .errors
            .iter()
            .filter(|e| e.error_type == ImportErrorType::CircularReference)
            .count(),
        1
    );

    assert!(store.list_members(company.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_with_cycle_is_rejected() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(store.clone(), ImportOptions::default());

    let csv = "email,managerEmail\n\
               a@acme.com,b@acme.com\n\
               b@acme.com,c@acme.com\n\
               c@acme.com,a@acme.com\n";
    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            csv,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code.as_deref(), Some("VALIDATION_FAILED"));
    assert_eq!(error.errors.len(), 1);
    assert_eq!(error.errors[0].error_type, ImportErrorType::CircularReference);

    assert!(store.list_members(company.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_import_missing_email_column() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(store, ImportOptions::default());

    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            "name,managerEmail\nAnn,b@acme.com\n",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.code.as_deref(), Some("INVALID_CSV"));
}

#[tokio::test]
async fn test_import_reports_unknown_manager_per_row() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    store
        .create_member(
            company.id,
            NewMember::new("boss@acme.com").with_name("Bo"),
            CoreState::Registered,
        )
        .await
        .unwrap();
    let app = create_test_router(store.clone(), ImportOptions::default());

    let csv = "email,managerEmail\n\
               worker@acme.com,boss@acme.com\n\
               stray@acme.com,ghost@acme.com\n";
    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            csv,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: ImportReport = serde_json::from_slice(&body).unwrap();
    assert_eq!(report.users_added, 2);
    assert_eq!(report.relationships_created, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].error_type, ImportErrorType::UserNotFound);

    let boss = store
        .find_member_by_email(company.id, "boss@acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(boss.membership_state, CoreState::Registered);
}

#[tokio::test]
async fn test_import_invites_unknown_managers_when_enabled() {
    let store = create_test_store().await;
    let company = store.create_company("Acme").await.unwrap();
    let app = create_test_router(
        store.clone(),
        ImportOptions {
            invite_unknown_managers: true,
        },
    );

    let csv = "email,managerEmail\nstray@acme.com,ghost@acme.com\n";
    let (status, body) = send(
        &app,
        post_csv(
            format!("/api/companies/{}/org-chart/import", company.id),
            csv,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let report: ImportReport = serde_json::from_slice(&body).unwrap();
    assert_eq!(report.users_added, 2);
    assert_eq!(report.relationships_created, 1);
    assert!(report.errors.is_empty());
}
