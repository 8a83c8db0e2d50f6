pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use orgrel_core::{ImportOptions, MembershipStore};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn MembershipStore>,
    pub import_options: ImportOptions,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orgrel API",
        version = "0.1.0",
        description = "REST API for querying reporting relationships and importing org charts",
        contact(
            name = "Orgrel Team",
            email = "team@orgrel.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::list_members,
        handlers::get_manager_chain,
        handlers::list_direct_reports,
        handlers::get_relationship,
        handlers::get_relationship_by_email,
        handlers::validate_org_chart,
        handlers::import_org_chart,
    ),
    components(
        schemas(
            models::MembershipState,
            models::Member,
            models::MemberList,
            models::ChainEntry,
            models::ManagerChain,
            models::RelationshipType,
            models::Relationship,
            models::ImportErrorType,
            models::ImportIssue,
            models::ValidationReport,
            models::ImportReport,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "members", description = "Org member lookup endpoints"),
        (name = "relationships", description = "Reporting relationship endpoints"),
        (name = "org-chart", description = "Org-chart CSV validation and import endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for localhost origins (for development)
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        store: Arc<dyn MembershipStore>,
        import_options: ImportOptions,
    ) -> Self {
        let state = Arc::new(AppState {
            store,
            import_options,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let api_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route(
                "/api/companies/{company_id}/members",
                get(handlers::list_members),
            )
            .route(
                "/api/companies/{company_id}/members/{member_id}/chain",
                get(handlers::get_manager_chain),
            )
            .route(
                "/api/companies/{company_id}/members/{member_id}/reports",
                get(handlers::list_direct_reports),
            )
            .route(
                "/api/companies/{company_id}/relationship",
                get(handlers::get_relationship),
            )
            .route(
                "/api/companies/{company_id}/relationship/by-email",
                get(handlers::get_relationship_by_email),
            )
            .route(
                "/api/companies/{company_id}/org-chart/validate",
                post(handlers::validate_org_chart),
            )
            .route(
                "/api/companies/{company_id}/org-chart/import",
                post(handlers::import_org_chart),
            )
            .with_state(self.state.clone());

        // SwaggerUi also serves /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

/// Convenience function to create and start an API server
pub async fn run_api_server(
    bind_addr: SocketAddr,
    store: Arc<dyn MembershipStore>,
    import_options: ImportOptions,
) -> Result<(), anyhow::Error> {
    let config = ApiServerConfig {
        bind_addr,
        enable_cors: true,
    };

    let server = ApiServer::new(config, store, import_options);
    server.start().await
}
