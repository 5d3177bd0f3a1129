pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod rate_limiter;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{middleware, response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, customers::CustomerService, inventory::InventoryService,
    mechanics::MechanicService, tickets::TicketService, vehicles::VehicleService,
};

/// Every domain service, built once at startup and shared.
pub struct AppServices {
    pub customers: CustomerService,
    pub vehicles: VehicleService,
    pub mechanics: MechanicService,
    pub inventory: InventoryService,
    pub catalog: CatalogService,
    pub tickets: TicketService,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        auth: Arc<AuthService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let inventory = InventoryService::new(db.clone(), event_sender.clone());
        Self {
            customers: CustomerService::new(db.clone(), event_sender.clone()),
            vehicles: VehicleService::new(db.clone(), event_sender.clone()),
            mechanics: MechanicService::new(db.clone(), event_sender.clone()),
            catalog: CatalogService::new(db.clone()),
            tickets: TicketService::new(db.clone(), inventory.clone(), event_sender),
            inventory,
            auth,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: Arc<AppServices>,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl ListQuery {
    /// The requested page size, capped at the configured maximum.
    pub fn clamped_limit(&self, max: u64) -> u64 {
        self.limit.clamp(1, max)
    }
}

pub(crate) fn default_page() -> u64 {
    1
}
pub(crate) fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// The versioned API surface. Everything except registration and login
/// sits behind bearer authentication.
pub fn api_v1_routes() -> Router<AppState> {
    let public = Router::new().nest("/auth", handlers::auth::routes());

    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .nest("/customers", handlers::customers::routes())
        .nest(
            "/customers/:customer_id/vehicles",
            handlers::vehicles::routes(),
        )
        .nest("/mechanics", handlers::mechanics::routes())
        .nest(
            "/specializations",
            handlers::mechanics::specialization_routes(),
        )
        .nest("/parts", handlers::inventory::routes())
        .nest("/services", handlers::catalog::service_routes())
        .nest("/packages", handlers::catalog::package_routes())
        .nest("/tickets", handlers::tickets::routes())
        .route_layer(middleware::from_fn(auth::auth_middleware));

    public.merge(protected)
}

/// Assembles the full application router for the given state. The
/// binary layers CORS, rate limiting, and tracing on top of this.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .merge(openapi::swagger_ui())
        .layer(middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .layer(axum::Extension(state.services.auth.clone()))
        .with_state(state)
}

/// Service identity and build info
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Service status", body = ApiResponse<Value>)),
    tag = "meta"
)]
pub async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    });
    Ok(Json(ApiResponse::success(status_data)))
}

/// Liveness and database connectivity probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health report", body = ApiResponse<Value>)),
    tag = "meta"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> ApiResult<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    let health_data = json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}
