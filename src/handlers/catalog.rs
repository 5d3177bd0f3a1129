use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use crate::entities::{service, service_package};
use crate::errors::ServiceError;
use crate::services::catalog::{CreatePackageRequest, CreateServiceRequest, PackageDetail};
use crate::{ApiResponse, AppState};

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services).post(create_service))
        .route("/:id", get(get_service))
}

pub fn package_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route("/:id", get(get_package))
}

/// List the service catalog
#[utoipa::path(
    get,
    path = "/api/v1/services",
    responses(
        (status = 200, description = "Services retrieved", body = ApiResponse<Vec<service::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<service::Model>>>, ServiceError> {
    let services = state.services.catalog.list_services().await?;
    Ok(Json(ApiResponse::success(services)))
}

/// Add a service to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<service::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn create_service(
    State(state): State<AppState>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<service::Model>>), ServiceError> {
    let service = state.services.catalog.create_service(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(service))))
}

/// Get one catalog service
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service retrieved", body = ApiResponse<service::Model>),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service::Model>>, ServiceError> {
    let service = state.services.catalog.get_service(id).await?;
    Ok(Json(ApiResponse::success(service)))
}

/// List service packages
#[utoipa::path(
    get,
    path = "/api/v1/packages",
    responses(
        (status = 200, description = "Packages retrieved", body = ApiResponse<Vec<service_package::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<service_package::Model>>>, ServiceError> {
    let packages = state.services.catalog.list_packages().await?;
    Ok(Json(ApiResponse::success(packages)))
}

/// Create a discounted bundle of services
#[utoipa::path(
    post,
    path = "/api/v1/packages",
    request_body = CreatePackageRequest,
    responses(
        (status = 201, description = "Package created", body = ApiResponse<PackageDetail>),
        (status = 404, description = "Member service not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Package name already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn create_package(
    State(state): State<AppState>,
    Json(request): Json<CreatePackageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PackageDetail>>), ServiceError> {
    let detail = state.services.catalog.create_package(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(detail))))
}

/// Get a package with its member services and effective price
#[utoipa::path(
    get,
    path = "/api/v1/packages/{id}",
    params(("id" = i64, Path, description = "Package id")),
    responses(
        (status = 200, description = "Package retrieved", body = ApiResponse<PackageDetail>),
        (status = 404, description = "Package not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "catalog"
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PackageDetail>>, ServiceError> {
    let detail = state.services.catalog.get_package(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}
