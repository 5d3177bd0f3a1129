use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::entities::{mechanic, mechanic_certification, specialization};
use crate::errors::ServiceError;
use crate::services::mechanics::{
    CreateMechanicRequest, CreateSpecializationRequest, RecordCertificationRequest,
    UpdateMechanicRequest,
};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct MechanicFilter {
    /// Restrict to active (true) or inactive (false) staff
    pub active: Option<bool>,
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mechanics).post(create_mechanic))
        .route("/:id", get(get_mechanic).put(update_mechanic))
        .route(
            "/:id/certifications",
            get(list_certifications).post(record_certification),
        )
}

pub fn specialization_routes() -> Router<AppState> {
    Router::new().route("/", get(list_specializations).post(create_specialization))
}

/// List mechanics, optionally filtered by activity
#[utoipa::path(
    get,
    path = "/api/v1/mechanics",
    params(
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Mechanics retrieved", body = ApiResponse<PaginatedResponse<mechanic::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn list_mechanics(
    State(state): State<AppState>,
    Query(filter): Query<MechanicFilter>,
) -> Result<Json<ApiResponse<PaginatedResponse<mechanic::Model>>>, ServiceError> {
    let limit = filter.limit.min(state.config.api_max_page_size);
    let (items, total) = state
        .services
        .mechanics
        .list_mechanics(filter.active, filter.page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        filter.page,
        limit,
    ))))
}

/// Hire a mechanic
#[utoipa::path(
    post,
    path = "/api/v1/mechanics",
    request_body = CreateMechanicRequest,
    responses(
        (status = 201, description = "Mechanic created", body = ApiResponse<mechanic::Model>),
        (status = 409, description = "Email already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn create_mechanic(
    State(state): State<AppState>,
    Json(request): Json<CreateMechanicRequest>,
) -> Result<(StatusCode, Json<ApiResponse<mechanic::Model>>), ServiceError> {
    let mechanic = state.services.mechanics.create_mechanic(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(mechanic))))
}

/// Get one mechanic
#[utoipa::path(
    get,
    path = "/api/v1/mechanics/{id}",
    params(("id" = i64, Path, description = "Mechanic id")),
    responses(
        (status = 200, description = "Mechanic retrieved", body = ApiResponse<mechanic::Model>),
        (status = 404, description = "Mechanic not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn get_mechanic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<mechanic::Model>>, ServiceError> {
    let mechanic = state.services.mechanics.get_mechanic(id).await?;
    Ok(Json(ApiResponse::success(mechanic)))
}

/// Update a mechanic, including the active flag
#[utoipa::path(
    put,
    path = "/api/v1/mechanics/{id}",
    params(("id" = i64, Path, description = "Mechanic id")),
    request_body = UpdateMechanicRequest,
    responses(
        (status = 200, description = "Mechanic updated", body = ApiResponse<mechanic::Model>),
        (status = 404, description = "Mechanic not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn update_mechanic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMechanicRequest>,
) -> Result<Json<ApiResponse<mechanic::Model>>, ServiceError> {
    let mechanic = state
        .services
        .mechanics
        .update_mechanic(id, request)
        .await?;
    Ok(Json(ApiResponse::success(mechanic)))
}

/// A mechanic's certifications
#[utoipa::path(
    get,
    path = "/api/v1/mechanics/{id}/certifications",
    params(("id" = i64, Path, description = "Mechanic id")),
    responses(
        (status = 200, description = "Certifications retrieved", body = ApiResponse<Vec<mechanic_certification::Model>>),
        (status = 404, description = "Mechanic not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn list_certifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<mechanic_certification::Model>>>, ServiceError> {
    let certifications = state.services.mechanics.list_certifications(id).await?;
    Ok(Json(ApiResponse::success(certifications)))
}

/// Record a certification for a mechanic
#[utoipa::path(
    post,
    path = "/api/v1/mechanics/{id}/certifications",
    params(("id" = i64, Path, description = "Mechanic id")),
    request_body = RecordCertificationRequest,
    responses(
        (status = 201, description = "Certification recorded", body = ApiResponse<mechanic_certification::Model>),
        (status = 404, description = "Mechanic or specialization not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Certification already recorded", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn record_certification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecordCertificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<mechanic_certification::Model>>), ServiceError> {
    let certification = state
        .services
        .mechanics
        .record_certification(id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(certification)),
    ))
}

/// List specializations
#[utoipa::path(
    get,
    path = "/api/v1/specializations",
    responses(
        (status = 200, description = "Specializations retrieved", body = ApiResponse<Vec<specialization::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn list_specializations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<specialization::Model>>>, ServiceError> {
    let specializations = state.services.mechanics.list_specializations().await?;
    Ok(Json(ApiResponse::success(specializations)))
}

/// Create a specialization
#[utoipa::path(
    post,
    path = "/api/v1/specializations",
    request_body = CreateSpecializationRequest,
    responses(
        (status = 201, description = "Specialization created", body = ApiResponse<specialization::Model>),
        (status = 409, description = "Name already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "mechanics"
)]
pub async fn create_specialization(
    State(state): State<AppState>,
    Json(request): Json<CreateSpecializationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<specialization::Model>>), ServiceError> {
    let specialization = state
        .services
        .mechanics
        .create_specialization(request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(specialization)),
    ))
}
