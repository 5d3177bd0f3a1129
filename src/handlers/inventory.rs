use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::entities::part;
use crate::errors::ServiceError;
use crate::services::inventory::{
    AdjustQuantityRequest, CreatePartRequest, QuantityAdjustment, UpdatePartRequest,
};
use crate::{ApiResponse, AppState, ListQuery, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/:id",
            get(get_part).put(update_part).delete(delete_part),
        )
        .route("/:id/adjust-quantity", post(adjust_quantity))
}

/// List parts
#[utoipa::path(
    get,
    path = "/api/v1/parts",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Parts retrieved", body = ApiResponse<PaginatedResponse<part::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<part::Model>>>, ServiceError> {
    let limit = query.clamped_limit(state.config.api_max_page_size);
    let (items, total) = state.services.inventory.list_parts(query.page, limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, query.page, limit,
    ))))
}

/// Add a part to the inventory
#[utoipa::path(
    post,
    path = "/api/v1/parts",
    request_body = CreatePartRequest,
    responses(
        (status = 201, description = "Part created", body = ApiResponse<part::Model>),
        (status = 409, description = "Part number already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn create_part(
    State(state): State<AppState>,
    Json(request): Json<CreatePartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<part::Model>>), ServiceError> {
    let part = state.services.inventory.create_part(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(part))))
}

/// Parts at or below their reorder level
#[utoipa::path(
    get,
    path = "/api/v1/parts/low-stock",
    responses(
        (status = 200, description = "Low stock parts retrieved", body = ApiResponse<Vec<part::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<part::Model>>>, ServiceError> {
    let parts = state.services.inventory.list_low_stock().await?;
    Ok(Json(ApiResponse::success(parts)))
}

/// Get one part
#[utoipa::path(
    get,
    path = "/api/v1/parts/{id}",
    params(("id" = i64, Path, description = "Part id")),
    responses(
        (status = 200, description = "Part retrieved", body = ApiResponse<part::Model>),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<part::Model>>, ServiceError> {
    let part = state.services.inventory.get_part(id).await?;
    Ok(Json(ApiResponse::success(part)))
}

/// Update a part's details (not its stock level)
#[utoipa::path(
    put,
    path = "/api/v1/parts/{id}",
    params(("id" = i64, Path, description = "Part id")),
    request_body = UpdatePartRequest,
    responses(
        (status = 200, description = "Part updated", body = ApiResponse<part::Model>),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePartRequest>,
) -> Result<Json<ApiResponse<part::Model>>, ServiceError> {
    let part = state.services.inventory.update_part(id, request).await?;
    Ok(Json(ApiResponse::success(part)))
}

/// Apply a signed stock adjustment
#[utoipa::path(
    post,
    path = "/api/v1/parts/{id}/adjust-quantity",
    params(("id" = i64, Path, description = "Part id")),
    request_body = AdjustQuantityRequest,
    responses(
        (status = 200, description = "Quantity adjusted", body = ApiResponse<QuantityAdjustment>),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock to remove", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn adjust_quantity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AdjustQuantityRequest>,
) -> Result<Json<ApiResponse<QuantityAdjustment>>, ServiceError> {
    let adjustment = state
        .services
        .inventory
        .adjust_quantity(id, request.delta)
        .await?;
    Ok(Json(ApiResponse::success(adjustment)))
}

/// Remove a part from the inventory
#[utoipa::path(
    delete,
    path = "/api/v1/parts/{id}",
    params(("id" = i64, Path, description = "Part id")),
    responses(
        (status = 204, description = "Part deleted"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "inventory"
)]
pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.inventory.delete_part(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
