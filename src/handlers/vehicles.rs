use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

use crate::entities::vehicle;
use crate::errors::ServiceError;
use crate::services::vehicles::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::{ApiResponse, AppState};

/// Nested under /customers/:customer_id/vehicles
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:vehicle_id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

/// List a customer's vehicles
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/vehicles",
    params(("customer_id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Vehicles retrieved", body = ApiResponse<Vec<vehicle::Model>>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<vehicle::Model>>>, ServiceError> {
    let vehicles = state.services.vehicles.list_for_customer(customer_id).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

/// Register a vehicle under a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers/{customer_id}/vehicles",
    params(("customer_id" = i64, Path, description = "Customer id")),
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle registered", body = ApiResponse<vehicle::Model>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "VIN already registered", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "vehicles"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<vehicle::Model>>), ServiceError> {
    let vehicle = state
        .services
        .vehicles
        .create_vehicle(customer_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

/// Get one of a customer's vehicles
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/vehicles/{vehicle_id}",
    params(
        ("customer_id" = i64, Path, description = "Customer id"),
        ("vehicle_id" = i64, Path, description = "Vehicle id"),
    ),
    responses(
        (status = 200, description = "Vehicle retrieved", body = ApiResponse<vehicle::Model>),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path((customer_id, vehicle_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<vehicle::Model>>, ServiceError> {
    let vehicle = state
        .services
        .vehicles
        .get_customer_vehicle(customer_id, vehicle_id)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

/// Update a vehicle; the VIN is immutable
#[utoipa::path(
    put,
    path = "/api/v1/customers/{customer_id}/vehicles/{vehicle_id}",
    params(
        ("customer_id" = i64, Path, description = "Customer id"),
        ("vehicle_id" = i64, Path, description = "Vehicle id"),
    ),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = ApiResponse<vehicle::Model>),
        (status = 400, description = "VIN change rejected", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "vehicles"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path((customer_id, vehicle_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<vehicle::Model>>, ServiceError> {
    let vehicle = state
        .services
        .vehicles
        .update_vehicle(customer_id, vehicle_id, request)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

/// Remove a vehicle from a customer's account
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{customer_id}/vehicles/{vehicle_id}",
    params(
        ("customer_id" = i64, Path, description = "Customer id"),
        ("vehicle_id" = i64, Path, description = "Vehicle id"),
    ),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "vehicles"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path((customer_id, vehicle_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .vehicles
        .delete_vehicle(customer_id, vehicle_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
