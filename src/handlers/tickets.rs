use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::entities::{service_ticket, ticket_assignment, ticket_line_item, ticket_part_usage};
use crate::errors::ServiceError;
use crate::services::ticket_cost::TicketTotal;
use crate::services::tickets::{
    AssignMechanicRequest, AttachPartRequest, BulkEditAssignmentsRequest, CreateLineItemRequest,
    CreateTicketRequest, TicketStatus, UpdateTicketStatusRequest,
};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct TicketFilter {
    /// Filter by lifecycle state
    pub status: Option<String>,
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickets).post(create_ticket))
        .route("/:id", get(get_ticket))
        .route("/:id/status", put(update_status))
        .route("/:id/total", get(get_total))
        .route("/:id/line-items", get(list_line_items).post(create_line_item))
        .route("/:id/parts", get(list_part_usages).post(attach_part))
        .route("/:id/assign-mechanic", post(assign_mechanic))
        .route("/:id/mechanics/:mechanic_id", axum::routing::delete(remove_mechanic))
        .route("/:id/assignments", get(list_assignments).put(bulk_edit_assignments))
}

/// List service tickets
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Tickets retrieved", body = ApiResponse<PaginatedResponse<service_ticket::Model>>),
        (status = 400, description = "Unknown status filter", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<ApiResponse<PaginatedResponse<service_ticket::Model>>>, ServiceError> {
    let status = filter
        .status
        .as_deref()
        .map(|raw| {
            TicketStatus::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown ticket status {}", raw))
            })
        })
        .transpose()?;

    let limit = filter.limit.min(state.config.api_max_page_size);
    let (items, total) = state
        .services
        .tickets
        .list_tickets(status, filter.page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items,
        total,
        filter.page,
        limit,
    ))))
}

/// Open a service ticket for a customer's vehicle
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = ApiResponse<service_ticket::Model>),
        (status = 400, description = "Vehicle does not belong to customer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<service_ticket::Model>>), ServiceError> {
    let ticket = state.services.tickets.create_ticket(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(ticket))))
}

/// Get one ticket
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket retrieved", body = ApiResponse<service_ticket::Model>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<service_ticket::Model>>, ServiceError> {
    let ticket = state.services.tickets.get_ticket(id).await?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// Move a ticket through its lifecycle
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/status",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = UpdateTicketStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<service_ticket::Model>),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent status change", body = crate::errors::ErrorResponse),
        (status = 422, description = "Ticket already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTicketStatusRequest>,
) -> Result<Json<ApiResponse<service_ticket::Model>>, ServiceError> {
    let ticket = state.services.tickets.update_status(id, request).await?;
    Ok(Json(ApiResponse::success(ticket)))
}

/// Recompute the ticket's total from its stored lines
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/total",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Total computed", body = ApiResponse<TicketTotal>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn get_total(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TicketTotal>>, ServiceError> {
    let total = state.services.tickets.get_ticket_total(id).await?;
    Ok(Json(ApiResponse::success(total)))
}

/// A ticket's labor and service lines
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/line-items",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Line items retrieved", body = ApiResponse<Vec<ticket_line_item::Model>>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn list_line_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ticket_line_item::Model>>>, ServiceError> {
    let items = state.services.tickets.list_line_items(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Add a labor or service charge to an open ticket
///
/// Lines that reference a catalog service default their unit price from
/// that service; ad hoc lines must quote a price explicitly.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/line-items",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = CreateLineItemRequest,
    responses(
        (status = 201, description = "Line item added", body = ApiResponse<ticket_line_item::Model>),
        (status = 404, description = "Ticket or referenced service not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Ticket already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn create_line_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateLineItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ticket_line_item::Model>>), ServiceError> {
    let item = state.services.tickets.create_line_item(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Parts used on a ticket
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/parts",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Part usages retrieved", body = ApiResponse<Vec<ticket_part_usage::Model>>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn list_part_usages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ticket_part_usage::Model>>>, ServiceError> {
    let usages = state.services.tickets.list_part_usages(id).await?;
    Ok(Json(ApiResponse::success(usages)))
}

/// Attach a part to an open ticket, consuming it from inventory
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/parts",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = AttachPartRequest,
    responses(
        (status = 201, description = "Part attached", body = ApiResponse<ticket_part_usage::Model>),
        (status = 404, description = "Ticket, part, or installer not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Part already attached", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock, or ticket closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn attach_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AttachPartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ticket_part_usage::Model>>), ServiceError> {
    let usage = state.services.tickets.attach_part(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(usage))))
}

/// Assign a mechanic to an open ticket
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/assign-mechanic",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = AssignMechanicRequest,
    responses(
        (status = 201, description = "Mechanic assigned", body = ApiResponse<ticket_assignment::Model>),
        (status = 404, description = "Ticket or mechanic not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Mechanic already assigned", body = crate::errors::ErrorResponse),
        (status = 422, description = "Ticket already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn assign_mechanic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AssignMechanicRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ticket_assignment::Model>>), ServiceError> {
    let assignment = state.services.tickets.assign_mechanic(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(assignment))))
}

/// Take a mechanic off a ticket
#[utoipa::path(
    delete,
    path = "/api/v1/tickets/{id}/mechanics/{mechanic_id}",
    params(
        ("id" = i64, Path, description = "Ticket id"),
        ("mechanic_id" = i64, Path, description = "Mechanic id"),
    ),
    responses(
        (status = 204, description = "Mechanic unassigned"),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Ticket already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn remove_mechanic(
    State(state): State<AppState>,
    Path((id, mechanic_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ServiceError> {
    state.services.tickets.remove_mechanic(id, mechanic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A ticket's current assignments
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}/assignments",
    params(("id" = i64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Assignments retrieved", body = ApiResponse<Vec<ticket_assignment::Model>>),
        (status = 404, description = "Ticket not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ticket_assignment::Model>>>, ServiceError> {
    let assignments = state.services.tickets.list_assignments(id).await?;
    Ok(Json(ApiResponse::success(assignments)))
}

/// Apply a batch of assignment additions and removals atomically
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/assignments",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = BulkEditAssignmentsRequest,
    responses(
        (status = 200, description = "Assignments edited", body = ApiResponse<Vec<ticket_assignment::Model>>),
        (status = 404, description = "Ticket, mechanic, or removal not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate mechanic in edit", body = crate::errors::ErrorResponse),
        (status = 422, description = "Ticket already closed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "tickets"
)]
pub async fn bulk_edit_assignments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<BulkEditAssignmentsRequest>,
) -> Result<Json<ApiResponse<Vec<ticket_assignment::Model>>>, ServiceError> {
    let assignments = state
        .services
        .tickets
        .bulk_edit_assignments(id, request)
        .await?;
    Ok(Json(ApiResponse::success(assignments)))
}
