use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::entities::customer;
use crate::errors::ServiceError;
use crate::services::customers::CreateCustomerRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(flatten)]
    #[validate]
    pub customer: CreateCustomerRequest,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub customer: customer::Model,
}

/// Unauthenticated entry points. `/auth/me` is registered with the
/// protected routes since it needs a validated token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Create an account and return a signed token
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ServiceError> {
    request.validate()?;

    let auth = state.services.auth.clone();
    let password_hash = auth.hash_password(&request.password)?;
    let customer = state
        .services
        .customers
        .create_customer(request.customer, password_hash)
        .await?;
    let token = auth.generate_token(&customer)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthResponse { token, customer })),
    ))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ServiceError> {
    request.validate()?;

    let customer = state
        .services
        .customers
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

    let auth = state.services.auth.clone();
    if !auth.verify_password(&request.password, &customer.password_hash)? {
        return Err(ServiceError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = auth.generate_token(&customer)?;
    Ok(Json(ApiResponse::success(AuthResponse { token, customer })))
}

/// The account behind the presented token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = ApiResponse<customer::Model>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<customer::Model>>, ServiceError> {
    let customer = state
        .services
        .customers
        .get_customer(user.customer_id)
        .await?;
    Ok(Json(ApiResponse::success(customer)))
}
