use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::customer;
use crate::errors::ServiceError;

/// JWT claims carried by every issued token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Customer id, as a string
    pub sub: String,
    pub email: String,
    /// Unique token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// The authenticated principal, inserted into request extensions by
/// [`auth_middleware`] after token validation.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub customer_id: i64,
    pub email: String,
    pub token_id: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    token_expiration_secs: usize,
    issuer: String,
    audience: String,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        token_expiration_secs: usize,
        issuer: String,
        audience: String,
    ) -> Self {
        Self {
            jwt_secret,
            token_expiration_secs,
            issuer,
            audience,
        }
    }
}

/// Issues and validates tokens, and owns password hashing.
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServiceError::HashError(format!("failed to hash password: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ServiceError::HashError(format!("stored hash is malformed: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn generate_token(&self, customer: &customer::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.config.token_expiration_secs as i64);

        let claims = Claims {
            sub: customer.id.to_string(),
            email: customer.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("failed to issue token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("token validation failed: {}", e);
            ServiceError::Unauthorized("invalid or expired token".to_string())
        })
    }

    /// Resolves validated claims to the backing customer row. Deleted
    /// accounts keep valid-looking tokens from working.
    pub async fn resolve_user(&self, claims: &Claims) -> Result<AuthUser, ServiceError> {
        let customer_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::Unauthorized("malformed subject claim".to_string()))?;

        let found = customer::Entity::find_by_id(customer_id)
            .one(self.db.as_ref())
            .await?;

        match found {
            Some(record) => Ok(AuthUser {
                customer_id: record.id,
                email: record.email,
                token_id: claims.jti.clone(),
            }),
            None => Err(ServiceError::Unauthorized(
                "account no longer exists".to_string(),
            )),
        }
    }
}

/// Rejects requests that do not carry a valid bearer token. Expects an
/// `Arc<AuthService>` in the request extensions (installed in `main`).
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, ServiceError> {
    let auth_service = req
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| {
            ServiceError::InternalError("authentication service is not configured".to_string())
        })?;

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?
        .to_string();

    let claims = auth_service.validate_token(&token)?;
    let user = auth_service.resolve_user(&claims).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{Database, DatabaseConnection};

    async fn in_memory_db() -> Arc<DatabaseConnection> {
        Arc::new(Database::connect("sqlite::memory:").await.unwrap())
    }

    fn test_config() -> AuthConfig {
        AuthConfig::new(
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef".to_string(),
            3600,
            "autoshop-auth".to_string(),
            "autoshop-api".to_string(),
        )
    }

    fn sample_customer() -> customer::Model {
        customer::Model {
            id: 42,
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            email: "ana@example.com".into(),
            phone: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn issued_token_round_trips() {
        let service = AuthService::new(test_config(), in_memory_db().await);
        let token = service.generate_token(&sample_customer()).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.iss, "autoshop-auth");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let service = AuthService::new(test_config(), in_memory_db().await);
        let other = AuthService::new(
            AuthConfig::new(
                "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff".to_string(),
                3600,
                "autoshop-auth".to_string(),
                "autoshop-api".to_string(),
            ),
            in_memory_db().await,
        );
        let token = other.generate_token(&sample_customer()).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[tokio::test]
    async fn password_hashing_verifies_and_rejects() {
        let service = AuthService::new(test_config(), in_memory_db().await);
        let hash = service.hash_password("correct horse battery").unwrap();
        assert!(service.verify_password("correct horse battery", &hash).unwrap());
        assert!(!service.verify_password("wrong guess", &hash).unwrap());
    }
}
