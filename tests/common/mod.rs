use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use autoshop_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    AppServices, AppState,
};

const TEST_JWT_SECRET: &str =
    "this_is_a_test_secret_key_that_is_at_least_64_characters_long_0123456789";

/// Test harness: a full application router backed by a throwaway SQLite
/// database, plus a registered customer with a valid bearer token.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    pub customer_id: i64,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir for test database");
        let db_path = db_dir.path().join("autoshop_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        // SQLite: a single connection keeps writes serialized
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_expiration,
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg, db_arc.clone()));

        let services = Arc::new(AppServices::new(
            db_arc.clone(),
            auth_service,
            Some(event_sender),
        ));

        let state = AppState {
            db: db_arc,
            config: Arc::new(cfg),
            services,
        };

        let router = autoshop_api::build_router(state.clone());

        // Register a default account and keep its token for authenticated
        // requests.
        let email = format!("tester-{}@example.com", Uuid::new_v4());
        let register_body = json!({
            "first_name": "Terry",
            "last_name": "Tester",
            "email": email,
            "password": "hunter2hunter2",
        });
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(register_body.to_string()))
                    .expect("failed to build register request"),
            )
            .await
            .expect("router error during registration");
        assert!(
            response.status().is_success(),
            "registration failed with {}",
            response.status()
        );
        let body = body_json(response).await;
        let token = body["data"]["token"]
            .as_str()
            .expect("token missing from registration response")
            .to_string();
        let customer_id = body["data"]["customer"]["id"]
            .as_i64()
            .expect("customer id missing from registration response");

        Self {
            router,
            state,
            token,
            customer_id,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Bearer token for the default registered customer.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Registers a vehicle under the default customer and returns its id.
    #[allow(dead_code)]
    pub async fn seed_vehicle(&self) -> i64 {
        let vin: String = Uuid::new_v4().simple().to_string()[..17].to_uppercase();
        let response = self
            .request_authenticated(
                Method::POST,
                &format!("/api/v1/customers/{}/vehicles", self.customer_id),
                Some(json!({
                    "vin": vin,
                    "make": "Honda",
                    "model": "Civic",
                    "year": 2019,
                })),
            )
            .await;
        assert!(response.status().is_success(), "seeding vehicle failed");
        body_json(response).await["data"]["id"]
            .as_i64()
            .expect("vehicle id missing")
    }

    /// Creates a part with the given stock level and cost, returning its id.
    #[allow(dead_code)]
    pub async fn seed_part(&self, quantity_in_stock: i32, current_cost_cents: i64) -> i64 {
        let response = self
            .request_authenticated(
                Method::POST,
                "/api/v1/parts",
                Some(json!({
                    "part_number": format!("PN-{}", Uuid::new_v4().simple()),
                    "name": "Brake pad set",
                    "current_cost_cents": current_cost_cents,
                    "quantity_in_stock": quantity_in_stock,
                })),
            )
            .await;
        assert!(response.status().is_success(), "seeding part failed");
        body_json(response).await["data"]["id"]
            .as_i64()
            .expect("part id missing")
    }

    /// Opens a ticket on a fresh vehicle, returning (ticket_id, vehicle_id).
    #[allow(dead_code)]
    pub async fn seed_ticket(&self) -> (i64, i64) {
        let vehicle_id = self.seed_vehicle().await;
        let response = self
            .request_authenticated(
                Method::POST,
                "/api/v1/tickets",
                Some(json!({
                    "customer_id": self.customer_id,
                    "vehicle_id": vehicle_id,
                    "problem_description": "Grinding noise when braking",
                    "odometer_miles": 42_000,
                })),
            )
            .await;
        assert!(response.status().is_success(), "seeding ticket failed");
        let ticket_id = body_json(response).await["data"]["id"]
            .as_i64()
            .expect("ticket id missing");
        (ticket_id, vehicle_id)
    }

    /// Creates a catalog service with the given base price, returning its id.
    #[allow(dead_code)]
    pub async fn seed_service(&self, base_price_cents: i64) -> i64 {
        let response = self
            .request_authenticated(
                Method::POST,
                "/api/v1/services",
                Some(json!({
                    "name": format!("Service {}", Uuid::new_v4().simple()),
                    "base_price_cents": base_price_cents,
                    "estimated_minutes": 30,
                })),
            )
            .await;
        assert!(response.status().is_success(), "seeding service failed");
        body_json(response).await["data"]["id"]
            .as_i64()
            .expect("service id missing")
    }

    /// Hires a mechanic, returning their id.
    #[allow(dead_code)]
    pub async fn seed_mechanic(&self, name: &str) -> i64 {
        let response = self
            .request_authenticated(
                Method::POST,
                "/api/v1/mechanics",
                Some(json!({
                    "full_name": format!("{} Wrench", name),
                    "email": format!("{}-{}@shop.example.com", name.to_lowercase(), Uuid::new_v4()),
                })),
            )
            .await;
        assert!(response.status().is_success(), "seeding mechanic failed");
        body_json(response).await["data"]["id"]
            .as_i64()
            .expect("mechanic id missing")
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}
