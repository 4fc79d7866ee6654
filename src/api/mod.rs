//! API handlers for the rental REST endpoints

pub mod auth;
pub mod equipment;
pub mod health;
pub mod maintenance;
pub mod openapi;
pub mod reservations;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Build the application router: every endpoint under `/api/v1`, plus the docs
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipment/:id/availability", get(equipment::check_availability))
        // Reservations
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/active", get(reservations::list_active))
        .route("/reservations/:id", get(reservations::get_reservation))
        .route("/reservations/:id/approve", patch(reservations::approve_reservation))
        .route("/reservations/:id/reject", patch(reservations::reject_reservation))
        .route("/reservations/:id/cancel", patch(reservations::cancel_reservation))
        .route("/reservations/:id/complete", patch(reservations::complete_reservation))
        // Maintenance
        .route("/maintenance", post(maintenance::create_maintenance))
        .route("/maintenance/overdue", get(maintenance::list_overdue))
        .route(
            "/maintenance/:id",
            get(maintenance::get_maintenance).put(maintenance::update_maintenance),
        )
        .route("/maintenance/:id/start", patch(maintenance::start_maintenance))
        .route("/maintenance/:id/complete", patch(maintenance::complete_maintenance))
        .route("/maintenance/:id/cancel", patch(maintenance::cancel_maintenance))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::router;
    use crate::{
        clock::FixedClock,
        config::{AppConfig, AuthConfig},
        repository::{memory::MemoryStore, Repository},
        services::{reservations::tests::{at, excavator, quiet_notifier}, Services},
        AppState,
    };

    const ADMIN_EMAIL: &str = "admin@rental.local";
    const ADMIN_PASSWORD: &str = "s3cret-pass";

    fn config() -> AppConfig {
        AppConfig {
            server: Default::default(),
            database: Default::default(),
            auth: AuthConfig {
                admin_email: Some(ADMIN_EMAIL.to_string()),
                admin_password: Some(ADMIN_PASSWORD.to_string()),
                ..AuthConfig::default()
            },
            logging: Default::default(),
            email: Default::default(),
            scheduler: Default::default(),
            rental: Default::default(),
        }
    }

    async fn app(store: &Arc<MemoryStore>) -> Router {
        let config = config();
        let services = Services::new(
            store.stores(),
            &config,
            Arc::new(FixedClock::at(at(6, 1, 9))),
            quiet_notifier(),
        );
        services.auth.bootstrap_admin().await.unwrap();
        // Never connected: only the readiness check touches it
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        router(AppState {
            config: Arc::new(config),
            services: Arc::new(services),
            repository: Repository::new(pool),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let store = MemoryStore::new();
        let app = app(&store).await;
        let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let store = MemoryStore::new();
        let app = app(&store).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "NotAuthorized");
    }

    #[tokio::test]
    async fn reservations_require_a_token() {
        let store = MemoryStore::new();
        let app = app(&store).await;
        let (status, _) = send(&app, "GET", "/api/v1/reservations/active", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let store = MemoryStore::new();
        let equipment = excavator(200);
        let equipment_id = equipment.id;
        store.put_equipment(equipment);
        let app = app(&store).await;
        let token = login(&app).await;

        let (status, quote) = send(
            &app,
            "GET",
            &format!(
                "/api/v1/equipment/{}/availability?start_date=2025-06-10T00:00:00Z&end_date=2025-06-13T00:00:00Z",
                equipment_id
            ),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote["available"], true);
        assert_eq!(quote["days"], 3);

        let booking = json!({
            "equipment_id": equipment_id,
            "start_date": "2025-06-10T00:00:00Z",
            "end_date": "2025-06-13T00:00:00Z"
        });
        let (status, created) =
            send(&app, "POST", "/api/v1/reservations", Some(&token), Some(booking.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, approved) = send(
            &app,
            "PATCH",
            &format!("/api/v1/reservations/{}/approve", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        let (status, body) =
            send(&app, "POST", "/api/v1/reservations", Some(&token), Some(booking)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "DatesConflict");

        let (status, cancelled) = send(
            &app,
            "PATCH",
            &format!("/api/v1/reservations/{}/cancel", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Lea",
                "last_name": "Moreau",
                "email": email,
                "password": "Str0ng!pass"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "client");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn registered_clients_book_and_only_see_their_own() {
        let store = MemoryStore::new();
        let equipment = excavator(200);
        let equipment_id = equipment.id;
        store.put_equipment(equipment);
        let app = app(&store).await;

        let owner = register(&app, "lea@example.com").await;
        let stranger = register(&app, "paul@example.com").await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/reservations",
            Some(&owner),
            Some(json!({
                "equipment_id": equipment_id,
                "start_date": "2025-06-10T00:00:00Z",
                "end_date": "2025-06-12T00:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/v1/reservations/{}", created["id"].as_str().unwrap());

        let (status, _) = send(&app, "GET", &uri, Some(&stranger), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", &format!("{}/cancel", uri), Some(&stranger), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "PATCH", &format!("{}/approve", uri), Some(&owner), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, cancelled) =
            send(&app, "PATCH", &format!("{}/cancel", uri), Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
    }

    #[tokio::test]
    async fn registering_a_taken_email_is_a_conflict() {
        let store = MemoryStore::new();
        let app = app(&store).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "first_name": "Other",
                "last_name": "Admin",
                "email": ADMIN_EMAIL,
                "password": "Str0ng!pass"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Duplicate");
    }

    #[tokio::test]
    async fn scheduled_maintenance_is_edited_with_put() {
        let store = MemoryStore::new();
        let equipment = excavator(200);
        let equipment_id = equipment.id;
        store.put_equipment(equipment);
        let app = app(&store).await;
        let token = login(&app).await;

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/maintenance",
            Some(&token),
            Some(json!({
                "equipment_id": equipment_id,
                "maintenance_type": "preventive",
                "title": "Hydraulic check",
                "description": "Check hoses and seals",
                "scheduled_date": "2025-06-20T08:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/v1/maintenance/{}", created["id"].as_str().unwrap());

        let client = register(&app, "lea@example.com").await;
        let change = json!({ "priority": "high", "scheduled_date": "2025-06-22T08:00:00Z" });
        let (status, _) = send(&app, "PUT", &uri, Some(&client), Some(change.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = send(&app, "PUT", &uri, Some(&token), Some(change.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["priority"], "high");
        assert_eq!(updated["title"], "Hydraulic check");

        let (status, _) =
            send(&app, "PATCH", &format!("{}/start", uri), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "PUT", &uri, Some(&token), Some(change)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "InvalidTransition");
    }

    #[tokio::test]
    async fn unknown_equipment_is_not_found() {
        let store = MemoryStore::new();
        let app = app(&store).await;
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/equipment/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");
    }
}
