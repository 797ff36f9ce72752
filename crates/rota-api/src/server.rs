//! API server implementation.
//!
//! Provides health, ready, and API endpoints for the Rota reservation
//! service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rota_core::clock::{Clock, SystemClock};
use rota_core::model::default_rooms;
use rota_core::store::{BookingStore, MemoryStore, RoomCatalog};
use rota_core::{Error, Result};
use rota_ledger::{BookingNotifier, LogNotifier, ReservationWriter, ScheduleReader};

use crate::config::{Config, CorsConfig};

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
    /// Optional message about readiness state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Reservation transaction writer.
    pub writer: Arc<ReservationWriter>,
    /// Status and schedule reader.
    pub reader: Arc<ScheduleReader>,
    /// Room catalog, used by the readiness probe.
    catalog: Arc<dyn RoomCatalog>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("writer", &"<ReservationWriter>")
            .field("reader", &"<ScheduleReader>")
            .field("catalog", &"<RoomCatalog>")
            .finish()
    }
}

impl AppState {
    /// Creates application state over the given seams.
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RoomCatalog>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn BookingNotifier>,
    ) -> Self {
        let writer = ReservationWriter::new(store.clone(), catalog.clone(), clock.clone())
            .with_lock_wait(config.lock_wait())
            .with_notifier(notifier);
        let reader = ScheduleReader::new(store, catalog.clone(), clock);
        Self {
            config,
            writer: Arc::new(writer),
            reader: Arc::new(reader),
            catalog,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// Returns 200 OK if the service is alive. This is a shallow check
/// that doesn't verify dependencies.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check endpoint handler.
///
/// Returns 200 OK if the service is ready to accept requests. A catalog
/// listing is sufficient to validate the store connection.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.list_rooms().await {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                message: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                message: Some(format!("store check failed: {e}")),
            }),
        ),
    }
}

// ============================================================================
// Server
// ============================================================================

/// The Rota API server.
pub struct Server {
    config: Config,
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RoomCatalog>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn BookingNotifier>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("store", &"<BookingStore>")
            .field("catalog", &"<RoomCatalog>")
            .finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration.
    ///
    /// Defaults to a seeded in-memory store; use [`Server::with_storage`]
    /// for production.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::with_rooms(default_rooms()));
        Self {
            config,
            store: store.clone(),
            catalog: store,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Creates a new server with an explicit store and catalog.
    #[must_use]
    pub fn with_storage(
        config: Config,
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RoomCatalog>,
    ) -> Self {
        Self {
            config,
            store,
            catalog,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::new(AppState::new(
            self.config.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.catalog),
            Arc::clone(&self.clock),
            Arc::clone(&self.notifier),
        ));

        let cors = self.build_cors_layer();

        Router::new()
            // Health and ready endpoints
            .route("/health", get(health))
            .route("/ready", get(ready))
            // API routes
            .nest("/api/v1", crate::routes::api_v1_routes())
            // Middleware (order matters): trace outermost, then CORS, then
            // request-id stamping closest to the handlers.
            .layer(middleware::from_fn(crate::context::request_id_middleware))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            // Shared state
            .with_state(state)
    }

    /// Builds the CORS layer from configuration.
    fn build_cors_layer(&self) -> CorsLayer {
        let cors_config = &self.config.cors;
        let cors = Self::build_cors_base(cors_config);
        Self::apply_cors_allowed_origins(cors, cors_config)
    }

    fn build_cors_base(cors_config: &CorsConfig) -> CorsLayer {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::HeaderName::from_static("x-request-id"),
            ])
            // Expose headers the browser needs to read
            .expose_headers([
                header::CONTENT_TYPE,
                header::CONTENT_LENGTH,
                header::RETRY_AFTER,
                header::HeaderName::from_static("x-request-id"),
            ])
            .max_age(Duration::from_secs(cors_config.max_age_seconds))
    }

    fn cors_allows_any_origin(cors_config: &CorsConfig) -> bool {
        cors_config.allowed_origins.len() == 1
            && cors_config
                .allowed_origins
                .first()
                .is_some_and(|origin| origin == "*")
    }

    fn parse_cors_origins(cors_config: &CorsConfig) -> Vec<HeaderValue> {
        let mut allowed = Vec::new();
        for origin in &cors_config.allowed_origins {
            match HeaderValue::from_str(origin) {
                Ok(value) => allowed.push(value),
                Err(_) => {
                    tracing::error!(
                        origin = %origin,
                        "Invalid CORS origin; expected a valid HeaderValue"
                    );
                }
            }
        }
        allowed
    }

    fn apply_cors_allowed_origins(cors: CorsLayer, cors_config: &CorsConfig) -> CorsLayer {
        if cors_config.allowed_origins.is_empty() {
            return cors;
        }

        if Self::cors_allows_any_origin(cors_config) {
            return cors.allow_origin(Any);
        }

        if cors_config
            .allowed_origins
            .iter()
            .any(|origin| origin == "*")
        {
            tracing::error!(
                origins = ?cors_config.allowed_origins,
                "Invalid CORS config: '*' must be the only allowed origin"
            );
            return cors;
        }

        let allowed = Self::parse_cors_origins(cors_config);

        if allowed.is_empty() {
            tracing::warn!("All configured CORS origins were invalid; disabling CORS");
            cors
        } else {
            tracing::info!(origins = ?cors_config.allowed_origins, "CORS configured");
            cors.allow_origin(AllowOrigin::list(allowed))
        }
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the server
    /// cannot bind to the port.
    pub async fn serve(&self) -> Result<()> {
        self.validate_config()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.create_router();

        tracing::info!(
            http_port = self.config.http_port,
            debug = self.config.debug,
            "Starting Rota API server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::internal(format!("failed to bind to {addr}: {e}")))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::internal(format!("server error: {e}")))?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to test
    /// the routes without actually binding to a port.
    #[doc(hidden)]
    #[must_use]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }

    fn validate_config(&self) -> Result<()> {
        // Enforce "no wildcard in production" for CORS.
        if !self.config.debug
            && self
                .config
                .cors
                .allowed_origins
                .iter()
                .any(|origin| origin == "*")
        {
            return Err(Error::InvalidInput(
                "cors.allowed_origins cannot include '*' when debug=false".to_string(),
            ));
        }

        if !self.config.debug && self.config.db_path.is_none() {
            return Err(Error::InvalidInput(
                "ROTA_DB_PATH is required when debug=false".to_string(),
            ));
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// Builder for constructing a server.
pub struct ServerBuilder {
    config: Config,
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn RoomCatalog>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn BookingNotifier>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("store", &"<BookingStore>")
            .field("catalog", &"<RoomCatalog>")
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        let store = Arc::new(MemoryStore::with_rooms(default_rooms()));
        Self {
            config: Config::default(),
            store: store.clone(),
            catalog: store,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }
}

impl ServerBuilder {
    /// Creates a new server builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Enables debug mode.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Sets the slot lock wait bound in milliseconds.
    #[must_use]
    pub fn lock_wait_ms(mut self, ms: u64) -> Self {
        self.config.lock_wait_ms = ms;
        self
    }

    /// Sets the store and catalog used by request handlers.
    ///
    /// By default, the server uses a seeded in-memory store intended only
    /// for tests/dev.
    #[must_use]
    pub fn storage(
        mut self,
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn RoomCatalog>,
    ) -> Self {
        self.store = store;
        self.catalog = catalog;
        self
    }

    /// Sets the clock used for window evaluation and commit-time checks.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the post-commit booking notifier.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn BookingNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config,
            store: self.store,
            catalog: self.catalog,
            clock: self.clock,
            notifier: self.notifier,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() -> Result<()> {
        let server = ServerBuilder::new().build();
        let router = server.test_router();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .context("build request")?;

        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .context("read response body")?;
        let health: HealthResponse = serde_json::from_slice(&body).context("parse JSON body")?;
        assert_eq!(health.status, "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_ready_endpoint() -> Result<()> {
        let server = ServerBuilder::new().build();
        let router = server.test_router();

        let request = Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .context("build request")?;

        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .context("read response body")?;
        let ready: ReadyResponse = serde_json::from_slice(&body).context("parse JSON body")?;
        assert!(ready.ready);
        Ok(())
    }

    #[tokio::test]
    async fn test_responses_carry_a_request_id() -> Result<()> {
        let server = ServerBuilder::new().build();
        let router = server.test_router();

        let request = Request::builder()
            .uri("/health")
            .header("X-Request-Id", "req-42")
            .body(Body::empty())
            .context("build request")?;

        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        let header = response
            .headers()
            .get("x-request-id")
            .context("missing x-request-id header")?;
        assert_eq!(header.to_str()?, "req-42");
        Ok(())
    }

    #[test]
    fn test_validate_config_rejects_wildcard_cors_in_production() {
        let mut config = Config {
            db_path: Some("/tmp/rota.db".to_string()),
            ..Config::default()
        };
        config.cors.allowed_origins = vec!["*".to_string()];
        let server = Server::new(config);
        assert!(server.validate_config().is_err());
    }

    #[test]
    fn test_validate_config_requires_db_path_in_production() {
        let server = Server::new(Config::default());
        assert!(server.validate_config().is_err());

        let debug = ServerBuilder::new().debug(true).build();
        assert!(debug.validate_config().is_ok());
    }
}
