//! `WorldlineServer` — Axum HTTP server wiring.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use worldline_store::EventStore;

use crate::config::ServerConfig;
use crate::handlers::events;
use crate::health::{self, HealthResponse};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transactional event store.
    pub store: Arc<EventStore>,
    /// When the server started.
    pub start_time: Instant,
}

/// The main worldline server.
pub struct WorldlineServer {
    config: ServerConfig,
    store: Arc<EventStore>,
    start_time: Instant,
}

impl WorldlineServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, store: EventStore) -> Self {
        Self {
            config,
            store: Arc::new(store),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    ///
    /// `/health` is unauthenticated; everything under `/events` requires
    /// a bearer token.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            start_time: self.start_time,
        };

        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/events",
                get(events::list_events).post(events::create_event),
            )
            .route(
                "/events/{id}",
                get(events::get_event)
                    .put(events::update_event)
                    .patch(events::update_event)
                    .delete(events::delete_event),
            )
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the task is cancelled.
    pub async fn listen(&self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.router()).await
    }

    /// Get the event store.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use worldline_store::{ConnectionConfig, new_file, run_migrations};

    fn make_server() -> (tempfile::TempDir, WorldlineServer) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = run_migrations(&conn).unwrap();
        }
        let server = WorldlineServer::new(ServerConfig::default(), EventStore::new(pool));
        (dir, server)
    }

    #[test]
    fn server_with_default_config() {
        let (_dir, server) = make_server();
        assert_eq!(server.config().host, "127.0.0.1");
        assert_eq!(server.config().port, 0);
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (_dir, server) = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn health_does_not_require_auth() {
        let (_dir, server) = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn events_require_auth() {
        let (_dir, server) = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/events")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (_dir, server) = make_server();
        let app = server.router();

        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
