//! # HTTP Server
//!
//! Combines the REST routes with health and metrics endpoints, applies
//! CORS, and serves the result until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::{Logger, MetricsRegistry};
use crate::rest_api::{RestServer, RestService};
use crate::store::DocumentStore;

use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;

/// HTTP server for a document store
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Serve `service` with the given configuration
    pub fn new<S: DocumentStore>(config: HttpServerConfig, service: RestService<S>) -> Self {
        let metrics = Arc::clone(service.metrics());
        let rest = RestServer::new(service).router();
        let router = Self::build_router(&config, rest, metrics);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        rest: Router,
        metrics: Arc<MetricsRegistry>,
    ) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let router = observability_routes(metrics);
        let router = match config.mount_prefix() {
            Some(prefix) => router.nest(prefix, rest),
            None => router.merge(rest),
        };
        router.layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        let addr_str = addr.to_string();
        Logger::info(
            "SERVER_LISTENING",
            &[("addr", addr_str.as_str()), ("mount", self.config.mount_path.as_str())],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Logger::info("SERVER_STOPPED", &[("addr", addr_str.as_str())]);
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::rest_api::{IndexRegistry, IndexRequest};
    use crate::store::{DocumentKey, JsonDocument, MemoryStore};

    fn server(config: HttpServerConfig) -> HttpServer {
        let registry = IndexRegistry::new()
            .key_parser(DocumentKey::parse_integer)
            .register(
                "all",
                |_: &Value, _: &JsonDocument| true,
                |_: &IndexRequest| Value::Null,
            );
        let service = RestService::new(Arc::new(MemoryStore::<JsonDocument>::new()), registry);
        HttpServer::new(config, service)
    }

    #[test]
    fn test_server_with_custom_port() {
        let server = server(HttpServerConfig::with_port(8080));
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn test_root_mount() {
        let app = server(HttpServerConfig::default()).router();
        let response = app
            .clone()
            .oneshot(Request::get("/findAll/all").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_nested_mount() {
        let config = HttpServerConfig {
            mount_path: "/store".to_string(),
            ..Default::default()
        };
        let app = server(config).router();

        let response = app
            .clone()
            .oneshot(Request::get("/store/findAll/all").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/findAll/all").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
