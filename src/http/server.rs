//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the records API and health routes
//! - Wire up middleware (request ID, tracing, CORS, timeout, body limit)
//! - Bind the store-backed service into handler state
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, CorsConfig, LimitsConfig};
use crate::http::handlers;
use crate::http::middleware::{enforce_deadline, track_metrics};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::records::StudentService;
use crate::store::{Collection, DocumentStore};

pub use axum::http::header::InvalidHeaderValue;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
    pub limits: LimitsConfig,
}

/// HTTP server for the records API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server over an already-connected store.
    ///
    /// Fails only when the configured CORS origin is not a valid header
    /// value, which [`crate::config::validate_config`] rejects up front.
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, InvalidHeaderValue> {
        let state = AppState {
            students: StudentService::new(Collection::new(store, &config.store.collection)),
            limits: config.limits.clone(),
        };

        let router = Self::build_router(&config, state)?;
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Result<Router, InvalidHeaderValue> {
        let api = Router::new()
            .route(
                "/students",
                get(handlers::list_students).post(handlers::create_student),
            )
            .route(
                "/students/{id}",
                get(handlers::get_student)
                    .put(handlers::update_student)
                    .delete(handlers::delete_student),
            )
            .route("/top-performers", get(handlers::top_performers))
            .route("/search", get(handlers::search_students))
            .method_not_allowed_fallback(handlers::method_not_allowed);

        // Outermost first: the request id exists before the trace span is
        // opened.
        let layers = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(propagate_request_id_layer())
            .layer(cors_layer(&config.cors)?);

        let deadline = Duration::from_secs(config.timeouts.request_secs);

        // The body limit is enforced by the `Json` extractor, so oversized
        // bodies are answered by the handlers in the JSON envelope.
        Ok(Router::new()
            .nest("/api", api)
            .route("/health", get(handlers::health))
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .route_layer(middleware::from_fn(track_metrics))
            .fallback(handlers::unknown_route)
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(middleware::from_fn(move |request: Request, next: Next| {
                enforce_deadline(deadline, request, next)
            }))
            .with_state(state)
            .layer(layers))
    }

    /// The fully layered router, for serving or `oneshot` tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            collection = %self.config.store.collection,
            backend = ?self.config.store.backend,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Single-origin CORS policy with credentials.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(&config.allowed_origin)?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(config.allow_credentials)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age_secs)))
}
