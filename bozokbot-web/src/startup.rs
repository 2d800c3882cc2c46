use crate::config::Settings;
use crate::error::AppError;
use crate::handlers::{
    app::{health_check, metrics, readiness_check, root},
    chat::{ask, ask_api, health, index},
};
use crate::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use crate::services::BackendClient;
use crate::AppState;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/Chat", get(index))
        .route("/Chat/Index", get(index))
        .route("/Chat/Ask", post(ask))
        .route("/Chat/AskApi", post(ask_api))
        .route("/Chat/Health", get(health))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        // Only matched routes are counted, so asset and 404 paths stay out of the labels.
        .route_layer(from_fn(metrics_middleware))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the trace span sees the id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Bound listener plus router, ready to serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let backend = BackendClient::new(settings.backend.clone()).map_err(|e| {
            tracing::error!("Failed to create backend client: {}", e);
            AppError::InternalError(e)
        })?;

        tracing::info!(
            base_url = %backend.base_url(),
            timeout_secs = settings.backend.timeout_secs,
            "Configured question-answering backend"
        );

        let state = AppState::new(Arc::new(backend));
        let static_dir = settings.server.static_dir.as_deref().unwrap_or("static");
        let router = build_router(state, static_dir);

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Starting bozokbot-web on port {}", self.port);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
