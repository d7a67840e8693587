//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every path to the dispatcher
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Publish rule tables rebuilt by the config watcher
//!
//! # Design Decisions
//! - Dispatch is synchronous and may read templates from disk, so it runs to completion
//!   on the blocking pool rather than on a runtime worker
//! - Unmatched routes answer 404; every other dispatch error answers 500

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::DispatchRequest;
use crate::http::response::BufferedResponse;
use crate::routing::table::RuleTable;

/// Largest form body read into request parameters.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub context_path: Arc<str>,
}

/// HTTP server for the page dispatcher.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher: dispatcher.clone(),
            context_path: Arc::from(config.server.context_path.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            dispatcher,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving or for driving requests in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Tables received on `updates` are published to the dispatcher as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        updates: Option<mpsc::UnboundedReceiver<RuleTable>>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        if let Some(mut updates) = updates {
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                while let Some(table) = updates.recv().await {
                    dispatcher.publish(table);
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Snapshot the request and run it through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (parts, body) = request.into_parts();
    let mut dispatch_request = DispatchRequest::from_parts(&parts, &state.context_path);

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
            Ok(bytes) => {
                for (name, value) in url::form_urlencoded::parse(&bytes).into_owned() {
                    dispatch_request = dispatch_request.with_param(name, value);
                }
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Form body rejected");
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
        }
    }

    let dispatcher = state.dispatcher.clone();
    let dispatched = tokio::task::spawn_blocking(move || {
        let mut response = BufferedResponse::new();
        let result = dispatcher.dispatch_and_process(&dispatch_request, &mut response);
        (result, response)
    })
    .await;

    match dispatched {
        Ok((Ok(()), response)) => response.into_response(),
        Ok((Err(e), _)) => {
            tracing::error!(
                request_id = %request_id,
                method = %parts.method,
                path = %parts.uri.path(),
                error = %e,
                failure_kind = e.failure().map(|f| f.kind().as_str()),
                "Dispatch failed"
            );
            e.status_code().into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task did not complete");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
