//! HTTP API server for the SpeakGenie mock backend

pub mod chat;
mod error;
pub mod health;
pub mod translate;

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::Result;
use crate::responder::Responder;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub responder: Arc<dyn Responder>,
}

/// Build the `/api` routes with error handling, CORS and tracing
pub fn router(state: Arc<ApiState>) -> Router {
    app(state, Router::new().fallback(not_found))
}

fn app(state: Arc<ApiState>, outer: Router) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(chat::router(state.clone()))
        .merge(translate::router(state))
        .fallback(not_found);

    // CORS layer for cross-origin requests from the web client
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    outer
        .nest("/api", api)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");

    ApiError::Panicked.into_response()
}

pub struct ApiServerBuilder {
    responder: Arc<dyn Responder>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    #[must_use]
    pub fn new(responder: Arc<dyn Responder>, port: u16) -> Self {
        Self {
            responder,
            port,
            static_dir: None,
        }
    }

    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: Arc::new(ApiState {
                responder: self.responder,
            }),
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// Mock backend HTTP server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    fn router(&self) -> Router {
        let Some(static_dir) = &self.static_dir else {
            return router(self.state.clone());
        };

        // Serve the web client, falling back to index.html for client routes
        let index_file = static_dir.join("index.html");
        let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));
        tracing::info!(path = %static_dir.display(), "serving static files");

        app(self.state.clone(), Router::new().fallback_service(serve_dir))
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    ///
    /// # Errors
    ///
    /// Returns error if the server fails while running
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let port = listener.local_addr().map(|a| a.port()).unwrap_or(self.port);
        tracing::info!(port, "🚀 SpeakGenie API listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
