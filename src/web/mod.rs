//! Form-based web surface.
//!
//! Routes:
//!
//! - `GET /health`
//! - `GET|POST /login`, `POST /logout`
//! - `GET /` generator form (login required)
//! - `POST /generate` single code, previewed or downloaded as `qr_code.png`
//! - `POST /bulk` one code per line of an uploaded CSV or text file

pub mod error;
pub mod forms;
pub mod handlers;
pub mod session;
pub mod templates;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Settings;
use crate::generator::Generator;
use handlers::{
    bulk_handler, generate_handler, health_check, index, login_handler, login_page, logout_handler,
};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub generator: Arc<Generator>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            generator: Arc::new(Generator::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/generate", post(generate_handler))
        .route("/bulk", post(bulk_handler))
        .layer(DefaultBodyLimit::max(state.settings.server.max_upload_bytes))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound, not yet running, server.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(settings: Settings) -> std::io::Result<Self> {
        let address = settings.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            e
        })?;
        let local: SocketAddr = listener.local_addr()?;
        tracing::info!("Listening on {}", local);

        let app = build_router(AppState::new(settings));
        let server = axum::serve(listener, app);

        Ok(Self {
            port: local.port(),
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
