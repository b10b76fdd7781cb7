use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::error::QrError;
use crate::web::templates::IndexTemplate;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Domain failure; shown inline on the generator form.
    #[error(transparent)]
    Qr(#[from] QrError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Session unavailable: {0}")]
    Session(&'static str),

    #[error("Session store error: {0}")]
    SessionStore(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// A blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Qr(QrError::Validation(_)) | AppError::Qr(QrError::ImageDecode(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Qr(QrError::Encoding(_)) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Qr(QrError::Render(_))
            | AppError::Session(_)
            | AppError::SessionStore(_)
            | AppError::Template(_)
            | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Qr(err) => {
                tracing::info!(error = %err, status = status.as_u16(), "request rejected");
                match IndexTemplate::with_error(err.to_string()).render() {
                    Ok(page) => (status, Html(page)).into_response(),
                    Err(e) => {
                        tracing::error!("Failed to render error page: {}", e);
                        (status, err.to_string()).into_response()
                    }
                }
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error = %msg, "bad request");
                (status, self.to_string()).into_response()
            }
            _ => {
                tracing::error!(error = %self, "internal error");
                (status, "Internal server error").into_response()
            }
        }
    }
}
