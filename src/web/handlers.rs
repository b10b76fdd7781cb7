use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use validator::Validate;

use crate::bulk::process_batch;
use crate::error::QrError;
use crate::generator::{Generator, DOWNLOAD_FILE_NAME, DOWNLOAD_MIME};
use crate::helper::to_png_bytes;
use crate::payload::build_payload;
use crate::web::error::AppError;
use crate::web::forms::{Action, BulkForm, GenerateForm};
use crate::web::session::{RequireLogin, UserSession};
use crate::web::templates::{BulkRow, BulkTemplate, IndexTemplate, LoginTemplate, ResultTemplate};
use crate::web::AppState;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// What the blocking render task hands back to the async handler.
enum Rendered {
    Download(Vec<u8>),
    Preview {
        image_src: String,
        width: u32,
        height: u32,
    },
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: UserSession,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    if let Err(e) = payload.validate() {
        let page = LoginTemplate {
            error: Some(QrError::from(e).to_string()),
        }
        .render()?;
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
    }

    let auth = &state.settings.auth;
    if payload.username == auth.username && payload.password == auth.password {
        session.login().await?;
        tracing::info!(username = %payload.username, "User logged in");
        return Ok(Redirect::to("/").into_response());
    }

    tracing::info!(username = %payload.username, "Login rejected");
    let page = LoginTemplate {
        error: Some("Invalid username or password".to_string()),
    }
    .render()?;
    Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
}

pub async fn logout_handler(session: UserSession) -> Result<Redirect, AppError> {
    session.logout().await?;
    Ok(Redirect::to("/login"))
}

pub async fn index(_user: RequireLogin) -> impl IntoResponse {
    IndexTemplate::new()
}

/// Generates a single code and either previews it or streams it as a download.
pub async fn generate_handler(
    State(state): State<AppState>,
    _user: RequireLogin,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = GenerateForm::from_multipart(multipart, &state.settings.dynamic.base_url).await?;
    let payload = build_payload(&form.request)?;
    let category = form.request.category;
    let action = form.action;

    let generator = Arc::clone(&state.generator);
    let options = form.options;
    let job_payload = payload.clone();
    let rendered = tokio::task::spawn_blocking(move || -> Result<Rendered, QrError> {
        let img = generator.generate(&job_payload, &options)?;
        let png = to_png_bytes(&img)?;
        Ok(match action {
            Action::Download => Rendered::Download(png),
            Action::Preview => Rendered::Preview {
                image_src: data_uri(&png),
                width: img.width(),
                height: img.height(),
            },
        })
    })
    .await??;

    tracing::info!(category = %category, action = ?action, "QR code served");

    match rendered {
        Rendered::Download(png) => Ok((
            [
                (header::CONTENT_TYPE, DOWNLOAD_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                ),
            ],
            png,
        )
            .into_response()),
        Rendered::Preview {
            image_src,
            width,
            height,
        } => {
            let page = ResultTemplate {
                category: category.label(),
                payload,
                image_src,
                width,
                height,
                file_name: DOWNLOAD_FILE_NAME,
            }
            .render()?;
            Ok(Html(page).into_response())
        }
    }
}

/// Renders one preview (or inline error) per non-empty line of the upload.
pub async fn bulk_handler(
    State(state): State<AppState>,
    _user: RequireLogin,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = BulkForm::from_multipart(multipart, state.settings.server.max_bulk_lines).await?;

    let generator = Arc::clone(&state.generator);
    let rows = tokio::task::spawn_blocking(move || render_rows(&generator, form)).await?;

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    let succeeded = rows.len() - failed;
    tracing::info!(succeeded, failed, "Bulk batch processed");

    let page = BulkTemplate {
        rows,
        succeeded,
        failed,
    }
    .render()?;
    Ok(Html(page).into_response())
}

fn render_rows(generator: &Generator, form: BulkForm) -> Vec<BulkRow> {
    let BulkForm { input, options } = form;
    process_batch(generator, input.lines, &options)
        .map(|item| match item.result.and_then(|img| to_png_bytes(&img)) {
            Ok(png) => BulkRow {
                line: item.line,
                payload: item.payload,
                image_src: Some(data_uri(&png)),
                error: None,
            },
            Err(e) => BulkRow {
                line: item.line,
                payload: item.payload,
                image_src: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

fn data_uri(png: &[u8]) -> String {
    format!("data:{};base64,{}", DOWNLOAD_MIME, STANDARD.encode(png))
}
