#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use qrstudio::config::Settings;
use qrstudio::web::{build_router, AppState};
use tower::ServiceExt;

pub const BOUNDARY: &str = "qrstudio-test-boundary";
pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "hunter2";

pub const DYNAMIC_BASE_URL: &str = "https://dyn.test/d";

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.username = USERNAME.to_string();
    settings.auth.password = PASSWORD.to_string();
    settings.dynamic.base_url = DYNAMIC_BASE_URL.to_string();
    settings
}

pub fn create_test_app() -> Router {
    create_test_app_with(test_settings())
}

pub fn create_test_app_with(settings: Settings) -> Router {
    build_router(AppState::new(settings))
}

/// Reverses the entity escaping askama applies to interpolated text.
pub fn unescape_html(text: &str) -> String {
    text.replace("&#x2f;", "/")
        .replace("&#47;", "/")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", username, password)))
        .unwrap()
}

/// Logs in and returns the `name=value` session cookie.
pub async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(login_request(USERNAME, PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let disposition = format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                );
                body.extend_from_slice(disposition.as_bytes());
                let content_type = format!("Content-Type: {}\r\n\r\n", content_type);
                body.extend_from_slice(content_type.as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, cookie: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
