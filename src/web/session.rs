use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::web::error::AppError;

const AUTHENTICATED_KEY: &str = "authenticated";

/// The caller's session, carrying the logged-in flag.
///
/// Handlers receive it as an extractor instead of reading process-wide state.
#[derive(Clone, Debug)]
pub struct UserSession {
    session: Session,
}

impl UserSession {
    pub async fn is_authenticated(&self) -> Result<bool, AppError> {
        Ok(self
            .session
            .get::<bool>(AUTHENTICATED_KEY)
            .await?
            .unwrap_or(false))
    }

    pub async fn login(&self) -> Result<(), AppError> {
        self.session.insert(AUTHENTICATED_KEY, true).await?;
        Ok(())
    }

    /// Drops the session entirely.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Session(msg))?;
        Ok(Self { session })
    }
}

/// Extractor for routes that need a logged-in session; redirects to `/login` otherwise.
#[derive(Clone, Debug)]
pub struct RequireLogin(pub UserSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = UserSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        match session.is_authenticated().await {
            Ok(true) => Ok(Self(session)),
            Ok(false) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}
