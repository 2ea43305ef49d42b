//! Admin session extractors.
//!
//! The session is a signed token in an HTTP-only cookie. Handlers that take
//! an [`AdminSession`] are gated: without a valid cookie the request is
//! answered with a redirect to the login page.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};

use quill_core::ports::{AuthError, SessionClaims};

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

/// Where unauthenticated admin requests are sent.
pub const LOGIN_PATH: &str = "/admin/login";

/// Role written into admin session tokens.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated admin.
///
/// ```ignore
/// async fn dashboard(session: AdminSession) -> impl Responder {
///     format!("Hello, {}!", session.username)
/// }
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct AdminSession {
    pub username: String,
    pub role: String,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Rejection of a gated request: redirect to the login page.
#[derive(Debug)]
pub struct AuthRedirect(pub AuthError);

impl std::fmt::Display for AuthRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for AuthRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(reason = %self.0, "Redirecting to login");
        redirect(LOGIN_PATH)
    }
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn session_from_request(req: &HttpRequest) -> Result<AdminSession, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::InvalidToken("Server configuration error".to_string())
    })?;

    let cookie = req.cookie(SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
    let claims = state.tokens.validate_token(cookie.value())?;

    if claims.role != ADMIN_ROLE {
        return Err(AuthError::InvalidToken("Not an admin session".to_string()));
    }

    Ok(claims.into())
}

impl FromRequest for AdminSession {
    type Error = AuthRedirect;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req).map_err(AuthRedirect))
    }
}

/// Session if present - public pages use it to show admin links.
pub struct OptionalSession(pub Option<AdminSession>);

impl OptionalSession {
    pub fn as_ref(&self) -> Option<&AdminSession> {
        self.0.as_ref()
    }
}

impl FromRequest for OptionalSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalSession(session_from_request(req).ok())))
    }
}
