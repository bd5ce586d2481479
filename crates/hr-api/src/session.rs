//! Session cookie plumbing.
//!
//! The backend access token is the whole session: it lives in an HttpOnly
//! cookie and is resolved to an [`Actor`] on every request, so handlers
//! receive the current actor as an explicit value instead of reading
//! ambient state.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use hr_core::error::AppError;
use hr_core::models::Actor;
use hr_core::traits::AuthGateway;

pub const SESSION_COOKIE: &str = "hr_session";

pub fn session_cookie(access_token: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, access_token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

pub fn session_token(req: &HttpRequest) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
}

/// Resolves the session cookie to the current actor. `Ok(None)` covers the
/// missing-cookie and stale-token cases; a gateway failure is surfaced as
/// `Internal`, never silently treated as signed-out.
pub async fn current_actor(
    req: &HttpRequest,
    auth: &dyn AuthGateway,
) -> Result<Option<Actor>, AppError> {
    let Some(token) = session_token(req) else {
        return Ok(None);
    };
    auth.actor_for(&token)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))
}

/// The signed-in actor, or `Unauthorized` (rendered as a redirect to the
/// auth page).
pub async fn require_actor(req: &HttpRequest, auth: &dyn AuthGateway) -> Result<Actor, AppError> {
    current_actor(req, auth)
        .await?
        .ok_or_else(|| AppError::Unauthorized("sign in to continue".into()))
}
