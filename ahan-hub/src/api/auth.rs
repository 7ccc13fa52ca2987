//! Session middleware and login endpoints
//!
//! `attach_session` resolves the request's session cookie to a live session;
//! only a successful `POST /login` opens one and `POST /logout` closes it.
//! `require_admin` redirects to `/login` unless the session's admin flag is
//! `"true"`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::session::{
    expired_session_cookie, session_cookie, session_token, AuthContext, SessionAuth,
};
use crate::AppState;

/// Token of the live session attached to the current request
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
}

/// Attach the request's session, if its cookie names a live one.
/// Unknown or missing tokens leave the request without a session.
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(request.headers()) {
        if state.sessions.contains(&token).await {
            request.extensions_mut().insert(SessionToken(token));
        }
    }

    next.run(request).await
}

/// Admin guard: `303 See Other` to `/login` without an authenticated session
pub async fn require_admin(
    State(state): State<AppState>,
    session: Option<Extension<SessionToken>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(Extension(session)) = session {
        if SessionAuth::new(&state.sessions, &session.0)
            .is_authenticated()
            .await
        {
            return next.run(request).await;
        }
    }

    Redirect::to("/login").into_response()
}

/// GET /login
pub async fn login_status(
    State(state): State<AppState>,
    session: Option<Extension<SessionToken>>,
) -> Json<AuthStatus> {
    let authenticated = match session {
        Some(Extension(session)) => {
            SessionAuth::new(&state.sessions, &session.0)
                .is_authenticated()
                .await
        }
        None => false,
    };
    Json(AuthStatus { authenticated })
}

/// POST /login
///
/// Reuses the caller's live session, otherwise opens one and sets its cookie.
/// Rejected credentials open nothing.
pub async fn login(
    State(state): State<AppState>,
    session: Option<Extension<SessionToken>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    if !state.credentials.verify(&request.username, &request.password) {
        warn!("Rejected admin login for user '{}'", request.username);
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    }

    let (token, is_new) = match session {
        Some(Extension(session)) => (session.0, false),
        None => (state.sessions.open_session().await, true),
    };

    SessionAuth::new(&state.sessions, &token).login().await;
    info!("Admin '{}' logged in", request.username);

    let mut response = Json(AuthStatus {
        authenticated: true,
    })
    .into_response();
    if is_new {
        set_cookie(&mut response, &session_cookie(&token));
    }
    Ok(response)
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    session: Option<Extension<SessionToken>>,
) -> Response {
    let mut response = Json(AuthStatus {
        authenticated: false,
    })
    .into_response();

    if let Some(Extension(session)) = session {
        SessionAuth::new(&state.sessions, &session.0).logout().await;
        state.sessions.close_session(&session.0).await;
        set_cookie(&mut response, &expired_session_cookie());
        info!("Admin logged out");
    }

    response
}

fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Failed to encode session cookie: {}", e),
    }
}

/// Build login/logout routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_status).post(login))
        .route("/logout", post(logout))
}
