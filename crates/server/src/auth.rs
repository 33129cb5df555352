//! Login, signup, logout and the page routes.

use api_types::auth::{AuthMode, AuthPage, Credentials, Dashboard};
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use engine::EngineError;

use crate::{
    ServerError,
    server::ServerState,
    session::{SessionStore, removal_cookie, session_cookie},
};

const LOGIN_PAGE: &str = "/auth/login";
const DASHBOARD_PAGE: &str = "/dashboard";

fn parse_mode(mode: &str) -> Result<AuthMode, ServerError> {
    match mode {
        "login" => Ok(AuthMode::Login),
        "signup" => Ok(AuthMode::Signup),
        other => Err(EngineError::KeyNotFound(format!("auth mode {other}")).into()),
    }
}

pub async fn home(State(state): State<ServerState>, jar: CookieJar) -> Redirect {
    match state.sessions.resolve(&jar).await {
        Some(_) => Redirect::to(DASHBOARD_PAGE),
        None => Redirect::to(LOGIN_PAGE),
    }
}

pub async fn page(Path(mode): Path<String>) -> Result<Json<AuthPage>, ServerError> {
    Ok(Json(AuthPage {
        mode: parse_mode(&mode)?,
    }))
}

/// Handle the login and signup forms. On success the session cookie is set
/// and the client is sent to the dashboard.
pub async fn submit(
    State(state): State<ServerState>,
    Path(mode): Path<String>,
    jar: CookieJar,
    Form(payload): Form<Credentials>,
) -> Result<(CookieJar, Redirect), ServerError> {
    let username = match parse_mode(&mode)? {
        AuthMode::Login => {
            state
                .engine
                .login(&payload.username, &payload.password)
                .await?
        }
        AuthMode::Signup => {
            state
                .engine
                .signup(&payload.username, &payload.password, payload.email.as_deref())
                .await?
        }
    };

    if let Some(previous) = SessionStore::id_from(&jar) {
        state.sessions.remove(previous).await;
    }
    let id = state.sessions.create(&username).await;
    tracing::info!("user {username} authenticated");

    Ok((jar.add(session_cookie(id)), Redirect::to(DASHBOARD_PAGE)))
}

pub async fn dashboard(State(state): State<ServerState>, jar: CookieJar) -> Response {
    let Some(username) = state.sessions.resolve(&jar).await else {
        return Redirect::to(LOGIN_PAGE).into_response();
    };

    match state.engine.profile(&username).await {
        Ok(profile) => Json(Dashboard {
            username: profile.username,
            email: profile.email,
        })
        .into_response(),
        Err(err) => ServerError::from(err).into_response(),
    }
}

pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(id) = SessionStore::id_from(&jar) {
        state.sessions.remove(id).await;
    }

    (jar.remove(removal_cookie()), Redirect::to(LOGIN_PAGE))
}
