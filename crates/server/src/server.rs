use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::extract::CookieJar;

use std::{sync::Arc, time::Duration};

use crate::{ServerError, auth, budgets, expenses, session::SessionStore};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub sessions: SessionStore,
}

/// Identity of the request, set by the session middleware on protected
/// routes.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

async fn require_session(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(username) = state.sessions.resolve(&jar).await else {
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(AuthUser { username });
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/add_expense", post(expenses::add))
        .route("/get_expenses", get(expenses::list))
        .route("/update_expense", post(expenses::update))
        .route("/delete_expense/{id}", delete(expenses::remove))
        .route("/get_stats", get(expenses::stats))
        .route("/export_expenses", get(expenses::export))
        .route("/add_budget", post(budgets::add))
        .route("/update_budget", post(budgets::update))
        .route("/delete_budget", post(budgets::remove))
        .route("/get_budgets", get(budgets::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(auth::home))
        .route("/auth/{mode}", get(auth::page).post(auth::submit))
        .route("/dashboard", get(auth::dashboard))
        .route("/logout", get(auth::logout))
        .merge(api)
        .with_state(state)
}

/// Build the application router.
pub fn app(engine: Engine, session_ttl: Duration) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        sessions: SessionStore::new(session_ttl),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    session_ttl: Duration,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, session_ttl)).await
}
