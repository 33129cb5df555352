use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{AuthUser, ServerState, app, run_with_listener};
pub use session::SessionStore;

mod auth;
mod budgets;
mod expenses;
mod server;
mod session;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AuthMode, AuthPage, Credentials, Dashboard};
    }

    pub mod expense {
        pub use api_types::expense::{
            DateFilter, ExpenseCreated, ExpenseNew, ExpenseUpdate, ExpenseView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{BudgetDelete, BudgetSet, BudgetView};
    }

    pub mod stats {
        pub use api_types::stats::Statistic;
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Unauthorized,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::InvalidAmount(_) | EngineError::InvalidInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Storage(_)
        | EngineError::Serialization(_)
        | EngineError::Password(_)
        | EngineError::Export(_)
        | EngineError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    if err.is_internal() {
        tracing::error!("internal error: {err}");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
