//! Budgets API endpoints.

use api_types::{
    Success,
    budget::{BudgetDelete, BudgetSet, BudgetView},
};
use axum::{Extension, Form, Json, extract::State};
use engine::Money;

use crate::{ServerError, server::AuthUser, server::ServerState};

fn map_budget(entry: engine::BudgetEntry) -> BudgetView {
    BudgetView {
        month: entry.month,
        category: entry.category,
        amount: entry.amount.to_decimal(),
    }
}

/// Set a budget, creating it when missing.
pub async fn add(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Form(payload): Form<BudgetSet>,
) -> Result<Json<Success>, ServerError> {
    let amount = payload.amount.parse::<Money>()?;
    state
        .engine
        .upsert_budget(&user.username, &payload.month, &payload.category, amount)
        .await?;

    Ok(Json(Success::ok()))
}

/// Change an existing budget; 404 when it was never set.
pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Form(payload): Form<BudgetSet>,
) -> Result<Json<Success>, ServerError> {
    let amount = payload.amount.parse::<Money>()?;
    state
        .engine
        .update_budget(&user.username, &payload.month, &payload.category, amount)
        .await?;

    Ok(Json(Success::ok()))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Form(payload): Form<BudgetDelete>,
) -> Result<Json<Success>, ServerError> {
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (Some(month), Some(category)) = (present(payload.month), present(payload.category)) else {
        return Err(ServerError::Generic(
            "month and category are required".to_string(),
        ));
    };

    state
        .engine
        .delete_budget(&user.username, &month, &category)
        .await?;

    Ok(Json(Success::ok()))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.budgets(&user.username).await?;
    Ok(Json(budgets.into_iter().map(map_budget).collect()))
}
