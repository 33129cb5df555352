//! Expenses, statistics and CSV export endpoints.

use api_types::{
    Success,
    expense::{DateFilter, ExpenseCreated, ExpenseNew, ExpenseUpdate, ExpenseView},
    stats::Statistic,
};
use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use engine::{DateRange, Money, parse_date};

use crate::{ServerError, server::AuthUser, server::ServerState};

fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        amount: expense.amount.to_decimal(),
        category: expense.category,
        description: expense.description,
        date: expense.date.to_string(),
    }
}

fn map_stats(stats: engine::Statistics) -> Statistic {
    Statistic {
        total: stats.total.to_decimal(),
        by_category: stats
            .by_category
            .into_iter()
            .map(|(category, amount)| (category, amount.to_decimal()))
            .collect(),
        monthly_totals: stats
            .monthly_totals
            .into_iter()
            .map(|(month, amount)| (month, amount.to_decimal()))
            .collect(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The filter applies only when both dates are given; a lone bound is ignored.
fn date_range(filter: &DateFilter) -> Result<DateRange, ServerError> {
    let start = non_empty(filter.start_date.as_deref());
    let end = non_empty(filter.end_date.as_deref());
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange::between(parse_date(start)?, parse_date(end)?)),
        _ => Ok(DateRange::default()),
    }
}

pub async fn add(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Form(payload): Form<ExpenseNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let date = non_empty(payload.date.as_deref())
        .map(parse_date)
        .transpose()?;

    let expense = state
        .engine
        .add_expense(
            &user.username,
            engine::NewExpense {
                amount: payload.amount.parse::<Money>()?,
                category: payload.category,
                description: payload.description,
                date,
            },
        )
        .await?;

    Ok(Json(ExpenseCreated {
        success: true,
        expense: map_expense(expense),
    }))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let range = date_range(&filter)?;
    let expenses = state.engine.expenses(&user.username, range).await?;

    Ok(Json(expenses.into_iter().map(map_expense).collect()))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Form(payload): Form<ExpenseUpdate>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .update_expense(
            &user.username,
            engine::ExpenseUpdate {
                id: payload.id,
                amount: payload.amount.parse::<Money>()?,
                category: payload.category,
                description: payload.description,
                date: parse_date(&payload.date)?,
            },
        )
        .await?;

    Ok(Json(Success::ok()))
}

pub async fn remove(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<Json<Success>, ServerError> {
    state.engine.delete_expense(&user.username, id).await?;
    Ok(Json(Success::ok()))
}

pub async fn stats(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Statistic>, ServerError> {
    let range = date_range(&filter)?;
    let stats = state.engine.statistics(&user.username, range).await?;

    Ok(Json(map_stats(stats)))
}

pub async fn export(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.engine.export_csv(&user.username).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=expenses.csv",
            ),
        ],
        data,
    ))
}
