use std::{path::PathBuf, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use server::types::{
    budget::BudgetView,
    expense::{ExpenseCreated, ExpenseView},
    stats::Statistic,
};

async fn test_app() -> Router {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_stores")
        .join(format!("server_{}", Uuid::new_v4()));
    let engine = engine::Engine::builder()
        .data_dir(root)
        .build()
        .await
        .unwrap();
    server::app(engine, Duration::from_secs(3600))
}

fn form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Sign up and return the `name=value` pair of the session cookie.
async fn signup(app: &Router, username: &str) -> String {
    let response = send(
        app,
        form(
            "/auth/signup",
            None,
            &format!("username={username}&password=secret&email={username}%40example.com"),
        ),
    )
    .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/dashboard");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn add_september(app: &Router, cookie: &str) {
    for body in [
        "amount=50&category=Education&description=Books&date=2023-09-20",
        "amount=120&category=Home&description=Groceries&date=2023-09-21",
        "amount=30&category=Hobby&description=Movie&date=2023-09-22",
    ] {
        let response = send(app, form("/add_expense", Some(cookie), body)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn api_routes_require_a_session() {
    let app = test_app().await;

    for uri in ["/get_expenses", "/get_stats", "/get_budgets", "/export_expenses"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body: Value = json(response).await;
        assert_eq!(body["error"], "Not authenticated");
    }

    let response = send(&app, form("/add_expense", None, "amount=1&category=a&description=b")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        get(
            "/get_expenses",
            Some(&format!("spendbook_session={}", Uuid::new_v4())),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn page_routes_redirect_to_login() {
    let app = test_app().await;

    let response = send(&app, get("/", None)).await;
    assert_eq!(location(&response), "/auth/login");
    let response = send(&app, get("/dashboard", None)).await;
    assert_eq!(location(&response), "/auth/login");

    let response = send(&app, get("/auth/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, get("/auth/register", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_login_logout() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let response = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(location(&response), "/dashboard");
    let response = send(&app, get("/dashboard", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");

    let expenses: Vec<ExpenseView> = json(send(&app, get("/get_expenses", Some(&cookie))).await).await;
    assert!(expenses.is_empty());
    let budgets: Vec<BudgetView> = json(send(&app, get("/get_budgets", Some(&cookie))).await).await;
    assert!(budgets.is_empty());

    let response = send(&app, get("/logout", Some(&cookie))).await;
    assert_eq!(location(&response), "/auth/login");
    let response = send(&app, get("/get_expenses", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        form("/auth/login", None, "username=alice&password=secret"),
    )
    .await;
    assert_eq!(location(&response), "/dashboard");
    assert!(response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn bad_credentials_and_taken_names() {
    let app = test_app().await;
    signup(&app, "alice").await;

    let response = send(&app, form("/auth/login", None, "username=alice&password=nope")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = send(&app, form("/auth/login", None, "username=bob&password=secret")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, form("/auth/signup", None, "username=alice&password=x")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn expense_crud() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let response = send(
        &app,
        form(
            "/add_expense",
            Some(&cookie),
            "amount=12.5&category=Food&description=Lunch&date=2024-03-01",
        ),
    )
    .await;
    let created: ExpenseCreated = json(response).await;
    assert!(created.success);
    assert_eq!(created.expense.id, 1);
    assert_eq!(created.expense.amount, 12.5);

    let response = send(
        &app,
        form(
            "/update_expense",
            Some(&cookie),
            "id=1&amount=13&category=Food&description=Dinner&date=2024-03-02",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let expenses: Vec<ExpenseView> = json(send(&app, get("/get_expenses", Some(&cookie))).await).await;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].description, "Dinner");
    assert_eq!(expenses[0].date, "2024-03-02");

    let request = Request::builder()
        .method("DELETE")
        .uri("/delete_expense/1")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let body: Value = json(send(&app, request).await).await;
    assert_eq!(body["success"], true);

    let expenses: Vec<ExpenseView> = json(send(&app, get("/get_expenses", Some(&cookie))).await).await;
    assert!(expenses.is_empty());
}

#[tokio::test]
async fn expense_without_date_gets_today() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let response = send(
        &app,
        form("/add_expense", Some(&cookie), "amount=1&category=a&description=b&date="),
    )
    .await;
    let created: ExpenseCreated = json(response).await;
    assert_eq!(created.expense.date.len(), 10);
}

#[tokio::test]
async fn malformed_input_is_rejected() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let response = send(
        &app,
        form("/add_expense", Some(&cookie), "amount=lots&category=a&description=b"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(
        &app,
        form(
            "/add_expense",
            Some(&cookie),
            "amount=1&category=a&description=b&date=20-09-2023",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let uri = "/get_stats?start_date=nope&end_date=2023-09-22";
    let response = send(&app, get(uri, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn stats_reject_totals_past_the_amount_range() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let body = "amount=92233720368547758.07&category=Home&description=Castle&date=2023-09-20";
    for _ in 0..2 {
        let response = send(&app, form("/add_expense", Some(&cookie), body)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, get("/get_stats", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = json(response).await;
    assert!(body["error"].as_str().unwrap().contains("out of range"));

    let response = send(&app, get("/get_expenses", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_scenarios() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;
    add_september(&app, &cookie).await;

    let stats: Statistic = json(send(&app, get("/get_stats", Some(&cookie))).await).await;
    assert_eq!(stats.total, 200.0);
    assert_eq!(stats.by_category["Education"], 50.0);
    assert_eq!(stats.by_category["Home"], 120.0);
    assert_eq!(stats.by_category["Hobby"], 30.0);
    assert_eq!(stats.monthly_totals.len(), 1);
    assert_eq!(stats.monthly_totals["2023-09"], 200.0);

    let uri = "/get_stats?start_date=2023-09-21&end_date=2023-09-22";
    let stats: Statistic = json(send(&app, get(uri, Some(&cookie))).await).await;
    assert_eq!(stats.total, 150.0);

    let uri = "/get_expenses?start_date=2023-09-21&end_date=2023-09-22";
    let expenses: Vec<ExpenseView> = json(send(&app, get(uri, Some(&cookie))).await).await;
    let categories: Vec<_> = expenses.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(categories, vec!["Home", "Hobby"]);

    // a single bound does not filter
    for uri in [
        "/get_expenses?start_date=2023-09-21",
        "/get_expenses?end_date=2023-09-20",
        "/get_expenses?start_date=2023-09-21&end_date=",
    ] {
        let expenses: Vec<ExpenseView> = json(send(&app, get(uri, Some(&cookie))).await).await;
        assert_eq!(expenses.len(), 3, "{uri}");
    }
    let uri = "/get_stats?start_date=2023-09-22";
    let stats: Statistic = json(send(&app, get(uri, Some(&cookie))).await).await;
    assert_eq!(stats.total, 200.0);
}

#[tokio::test]
async fn budgets_flow() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;

    let response = send(
        &app,
        form("/update_budget", Some(&cookie), "month=2024-01&category=Home&amount=400"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        form("/add_budget", Some(&cookie), "month=2024-01&category=Home&amount=500"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(
        &app,
        form("/update_budget", Some(&cookie), "month=2024-01&category=Home&amount=450.5"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let budgets: Vec<BudgetView> = json(send(&app, get("/get_budgets", Some(&cookie))).await).await;
    assert_eq!(
        budgets,
        vec![BudgetView {
            month: "2024-01".to_string(),
            category: "Home".to_string(),
            amount: 450.5,
        }]
    );

    for body in ["month=2024-01", "month=&category=", "month=2024-01&category=%20"] {
        let response = send(&app, form("/delete_budget", Some(&cookie), body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    let response = send(
        &app,
        form("/delete_budget", Some(&cookie), "month=2024-02&category=Home"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(
        &app,
        form("/delete_budget", Some(&cookie), "month=2024-01&category=Home"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let budgets: Vec<BudgetView> = json(send(&app, get("/get_budgets", Some(&cookie))).await).await;
    assert!(budgets.is_empty());
}

#[tokio::test]
async fn csv_export() {
    let app = test_app().await;
    let cookie = signup(&app, "alice").await;
    let response = send(
        &app,
        form(
            "/add_expense",
            Some(&cookie),
            "amount=5&category=Office&description=Pens%2C+paper&date=2024-01-02",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get("/export_expenses", Some(&cookie))).await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=expenses.csv"
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        body,
        "Date,Description,Category,Amount\n2024-01-02,\"Pens, paper\",Office,5.00\n"
    );
}

#[tokio::test]
async fn users_do_not_see_each_other() {
    let app = test_app().await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    add_september(&app, &alice).await;

    let expenses: Vec<ExpenseView> = json(send(&app, get("/get_expenses", Some(&bob))).await).await;
    assert!(expenses.is_empty());
}
