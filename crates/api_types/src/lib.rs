//! Payloads exchanged with the HTTP server.
//!
//! Write endpoints take `application/x-www-form-urlencoded` bodies, read
//! endpoints answer JSON. Amounts are decimal numbers in responses and
//! decimal strings (`12.34` or `12,34`) in forms.

use serde::{Deserialize, Serialize};

/// Generic `{"success": true}` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `{"error": "..."}` body of every failed API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod auth {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AuthMode {
        Login,
        Signup,
    }

    /// Form posted to `/auth/{mode}`. `email` is only read on signup.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthPage {
        pub mode: AuthMode,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub username: String,
        pub email: Option<String>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: String,
        pub category: String,
        pub description: String,
        /// `YYYY-MM-DD`; today when missing or empty.
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub id: u64,
        pub amount: String,
        pub category: String,
        pub description: String,
        pub date: String,
    }

    /// Query of `/get_expenses` and `/get_stats`. Empty values are ignored.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DateFilter {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: u64,
        pub amount: f64,
        pub category: String,
        pub description: String,
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub success: bool,
        pub expense: ExpenseView,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSet {
        pub month: String,
        pub category: String,
        pub amount: String,
    }

    /// Form of `/delete_budget`. Both fields are required; they are optional
    /// here so a missing one is reported as a bad request.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetDelete {
        pub month: Option<String>,
        pub category: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetView {
        pub month: String,
        pub category: String,
        pub amount: f64,
    }
}

pub mod stats {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistic {
        pub total: f64,
        pub by_category: BTreeMap<String, f64>,
        pub monthly_totals: BTreeMap<String, f64>,
    }
}
