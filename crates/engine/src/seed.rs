//! Demo data for a fresh installation.

use chrono::NaiveDate;

use crate::{Engine, EngineError, Money, NewExpense, ResultEngine, store::Document};

pub const DEMO_USERNAME: &str = "user1";
pub const DEMO_PASSWORD: &str = "password123";
const DEMO_EMAIL: &str = "user1@example.com";

const DEMO_EXPENSES: [(i64, &str, &str, (i32, u32, u32)); 3] = [
    (5000, "Education", "Books", (2023, 9, 20)),
    (12000, "Home", "Groceries", (2023, 9, 21)),
    (3000, "Hobby", "Movie", (2023, 9, 22)),
];

impl Engine {
    /// Create the demo user and its expenses if no user was ever stored.
    ///
    /// Returns `true` when the demo data was written.
    pub async fn seed_demo(&self) -> ResultEngine<bool> {
        if self.store.exists(Document::Users).await? {
            return Ok(false);
        }

        let username = self
            .signup(DEMO_USERNAME, DEMO_PASSWORD, Some(DEMO_EMAIL))
            .await?;
        for (cents, category, description, (year, month, day)) in DEMO_EXPENSES {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| EngineError::InvalidInput("invalid demo date".to_string()))?;
            self.add_expense(
                &username,
                NewExpense {
                    amount: Money::new(cents),
                    category: category.to_string(),
                    description: description.to_string(),
                    date: Some(date),
                },
            )
            .await?;
        }

        tracing::info!("seeded demo user {username}");
        Ok(true)
    }
}
