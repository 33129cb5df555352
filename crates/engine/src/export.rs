//! CSV export of a user's expenses.

use csv::Writer;
use serde::Serialize;

use crate::{DateRange, Engine, Expense, ResultEngine};

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
}

/// Encode expenses as CSV with a `Date,Description,Category,Amount` header.
pub fn expenses_to_csv(expenses: &[Expense]) -> ResultEngine<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    if expenses.is_empty() {
        writer.write_record(["Date", "Description", "Category", "Amount"])?;
    }
    for expense in expenses {
        writer.serialize(ExportRow {
            date: expense.date.to_string(),
            description: &expense.description,
            category: &expense.category,
            amount: expense.amount.to_string(),
        })?;
    }

    writer.into_inner().map_err(|err| err.into_error().into())
}

impl Engine {
    pub async fn export_csv(&self, username: &str) -> ResultEngine<Vec<u8>> {
        let expenses = self.expenses(username, DateRange::default()).await?;
        tracing::debug!("exporting {} expenses of {username}", expenses.len());
        expenses_to_csv(&expenses)
    }
}
