//! Expenses of a user.
//!
//! Each user owns an [`ExpenseLedger`]: the ordered list of expenses plus the
//! last id handed out. Ids come from that counter, so an id is never reused
//! after a delete.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Engine, EngineError, Money, ResultEngine, store::Document};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

impl Expense {
    /// `YYYY-MM` key of the expense date.
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLedger")]
pub struct ExpenseLedger {
    pub last_id: u64,
    pub expenses: Vec<Expense>,
}

/// On-disk shapes of a ledger. Older documents store the bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLedger {
    Current {
        #[serde(default)]
        last_id: u64,
        #[serde(default)]
        expenses: Vec<Expense>,
    },
    Legacy(Vec<Expense>),
}

impl From<StoredLedger> for ExpenseLedger {
    fn from(value: StoredLedger) -> Self {
        let (last_id, expenses) = match value {
            StoredLedger::Current { last_id, expenses } => (last_id, expenses),
            StoredLedger::Legacy(expenses) => (0, expenses),
        };
        let highest = expenses.iter().map(|e| e.id).max().unwrap_or(0);

        Self {
            last_id: last_id.max(highest),
            expenses,
        }
    }
}

pub(crate) type Expenses = BTreeMap<String, ExpenseLedger>;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidInput(format!("\"{value}\" is not a YYYY-MM-DD date")))
}

/// Data for a new expense. The date defaults to today.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: Option<NaiveDate>,
}

/// Replacement values for an existing expense.
#[derive(Clone, Debug)]
pub struct ExpenseUpdate {
    pub id: u64,
    pub amount: Money,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
}

/// Date filter. Either both inclusive bounds are set or nothing is filtered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    bounds: Option<(NaiveDate, NaiveDate)>,
}

impl DateRange {
    /// Every date from `start` through `end`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            bounds: Some((start, end)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds
            .is_none_or(|(start, end)| start <= date && date <= end)
    }
}

impl ExpenseLedger {
    pub fn push(&mut self, new: NewExpense, today: NaiveDate) -> Expense {
        self.last_id += 1;
        let expense = Expense {
            id: self.last_id,
            amount: new.amount,
            category: new.category,
            description: new.description,
            date: new.date.unwrap_or(today),
        };
        self.expenses.push(expense.clone());
        expense
    }

    /// Replace the fields of the first expense with the same id. Returns
    /// `false` if there is none.
    pub fn update(&mut self, update: ExpenseUpdate) -> bool {
        let Some(expense) = self.expenses.iter_mut().find(|e| e.id == update.id) else {
            return false;
        };
        expense.amount = update.amount;
        expense.category = update.category;
        expense.description = update.description;
        expense.date = update.date;
        true
    }

    /// Remove every expense with the given id and return how many were removed.
    pub fn remove(&mut self, id: u64) -> usize {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        before - self.expenses.len()
    }

    pub fn in_range(&self, range: DateRange) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(move |e| range.contains(e.date))
    }
}

impl Engine {
    pub async fn add_expense(&self, username: &str, new: NewExpense) -> ResultEngine<Expense> {
        let today = Local::now().date_naive();
        let expense = self
            .store
            .update(Document::Expenses, |expenses: &mut Expenses| {
                let ledger = expenses.entry(username.to_string()).or_default();
                Ok(ledger.push(new, today))
            })
            .await?;

        tracing::debug!("user {username} added expense {}", expense.id);
        Ok(expense)
    }

    /// Expenses of the user in insertion order, filtered by `range`.
    pub async fn expenses(&self, username: &str, range: DateRange) -> ResultEngine<Vec<Expense>> {
        let expenses: Expenses = self.store.read(Document::Expenses).await?;

        Ok(expenses
            .get(username)
            .map(|ledger| ledger.in_range(range).cloned().collect())
            .unwrap_or_default())
    }

    /// Update an expense in place. An unknown id is not an error: nothing
    /// changes and `false` is returned.
    pub async fn update_expense(&self, username: &str, update: ExpenseUpdate) -> ResultEngine<bool> {
        let id = update.id;
        let found = self
            .store
            .update(Document::Expenses, |expenses: &mut Expenses| {
                Ok(expenses
                    .get_mut(username)
                    .is_some_and(|ledger| ledger.update(update)))
            })
            .await?;

        if !found {
            tracing::debug!("user {username} updated unknown expense {id}");
        }
        Ok(found)
    }

    pub async fn delete_expense(&self, username: &str, id: u64) -> ResultEngine<usize> {
        self.store
            .update(Document::Expenses, |expenses: &mut Expenses| {
                Ok(expenses
                    .get_mut(username)
                    .map_or(0, |ledger| ledger.remove(id)))
            })
            .await
    }
}
