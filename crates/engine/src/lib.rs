//! Domain services of Spendbook.
//!
//! The [`Engine`] owns the [`Store`] and exposes the user, expense, budget and
//! statistics operations. Every operation loads the document it needs, and
//! writes go through [`Store::update`] so each load-mutate-save cycle is
//! serialized per document.

use std::path::PathBuf;

pub use budgets::BudgetEntry;
pub use error::EngineError;
pub use expenses::{DateRange, Expense, ExpenseLedger, ExpenseUpdate, NewExpense, parse_date};
pub use money::Money;
pub use seed::{DEMO_PASSWORD, DEMO_USERNAME};
pub use stats::Statistics;
pub use store::{Document, Store};
pub use users::{Profile, User};

mod budgets;
mod error;
mod expenses;
mod export;
mod money;
mod password;
mod seed;
mod stats;
mod store;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug)]
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    data_dir: Option<PathBuf>,
}

impl EngineBuilder {
    /// Directory where the JSON documents live. Defaults to `data`.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> EngineBuilder {
        self.data_dir = Some(path.into());
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let root = self
            .data_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!("using data directory {}", root.display());

        Ok(Engine {
            store: Store::new(root),
        })
    }
}
