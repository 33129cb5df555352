//! Monthly budgets: one ceiling per (month, category) and user.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{Engine, EngineError, Money, ResultEngine, normalize_required_name, store::Document};

/// `month -> category -> amount`
pub(crate) type MonthlyBudgets = BTreeMap<String, BTreeMap<String, Money>>;
pub(crate) type Budgets = BTreeMap<String, MonthlyBudgets>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetEntry {
    pub month: String,
    pub category: String,
    pub amount: Money,
}

/// Checks a `YYYY-MM` month key.
fn normalize_month(month: &str) -> ResultEngine<String> {
    let month = month.trim();
    let invalid = || EngineError::InvalidInput(format!("\"{month}\" is not a YYYY-MM month"));

    if month.len() != 7 || month.as_bytes()[4] != b'-' {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
    Ok(month.to_string())
}

fn not_found(month: &str, category: &str) -> EngineError {
    EngineError::KeyNotFound(format!("budget {category} in {month}"))
}

fn flatten(months: &MonthlyBudgets) -> Vec<BudgetEntry> {
    months
        .iter()
        .flat_map(|(month, categories)| {
            categories.iter().map(move |(category, amount)| BudgetEntry {
                month: month.clone(),
                category: category.clone(),
                amount: *amount,
            })
        })
        .collect()
}

/// Remove a budget and prune the month and user branches left empty.
fn remove_budget(
    budgets: &mut Budgets,
    username: &str,
    month: &str,
    category: &str,
) -> ResultEngine<Money> {
    let months = budgets
        .get_mut(username)
        .ok_or_else(|| not_found(month, category))?;
    let categories = months
        .get_mut(month)
        .ok_or_else(|| not_found(month, category))?;
    let amount = categories
        .remove(category)
        .ok_or_else(|| not_found(month, category))?;

    if categories.is_empty() {
        months.remove(month);
    }
    if months.is_empty() {
        budgets.remove(username);
    }
    Ok(amount)
}

impl Engine {
    /// Set the budget, creating the month branch when needed.
    pub async fn upsert_budget(
        &self,
        username: &str,
        month: &str,
        category: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        let month = normalize_month(month)?;
        let category = normalize_required_name(category, "category")?;

        self.store
            .update(Document::Budgets, |budgets: &mut Budgets| {
                budgets
                    .entry(username.to_string())
                    .or_default()
                    .entry(month)
                    .or_default()
                    .insert(category, amount);
                Ok(())
            })
            .await
    }

    /// Change an existing budget. Fails with `KeyNotFound` if the budget was
    /// never set.
    pub async fn update_budget(
        &self,
        username: &str,
        month: &str,
        category: &str,
        amount: Money,
    ) -> ResultEngine<()> {
        let month = month.trim();
        let category = category.trim();

        self.store
            .update(Document::Budgets, |budgets: &mut Budgets| {
                let current = budgets
                    .get_mut(username)
                    .and_then(|months| months.get_mut(month))
                    .and_then(|categories| categories.get_mut(category))
                    .ok_or_else(|| not_found(month, category))?;
                *current = amount;
                Ok(())
            })
            .await
    }

    pub async fn delete_budget(
        &self,
        username: &str,
        month: &str,
        category: &str,
    ) -> ResultEngine<()> {
        let month = month.trim();
        let category = category.trim();

        let amount = self
            .store
            .update(Document::Budgets, |budgets: &mut Budgets| {
                remove_budget(budgets, username, month, category)
            })
            .await?;

        tracing::debug!("user {username} removed budget {category} in {month} ({amount})");
        Ok(())
    }

    /// Budgets of the user ordered by month, then category.
    pub async fn budgets(&self, username: &str) -> ResultEngine<Vec<BudgetEntry>> {
        let budgets: Budgets = self.store.read(Document::Budgets).await?;
        Ok(budgets.get(username).map(flatten).unwrap_or_default())
    }
}
