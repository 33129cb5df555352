//! Expense statistics.

use std::collections::BTreeMap;

use crate::{DateRange, Engine, EngineError, Expense, Money, ResultEngine};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total: Money,
    pub by_category: BTreeMap<String, Money>,
    /// Keyed by `YYYY-MM`.
    pub monthly_totals: BTreeMap<String, Money>,
}

fn accumulate(slot: &mut Money, amount: Money) -> ResultEngine<()> {
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("total is out of range".to_string()))?;
    Ok(())
}

impl Statistics {
    /// Fails with `InvalidAmount` when any sum leaves the cents range.
    pub fn from_expenses<'a>(
        expenses: impl IntoIterator<Item = &'a Expense>,
    ) -> ResultEngine<Self> {
        expenses
            .into_iter()
            .try_fold(Statistics::default(), |mut stats, expense| {
                accumulate(&mut stats.total, expense.amount)?;
                accumulate(
                    stats.by_category.entry(expense.category.clone()).or_default(),
                    expense.amount,
                )?;
                accumulate(
                    stats.monthly_totals.entry(expense.month()).or_default(),
                    expense.amount,
                )?;
                Ok(stats)
            })
    }
}

impl Engine {
    pub async fn statistics(&self, username: &str, range: DateRange) -> ResultEngine<Statistics> {
        let expenses = self.expenses(username, range).await?;
        Statistics::from_expenses(&expenses)
    }
}
