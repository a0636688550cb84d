//! Read-side interfaces the engine's caller uses to fetch a month snapshot.
//!
//! A missing key is an empty or default record, never an error. Errors are
//! reserved for the storage backend itself failing.

use crate::core::engine::MonthInputs;
use crate::core::month::MonthKey;
use crate::core::records::{ActualRecord, IncomeItem, IncomeTotals, PlanRecord, Settings};
use crate::core::taxonomy::{Category, CategoryMap};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn plan(&self, month: MonthKey) -> Result<PlanRecord>;
}

#[async_trait]
pub trait ActualsStore: Send + Sync {
    async fn actuals(&self, month: MonthKey) -> Result<ActualRecord>;
}

#[async_trait]
pub trait IncomeTotalsStore: Send + Sync {
    async fn income_totals(&self, month: MonthKey) -> Result<IncomeTotals>;
}

#[async_trait]
pub trait IncomeStore: Send + Sync {
    /// Legacy itemized incomes belonging to `month`.
    async fn incomes(&self, month: MonthKey) -> Result<Vec<IncomeItem>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings(&self) -> Result<Settings>;
}

#[async_trait]
pub trait CustomCategories: Send + Sync {
    async fn custom_categories(&self) -> Result<Vec<Category>>;
}

/// Everything needed to assemble [`MonthInputs`].
pub trait BudgetSource:
    PlanStore + ActualsStore + IncomeTotalsStore + IncomeStore + SettingsStore + CustomCategories
{
}

impl<T> BudgetSource for T where
    T: PlanStore
        + ActualsStore
        + IncomeTotalsStore
        + IncomeStore
        + SettingsStore
        + CustomCategories
{
}

/// Fetches one month's snapshot, issuing all reads concurrently.
pub async fn load_month_inputs<S>(source: &S, month: MonthKey) -> Result<MonthInputs>
where
    S: BudgetSource + ?Sized,
{
    debug!(%month, "Loading month inputs");
    let (plan, actuals, income_totals, incomes, settings, custom) = tokio::try_join!(
        source.plan(month),
        source.actuals(month),
        source.income_totals(month),
        source.incomes(month),
        source.settings(),
        source.custom_categories(),
    )?;

    Ok(MonthInputs {
        month,
        plan,
        actuals,
        income_totals,
        incomes,
        settings,
        categories: CategoryMap::merged(&custom),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::{IncomeEntry, IncomeSource};
    use crate::core::taxonomy::Section;
    use rust_decimal_macros::dec;

    /// Fixed in-memory source, one month of data.
    struct FixtureSource {
        month: MonthKey,
    }

    #[async_trait]
    impl PlanStore for FixtureSource {
        async fn plan(&self, month: MonthKey) -> Result<PlanRecord> {
            let mut plan = PlanRecord::empty(month);
            if month == self.month {
                plan.data.insert("living:groceries".to_string(), dec!(300));
            }
            Ok(plan)
        }
    }

    #[async_trait]
    impl ActualsStore for FixtureSource {
        async fn actuals(&self, month: MonthKey) -> Result<ActualRecord> {
            let mut actuals = ActualRecord::empty(month);
            if month == self.month {
                actuals.data.insert("custom:loans:1".to_string(), dec!(75));
            }
            Ok(actuals)
        }
    }

    #[async_trait]
    impl IncomeTotalsStore for FixtureSource {
        async fn income_totals(&self, month: MonthKey) -> Result<IncomeTotals> {
            let mut totals = IncomeTotals::empty(month);
            totals
                .data
                .insert(IncomeSource::Salary, IncomeEntry::new(dec!(2000), ""));
            Ok(totals)
        }
    }

    #[async_trait]
    impl IncomeStore for FixtureSource {
        async fn incomes(&self, _month: MonthKey) -> Result<Vec<IncomeItem>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SettingsStore for FixtureSource {
        async fn settings(&self) -> Result<Settings> {
            Ok(Settings {
                currency: "USD".to_string(),
                ..Settings::default()
            })
        }
    }

    #[async_trait]
    impl CustomCategories for FixtureSource {
        async fn custom_categories(&self) -> Result<Vec<Category>> {
            Ok(vec![Category {
                id: "custom:loans:1".to_string(),
                name: "Student loan".to_string(),
                section: Section::Loans,
                parent_name: String::new(),
            }])
        }
    }

    #[tokio::test]
    async fn test_load_month_inputs() {
        let month: MonthKey = "2025-04".parse().unwrap();
        let source = FixtureSource { month };

        let inputs = load_month_inputs(&source, month).await.unwrap();
        assert_eq!(inputs.month, month);
        assert_eq!(inputs.plan.data.len(), 1);
        assert_eq!(inputs.settings.currency, "USD");
        assert_eq!(inputs.categories.section_of("custom:loans:1"), Section::Loans);
        assert!(inputs.categories.contains("living:groceries"));

        let other = load_month_inputs(&source, month.next()).await.unwrap();
        assert!(other.plan.data.is_empty());
        assert!(other.actuals.data.is_empty());
    }
}
