//! Consumption actual vs. planned across consecutive months.

use crate::core::engine::compute_month;
use crate::core::month::MonthKey;
use crate::core::store::{BudgetSource, load_month_inputs};
use anyhow::Result;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: MonthKey,
    /// Actual consumption spend, allocations excluded.
    pub actual: Decimal,
    pub planned: Decimal,
    pub net_cash: Decimal,
}

impl TrendPoint {
    pub fn delta(&self) -> Decimal {
        self.actual - self.planned
    }
}

/// Trend over the `months` months ending with `end`, oldest first. Each month
/// is loaded concurrently and aggregated independently.
pub async fn compute_trend<S>(source: &S, end: MonthKey, months: usize) -> Result<Vec<TrendPoint>>
where
    S: BudgetSource + ?Sized,
{
    let window = end.window(months);
    debug!(%end, months, "Computing trend");

    let inputs = try_join_all(window.iter().map(|m| load_month_inputs(source, *m))).await?;

    Ok(inputs
        .iter()
        .map(|i| {
            let s = compute_month(i);
            TrendPoint {
                month: s.month,
                actual: s.expense_total,
                planned: s.planned_total,
                net_cash: s.net_cash,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ledger::Ledger;
    use crate::store::memory::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_trend_window() {
        let ledger = Ledger::new(Arc::new(MemoryStore::new()));
        let mar: MonthKey = "2025-03".parse().unwrap();
        let jan = mar.prev().prev();

        ledger
            .set_plan_amount(jan, "living:groceries", dec!(300))
            .await
            .unwrap();
        ledger
            .set_actual_amount(jan, "living:groceries", dec!(340))
            .await
            .unwrap();
        ledger
            .set_actual_amount(mar, "allocations:savings", dec!(500))
            .await
            .unwrap();

        let trend = compute_trend(&ledger, mar, 3).await.unwrap();
        let months: Vec<String> = trend.iter().map(|p| p.month.to_string()).collect();
        assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);

        assert_eq!(trend[0].actual, dec!(340));
        assert_eq!(trend[0].delta(), dec!(40));
        assert_eq!(trend[0].net_cash, dec!(-340));
        assert_eq!(trend[1].actual, Decimal::ZERO);
        // Allocations are not spend
        assert_eq!(trend[2].actual, Decimal::ZERO);
        assert_eq!(trend[2].net_cash, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_trend_crosses_year() {
        let ledger = Ledger::new(Arc::new(MemoryStore::new()));
        let feb: MonthKey = "2025-02".parse().unwrap();
        let trend = compute_trend(&ledger, feb, 4).await.unwrap();
        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0].month.to_string(), "2024-11");
    }
}
