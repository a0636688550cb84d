//! Monthly aggregation: folds one month of plan, actuals and income into the
//! figures the dashboard renders.
//!
//! [`compute_month`] is a pure, total function. It never fails: missing
//! entries count as zero and non-positive amounts are coerced to zero.
use crate::core::money::{coerce, round2, sum};
use crate::core::month::MonthKey;
use crate::core::records::{
    ActualRecord, AmountMap, DEFAULT_CURRENCY, IncomeItem, IncomeTotals, PlanRecord, Settings,
};
use crate::core::taxonomy::{CategoryMap, Section, allocation_affects_cash};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Snapshot of everything the engine reads for one month.
#[derive(Debug, Clone)]
pub struct MonthInputs {
    pub month: MonthKey,
    pub plan: PlanRecord,
    pub actuals: ActualRecord,
    pub income_totals: IncomeTotals,
    /// Legacy itemized incomes, used only when `income_totals` is empty.
    pub incomes: Vec<IncomeItem>,
    pub settings: Settings,
    pub categories: CategoryMap,
}

impl MonthInputs {
    /// A month with no records at all.
    pub fn empty(month: MonthKey) -> Self {
        Self {
            month,
            plan: PlanRecord::empty(month),
            actuals: ActualRecord::empty(month),
            income_totals: IncomeTotals::empty(month),
            incomes: Vec::new(),
            settings: Settings::default(),
            categories: CategoryMap::merged(&[]),
        }
    }
}

/// Actual against plan for one consumption dimension. Positive `delta` means
/// over plan; exactly one of `overspend`/`underspend` is nonzero unless both are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variance {
    pub overspend: Decimal,
    pub underspend: Decimal,
    pub delta: Decimal,
}

impl Variance {
    pub fn between(actual: Decimal, planned: Decimal) -> Self {
        let raw = actual - planned;
        Variance {
            overspend: round2(raw.max(Decimal::ZERO)),
            underspend: round2((-raw).max(Decimal::ZERO)),
            delta: round2(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month: MonthKey,
    pub income_total: Decimal,

    pub expense_total: Decimal,
    pub expense_fixed: Decimal,
    pub expense_variable: Decimal,
    pub expense_loans: Decimal,

    pub planned_total: Decimal,
    pub planned_fixed: Decimal,
    pub planned_variable: Decimal,
    pub planned_loans: Decimal,

    pub allocations_actual: Decimal,
    pub allocations_cash_out: Decimal,
    pub planned_allocations: Decimal,
    pub planned_allocations_cash_out: Decimal,
    /// Actual minus planned allocations; positive is favorable.
    pub allocations_delta: Decimal,

    pub net_cash: Decimal,

    pub variance_total: Variance,
    pub variance_fixed: Variance,
    pub variance_variable: Variance,
    pub variance_loans: Variance,

    pub savings_now: Decimal,
    pub savings_min: Decimal,
    pub savings_after_cash: Decimal,
    pub savings_ok: bool,

    pub currency: String,
    pub by_category_id: AmountMap,
    pub spend_by_category_id: AmountMap,
    pub category_map: CategoryMap,
}

impl MonthSummary {
    pub fn variance(&self, section: Section) -> Option<&Variance> {
        match section {
            Section::Fixed => Some(&self.variance_fixed),
            Section::Variable => Some(&self.variance_variable),
            Section::Loans => Some(&self.variance_loans),
            Section::Allocations => None,
        }
    }

    pub fn expense(&self, section: Section) -> Decimal {
        match section {
            Section::Fixed => self.expense_fixed,
            Section::Variable => self.expense_variable,
            Section::Loans => self.expense_loans,
            Section::Allocations => self.allocations_actual,
        }
    }

    pub fn planned(&self, section: Section) -> Decimal {
        match section {
            Section::Fixed => self.planned_fixed,
            Section::Variable => self.planned_variable,
            Section::Loans => self.planned_loans,
            Section::Allocations => self.planned_allocations,
        }
    }

    /// Largest consumption categories by actual spend, largest first.
    pub fn top_spend(&self, limit: usize) -> Vec<(&str, Decimal)> {
        let mut entries: Vec<(&str, Decimal)> = self
            .spend_by_category_id
            .iter()
            .filter(|(_, v)| !v.is_zero())
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

/// Unrounded per-section accumulators for one pass over an amount map.
#[derive(Debug, Default)]
struct SectionTotals {
    fixed: Decimal,
    variable: Decimal,
    loans: Decimal,
    allocations: Decimal,
    allocations_cash_out: Decimal,
}

impl SectionTotals {
    fn fold(amounts: &AmountMap, categories: &CategoryMap) -> Self {
        let mut totals = SectionTotals::default();
        for (id, amount) in amounts {
            let amount = coerce(*amount);
            match categories.section_of(id) {
                Section::Fixed => totals.fixed += amount,
                Section::Variable => totals.variable += amount,
                Section::Loans => totals.loans += amount,
                Section::Allocations => {
                    totals.allocations += amount;
                    if allocation_affects_cash(id) {
                        totals.allocations_cash_out += amount;
                    }
                }
            }
        }
        totals
    }

    fn consumption(&self) -> Decimal {
        self.fixed + self.variable + self.loans
    }
}

fn income_total(inputs: &MonthInputs) -> Decimal {
    if !inputs.income_totals.data.is_empty() {
        sum(inputs.income_totals.data.values().map(|e| e.amount()))
    } else {
        sum(inputs
            .incomes
            .iter()
            .filter(|i| i.belongs_to(inputs.month))
            .map(|i| coerce(i.amount)))
    }
}

/// Computes every derived figure for one month.
pub fn compute_month(inputs: &MonthInputs) -> MonthSummary {
    let categories = &inputs.categories;
    let income = income_total(inputs);
    let actual = SectionTotals::fold(&inputs.actuals.data, categories);
    let planned = SectionTotals::fold(&inputs.plan.data, categories);

    let expense = actual.consumption();
    let planned_spend = planned.consumption();
    let net_cash = income - expense - actual.allocations_cash_out;

    let savings_now = inputs.settings.current_savings;
    let savings_min = round2(inputs.settings.min_savings);
    let savings_after_cash = round2(savings_now + net_cash);

    let by_category_id: AmountMap = inputs
        .actuals
        .data
        .iter()
        .map(|(id, v)| (id.clone(), round2(coerce(*v))))
        .collect();
    let spend_by_category_id: AmountMap = by_category_id
        .iter()
        .filter(|(id, _)| categories.section_of(id).is_consumption())
        .map(|(id, v)| (id.clone(), *v))
        .collect();

    let currency = match inputs.settings.currency.trim() {
        "" => DEFAULT_CURRENCY.to_string(),
        code => code.to_string(),
    };

    let summary = MonthSummary {
        month: inputs.month,
        income_total: round2(income),
        expense_total: round2(expense),
        expense_fixed: round2(actual.fixed),
        expense_variable: round2(actual.variable),
        expense_loans: round2(actual.loans),
        planned_total: round2(planned_spend),
        planned_fixed: round2(planned.fixed),
        planned_variable: round2(planned.variable),
        planned_loans: round2(planned.loans),
        allocations_actual: round2(actual.allocations),
        allocations_cash_out: round2(actual.allocations_cash_out),
        planned_allocations: round2(planned.allocations),
        planned_allocations_cash_out: round2(planned.allocations_cash_out),
        allocations_delta: round2(actual.allocations - planned.allocations),
        net_cash: round2(net_cash),
        variance_total: Variance::between(expense, planned_spend),
        variance_fixed: Variance::between(actual.fixed, planned.fixed),
        variance_variable: Variance::between(actual.variable, planned.variable),
        variance_loans: Variance::between(actual.loans, planned.loans),
        savings_now: round2(savings_now),
        savings_min,
        savings_after_cash,
        savings_ok: savings_after_cash >= savings_min,
        currency,
        by_category_id,
        spend_by_category_id,
        category_map: categories.clone(),
    };

    debug!(
        month = %summary.month,
        income = %summary.income_total,
        spend = %summary.expense_total,
        net_cash = %summary.net_cash,
        "Computed month summary"
    );
    summary
}
