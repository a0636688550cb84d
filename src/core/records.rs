//! Per-month records and user settings as the persistence layer stores them.

use crate::core::money;
use crate::core::month::MonthKey;
use crate::core::taxonomy::CategoryId;
use anyhow::anyhow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

pub type AmountMap = BTreeMap<CategoryId, Decimal>;

/// Planned amounts per category for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub month_key: MonthKey,
    #[serde(default)]
    pub data: AmountMap,
}

impl PlanRecord {
    pub fn empty(month_key: MonthKey) -> Self {
        Self {
            month_key,
            data: AmountMap::new(),
        }
    }
}

/// Actual spend per category for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualRecord {
    pub month_key: MonthKey,
    #[serde(default)]
    pub data: AmountMap,
}

impl ActualRecord {
    pub fn empty(month_key: MonthKey) -> Self {
        Self {
            month_key,
            data: AmountMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeSource {
    Salary,
    Rent,
    Reimbursements,
    Investments,
    Other,
}

impl IncomeSource {
    pub const ALL: [IncomeSource; 5] = [
        IncomeSource::Salary,
        IncomeSource::Rent,
        IncomeSource::Reimbursements,
        IncomeSource::Investments,
        IncomeSource::Other,
    ];

    /// Buckets a free-text income source from an itemized entry.
    pub fn classify(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("salary") || text.contains("wage") || text.contains("payroll") {
            IncomeSource::Salary
        } else if text.contains("rent") {
            IncomeSource::Rent
        } else if text.contains("reimb") {
            IncomeSource::Reimbursements
        } else if ["invest", "dividend", "interest"]
            .iter()
            .any(|k| text.contains(k))
        {
            IncomeSource::Investments
        } else {
            IncomeSource::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeSource::Salary => "salary",
            IncomeSource::Rent => "rent",
            IncomeSource::Reimbursements => "reimbursements",
            IncomeSource::Investments => "investments",
            IncomeSource::Other => "other",
        }
    }
}

impl Display for IncomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncomeSource::ALL
            .into_iter()
            .find(|src| src.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| anyhow!("Invalid income source: {s}"))
    }
}

/// A stored income total. Older records hold a bare number, newer ones an
/// object with notes; anything else is kept but counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncomeEntry {
    Amount(Decimal),
    Detailed {
        #[serde(default)]
        amount: Option<Decimal>,
        #[serde(default)]
        notes: String,
    },
    Unrecognized(serde_json::Value),
}

impl IncomeEntry {
    pub fn new(amount: Decimal, notes: impl Into<String>) -> Self {
        IncomeEntry::Detailed {
            amount: Some(amount),
            notes: notes.into(),
        }
    }

    /// Canonical amount, zero for anything that is not a positive number.
    pub fn amount(&self) -> Decimal {
        match self {
            IncomeEntry::Amount(v) => money::coerce(*v),
            IncomeEntry::Detailed { amount, .. } => amount.map_or(Decimal::ZERO, money::coerce),
            IncomeEntry::Unrecognized(_) => Decimal::ZERO,
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            IncomeEntry::Detailed { notes, .. } => notes,
            _ => "",
        }
    }
}

/// Monthly income totals per fixed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTotals {
    pub month_key: MonthKey,
    #[serde(default)]
    pub data: BTreeMap<IncomeSource, IncomeEntry>,
}

impl IncomeTotals {
    pub fn empty(month_key: MonthKey) -> Self {
        Self {
            month_key,
            data: BTreeMap::new(),
        }
    }
}

/// Itemized income entry from before monthly totals existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeItem {
    pub id: String,
    #[serde(default)]
    pub month_key: Option<MonthKey>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: String,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl IncomeItem {
    /// Items are matched by their month key, or by date when they have none.
    pub fn belongs_to(&self, month: MonthKey) -> bool {
        match (self.month_key, self.date.as_deref()) {
            (Some(key), _) => key == month,
            (None, Some(date)) => month.contains_date(date),
            (None, None) => false,
        }
    }
}

pub const DEFAULT_CURRENCY: &str = "EUR";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_salary_day() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, alias = "bufferNow")]
    pub current_savings: Decimal,
    #[serde(default, alias = "bufferMin")]
    pub min_savings: Decimal,
    /// Informational only.
    #[serde(default = "default_salary_day")]
    pub salary_day: u8,
    #[serde(default)]
    pub start_month: Option<MonthKey>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: default_currency(),
            current_savings: Decimal::ZERO,
            min_savings: Decimal::ZERO,
            salary_day: default_salary_day(),
            start_month: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_income_entry_shapes() {
        let json = r#"{
            "monthKey": "2025-01",
            "data": {
                "salary": {"amount": "3000.00", "notes": "net"},
                "rent": 450.5,
                "other": "12.10",
                "investments": {"notes": "pending"},
                "reimbursements": [1, 2]
            }
        }"#;
        let totals: IncomeTotals = serde_json::from_str(json).unwrap();
        assert_eq!(totals.data.len(), 5);
        assert_eq!(totals.data[&IncomeSource::Salary].amount(), dec!(3000.00));
        assert_eq!(totals.data[&IncomeSource::Salary].notes(), "net");
        assert_eq!(totals.data[&IncomeSource::Rent].amount(), dec!(450.5));
        assert_eq!(totals.data[&IncomeSource::Other].amount(), dec!(12.10));
        assert_eq!(
            totals.data[&IncomeSource::Investments].amount(),
            Decimal::ZERO
        );
        assert_eq!(
            totals.data[&IncomeSource::Reimbursements].amount(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_negative_income_counts_as_zero() {
        assert_eq!(IncomeEntry::Amount(dec!(-10)).amount(), Decimal::ZERO);
        assert_eq!(IncomeEntry::new(dec!(-1), "").amount(), Decimal::ZERO);
    }

    #[test]
    fn test_classify_income_source() {
        assert_eq!(IncomeSource::classify("Monthly Salary"), IncomeSource::Salary);
        assert_eq!(IncomeSource::classify("Flat rent"), IncomeSource::Rent);
        assert_eq!(
            IncomeSource::classify("Travel reimbursement"),
            IncomeSource::Reimbursements
        );
        assert_eq!(IncomeSource::classify("ETF dividend"), IncomeSource::Investments);
        assert_eq!(IncomeSource::classify("Birthday gift"), IncomeSource::Other);
        assert_eq!("Rent".parse::<IncomeSource>().unwrap(), IncomeSource::Rent);
    }

    #[test]
    fn test_income_item_month_matching() {
        let jan: MonthKey = "2025-01".parse().unwrap();
        let mut item = IncomeItem {
            id: "incomes:1".to_string(),
            month_key: None,
            date: Some("2025-01-15".to_string()),
            source: "Salary".to_string(),
            amount: dec!(1500),
            notes: None,
        };
        assert!(item.belongs_to(jan));
        assert!(!item.belongs_to(jan.next()));

        item.month_key = Some(jan.next());
        assert!(!item.belongs_to(jan));
    }

    #[test]
    fn test_settings_legacy_aliases() {
        let settings: Settings =
            serde_json::from_str(r#"{"bufferNow": "2500", "bufferMin": 1000}"#).unwrap();
        assert_eq!(settings.current_savings, dec!(2500));
        assert_eq!(settings.min_savings, dec!(1000));
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.salary_day, 1);
    }

    #[test]
    fn test_missing_data_defaults_empty() {
        let plan: PlanRecord = serde_json::from_str(r#"{"monthKey": "2025-03"}"#).unwrap();
        assert!(plan.data.is_empty());
    }
}
