//! Core budgeting model and the monthly aggregation engine

pub mod config;
pub mod engine;
pub mod log;
pub mod money;
pub mod month;
pub mod records;
pub mod store;
pub mod taxonomy;
pub mod trends;

// Re-export main types for cleaner imports
pub use engine::{MonthInputs, MonthSummary, Variance, compute_month};
pub use month::MonthKey;
pub use records::{ActualRecord, IncomeEntry, IncomeItem, IncomeSource, IncomeTotals, PlanRecord, Settings};
pub use store::{BudgetSource, load_month_inputs};
pub use taxonomy::{Category, CategoryId, CategoryMap, Section, section_of};
