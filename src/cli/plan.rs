use crate::core::MonthKey;
use crate::core::taxonomy::Section;
use crate::store::ledger::Ledger;
use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Subcommand)]
pub enum PlanCommand {
    /// Set the planned amount of a category (0 removes it)
    Set {
        category: String,
        amount: Decimal,
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Copy last month's plan
    Copy {
        #[arg(short, long)]
        month: Option<MonthKey>,
        /// Only copy this section
        #[arg(short, long)]
        section: Option<Section>,
    },
    /// Remove plan and actual amounts of the month
    Clear {
        #[arg(short, long)]
        month: Option<MonthKey>,
        #[arg(short, long)]
        section: Option<Section>,
    },
    /// Write a starter plan
    Sample {
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ActualCommand {
    /// Set the actual amount of a category (0 removes it)
    Set {
        category: String,
        amount: Decimal,
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Copy planned amounts into actuals
    Prefill {
        #[arg(short, long)]
        month: Option<MonthKey>,
        /// Sections to prefill, fixed and loans by default
        #[arg(short, long, value_delimiter = ',')]
        sections: Vec<Section>,
    },
}

pub async fn run_plan(ledger: &Ledger, command: PlanCommand) -> Result<()> {
    match command {
        PlanCommand::Set {
            category,
            amount,
            month,
        } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.set_plan_amount(month, &category, amount).await?;
            println!("Planned {category} for {month}: {amount}");
        }
        PlanCommand::Copy { month, section } => {
            let month = month.unwrap_or_else(MonthKey::current);
            let copied = ledger.copy_previous_plan(month, section).await?;
            println!("Copied {copied} categories from {}", month.prev());
        }
        PlanCommand::Clear { month, section } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.clear_month(month, section).await?;
            println!("Cleared {month}");
        }
        PlanCommand::Sample { month } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.seed_sample_plan(month).await?;
            println!("Sample plan written for {month}");
        }
    }
    Ok(())
}

pub async fn run_actual(ledger: &Ledger, command: ActualCommand) -> Result<()> {
    match command {
        ActualCommand::Set {
            category,
            amount,
            month,
        } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.set_actual_amount(month, &category, amount).await?;
            println!("Recorded {category} for {month}: {amount}");
        }
        ActualCommand::Prefill { month, sections } => {
            let month = month.unwrap_or_else(MonthKey::current);
            let sections = if sections.is_empty() {
                vec![Section::Fixed, Section::Loans]
            } else {
                sections
            };
            let filled = ledger.prefill_actuals_from_plan(month, &sections).await?;
            println!("Prefilled {filled} categories for {month}");
        }
    }
    Ok(())
}
