use crate::core::MonthKey;
use crate::core::records::IncomeSource;
use crate::store::ledger::Ledger;
use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Subcommand)]
pub enum IncomeCommand {
    /// Set the monthly total of a source (0 removes it)
    Set {
        source: IncomeSource,
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        notes: String,
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Record an itemized income
    Add {
        source: String,
        amount: Decimal,
        /// YYYY-MM-DD, first of the month by default
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Delete an itemized income by id
    Remove { id: String },
    /// Copy last month's income totals
    Copy {
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
}

pub async fn run(ledger: &Ledger, command: IncomeCommand) -> Result<()> {
    match command {
        IncomeCommand::Set {
            source,
            amount,
            notes,
            month,
        } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.set_income_total(month, source, amount, &notes).await?;
            println!("Income {source} for {month}: {amount}");
        }
        IncomeCommand::Add {
            source,
            amount,
            date,
            notes,
            month,
        } => {
            // An explicit date decides the month when none is given.
            let month = match (month, date.as_deref()) {
                (Some(month), _) => month,
                (None, Some(date)) => date.get(..7).unwrap_or(date).parse()?,
                (None, None) => MonthKey::current(),
            };
            let item = ledger
                .add_income(month, date.as_deref(), &source, amount, notes.as_deref())
                .await?;
            println!("Added income {} ({})", item.id, IncomeSource::classify(&item.source));
        }
        IncomeCommand::Remove { id } => {
            ledger.remove_income(&id).await?;
            println!("Removed {id}");
        }
        IncomeCommand::Copy { month } => {
            let month = month.unwrap_or_else(MonthKey::current);
            let copied = ledger.copy_previous_income_totals(month).await?;
            println!("Copied {copied} income sources from {}", month.prev());
        }
    }
    Ok(())
}
