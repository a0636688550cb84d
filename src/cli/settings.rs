use super::ui;
use crate::core::MonthKey;
use crate::core::money::format_money;
use crate::core::records::Settings;
use crate::core::store::SettingsStore;
use crate::store::ledger::{Ledger, SettingsUpdate};
use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Subcommand)]
pub enum SettingsCommand {
    /// Show current settings
    Show,
    /// Change one or more settings
    Set {
        /// ISO currency code, e.g. EUR
        #[arg(long)]
        currency: Option<String>,
        /// Savings balance today
        #[arg(long)]
        savings: Option<Decimal>,
        /// Balance to stay above
        #[arg(long)]
        min_savings: Option<Decimal>,
        #[arg(long)]
        salary_day: Option<u8>,
        #[arg(long)]
        start_month: Option<MonthKey>,
    },
}

pub fn display_as_table(settings: &Settings) -> String {
    let currency = &settings.currency;
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Setting"), ui::header_cell("Value")]);
    table.add_row(vec![Cell::new("Currency"), Cell::new(currency)]);
    table.add_row(vec![
        Cell::new("Current savings"),
        Cell::new(format_money(settings.current_savings, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Minimum savings"),
        Cell::new(format_money(settings.min_savings, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Salary day"),
        Cell::new(settings.salary_day),
    ]);
    table.add_row(vec![
        Cell::new("Start month"),
        Cell::new(
            settings
                .start_month
                .map_or_else(|| "-".to_string(), |m| m.to_string()),
        ),
    ]);
    table.to_string()
}

pub async fn run(ledger: &Ledger, command: SettingsCommand) -> Result<()> {
    let settings = match command {
        SettingsCommand::Show => ledger.settings().await?,
        SettingsCommand::Set {
            currency,
            savings,
            min_savings,
            salary_day,
            start_month,
        } => {
            ledger
                .update_settings(SettingsUpdate {
                    currency,
                    current_savings: savings,
                    min_savings,
                    salary_day,
                    start_month,
                })
                .await?
        }
    };
    println!("{}", display_as_table(&settings));
    Ok(())
}
