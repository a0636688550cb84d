pub mod cli;
pub mod core;
pub mod store;

use crate::cli::backup::BackupCommand;
use crate::cli::categories::CategoryCommand;
use crate::cli::income::IncomeCommand;
use crate::cli::plan::{ActualCommand, PlanCommand};
use crate::cli::settings::SettingsCommand;
use crate::core::MonthKey;
use crate::core::config::AppConfig;
use crate::store::ledger::Ledger;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Summary {
        month: Option<MonthKey>,
        json: bool,
    },
    Trends {
        month: Option<MonthKey>,
        months: Option<usize>,
    },
    Categories(CategoryCommand),
    Plan(PlanCommand),
    Actual(ActualCommand),
    Income(IncomeCommand),
    Settings(SettingsCommand),
    Backup(BackupCommand),
    Migrate,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Budget dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let ledger = Ledger::new(store::open_store(&config)?);

    match command {
        AppCommand::Summary { month, json } => {
            let month = month.unwrap_or_else(MonthKey::current);
            cli::summary::run(&ledger, month, json, config.display.hide_empty_rows).await
        }
        AppCommand::Trends { month, months } => {
            let month = month.unwrap_or_else(MonthKey::current);
            cli::trends::run(&ledger, month, months.unwrap_or(config.trends.months)).await
        }
        AppCommand::Categories(command) => cli::categories::run(&ledger, command).await,
        AppCommand::Plan(command) => cli::plan::run_plan(&ledger, command).await,
        AppCommand::Actual(command) => cli::plan::run_actual(&ledger, command).await,
        AppCommand::Income(command) => cli::income::run(&ledger, command).await,
        AppCommand::Settings(command) => cli::settings::run(&ledger, command).await,
        AppCommand::Backup(command) => cli::backup::run(&ledger, command).await,
        AppCommand::Migrate => {
            if ledger.migrate_legacy_ids().await? {
                println!("Legacy category ids migrated");
            } else {
                println!("Nothing to migrate");
            }
            Ok(())
        }
    }
}
