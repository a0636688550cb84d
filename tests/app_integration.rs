use pfdash::AppCommand;
use pfdash::cli::backup::BackupCommand;
use pfdash::cli::categories::CategoryCommand;
use pfdash::cli::income::IncomeCommand;
use pfdash::cli::plan::{ActualCommand, PlanCommand};
use pfdash::cli::settings::SettingsCommand;
use pfdash::core::config::AppConfig;
use pfdash::core::records::IncomeSource;
use pfdash::core::store::load_month_inputs;
use pfdash::core::{MonthKey, compute_month};
use pfdash::store::{ledger::Ledger, open_store};
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use super::*;

    /// Writes a config pointing the data directory into `dir`.
    pub fn write_config(dir: &Path) -> String {
        let data_path = dir.join("data");
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
            data_path: "{}"
            trends:
              months: 2
            display:
              hide_zero: true
            "#,
            data_path.display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path.to_string_lossy().to_string()
    }

    pub async fn run(command: AppCommand, config_path: &str) {
        let result = pfdash::run_command(command, Some(config_path)).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }

    pub async fn summary(config_path: &str, month: MonthKey) -> pfdash::core::MonthSummary {
        let config = AppConfig::load_from_path(config_path).unwrap();
        let ledger = Ledger::new(open_store(&config).unwrap());
        let inputs = load_month_inputs(&ledger, month).await.unwrap();
        compute_month(&inputs)
    }
}

fn jan() -> MonthKey {
    "2025-01".parse().unwrap()
}

#[test_log::test(tokio::test)]
async fn test_full_month_flow() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path());

    let commands = vec![
        AppCommand::Settings(SettingsCommand::Set {
            currency: Some("EUR".to_string()),
            savings: Some(dec!(5000)),
            min_savings: Some(dec!(2000)),
            salary_day: None,
            start_month: None,
        }),
        AppCommand::Income(IncomeCommand::Set {
            source: IncomeSource::Salary,
            amount: dec!(3000),
            notes: String::new(),
            month: Some(jan()),
        }),
        AppCommand::Plan(PlanCommand::Set {
            category: "housing:mortgage_rent".to_string(),
            amount: dec!(900),
            month: Some(jan()),
        }),
        AppCommand::Plan(PlanCommand::Set {
            category: "living:groceries".to_string(),
            amount: dec!(300),
            month: Some(jan()),
        }),
        AppCommand::Actual(ActualCommand::Prefill {
            month: Some(jan()),
            sections: vec![],
        }),
        AppCommand::Actual(ActualCommand::Set {
            category: "living:groceries".to_string(),
            amount: dec!(320.50),
            month: Some(jan()),
        }),
        AppCommand::Actual(ActualCommand::Set {
            category: "allocations:investment".to_string(),
            amount: dec!(200),
            month: Some(jan()),
        }),
        AppCommand::Summary {
            month: Some(jan()),
            json: false,
        },
        AppCommand::Summary {
            month: Some(jan()),
            json: true,
        },
        AppCommand::Trends {
            month: Some(jan().next()),
            months: None,
        },
    ];
    for command in commands {
        info!(?command, "Running");
        test_utils::run(command, &config_path).await;
    }

    let summary = test_utils::summary(&config_path, jan()).await;
    assert_eq!(summary.income_total, dec!(3000));
    assert_eq!(summary.expense_total, dec!(1220.50));
    assert_eq!(summary.net_cash, dec!(1579.50));
    assert_eq!(summary.savings_after_cash, dec!(6579.50));
    assert!(summary.savings_ok);
}

#[test_log::test(tokio::test)]
async fn test_categories_and_backup_flow() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path());
    let backup_path = dir.path().join("backup.json");

    test_utils::run(
        AppCommand::Categories(CategoryCommand::Add {
            section: pfdash::core::Section::Loans,
            name: "Student loan".to_string(),
        }),
        &config_path,
    )
    .await;
    test_utils::run(
        AppCommand::Actual(ActualCommand::Set {
            category: "custom:loans:1".to_string(),
            amount: dec!(150),
            month: Some(jan()),
        }),
        &config_path,
    )
    .await;
    test_utils::run(
        AppCommand::Categories(CategoryCommand::List { section: None }),
        &config_path,
    )
    .await;

    // In use, so removal is refused
    let result = pfdash::run_command(
        AppCommand::Categories(CategoryCommand::Remove {
            id: "custom:loans:1".to_string(),
            month: Some(jan()),
        }),
        Some(&config_path),
    )
    .await;
    assert!(result.is_err());

    test_utils::run(
        AppCommand::Backup(BackupCommand::Export {
            path: backup_path.clone(),
        }),
        &config_path,
    )
    .await;
    test_utils::run(
        AppCommand::Plan(PlanCommand::Clear {
            month: Some(jan()),
            section: None,
        }),
        &config_path,
    )
    .await;
    assert_eq!(
        test_utils::summary(&config_path, jan()).await.expense_loans,
        dec!(0)
    );

    test_utils::run(
        AppCommand::Backup(BackupCommand::Import {
            path: backup_path,
            merge: false,
        }),
        &config_path,
    )
    .await;
    let summary = test_utils::summary(&config_path, jan()).await;
    assert_eq!(summary.expense_loans, dec!(150));
    assert_eq!(summary.net_cash, dec!(-150));

    test_utils::run(AppCommand::Migrate, &config_path).await;
}

#[test_log::test(tokio::test)]
async fn test_invalid_input_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path());

    let result = pfdash::run_command(
        AppCommand::Plan(PlanCommand::Set {
            category: "not:a:category".to_string(),
            amount: dec!(10),
            month: Some(jan()),
        }),
        Some(&config_path),
    )
    .await;
    assert!(result.is_err());

    let result = pfdash::run_command(
        AppCommand::Trends {
            month: Some(jan()),
            months: Some(0),
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_err());

    let result = pfdash::run_command(AppCommand::Summary { month: None, json: false }, Some("/nonexistent/config.yaml")).await;
    assert!(result.is_err());
}
