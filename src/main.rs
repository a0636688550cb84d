use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pfdash::cli::backup::BackupCommand;
use pfdash::cli::categories::CategoryCommand;
use pfdash::cli::income::IncomeCommand;
use pfdash::cli::plan::{ActualCommand, PlanCommand};
use pfdash::cli::settings::SettingsCommand;
use pfdash::core::MonthKey;
use pfdash::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for pfdash::AppCommand {
    fn from(cmd: Commands) -> pfdash::AppCommand {
        match cmd {
            Commands::Summary { month, json } => pfdash::AppCommand::Summary { month, json },
            Commands::Trends { month, months } => pfdash::AppCommand::Trends { month, months },
            Commands::Categories { action } => pfdash::AppCommand::Categories(action),
            Commands::Plan { action } => pfdash::AppCommand::Plan(action),
            Commands::Actual { action } => pfdash::AppCommand::Actual(action),
            Commands::Income { action } => pfdash::AppCommand::Income(action),
            Commands::Settings { action } => pfdash::AppCommand::Settings(action),
            Commands::Backup { action } => pfdash::AppCommand::Backup(action),
            Commands::Migrate => pfdash::AppCommand::Migrate,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the month's budget summary
    Summary {
        /// Month as YYYY-MM, current month by default
        #[arg(short, long)]
        month: Option<MonthKey>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display spend against plan over recent months
    Trends {
        /// Last month of the window
        #[arg(short, long)]
        month: Option<MonthKey>,
        /// Window length, from the config by default
        #[arg(short = 'n', long)]
        months: Option<usize>,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryCommand,
    },
    /// Edit planned amounts
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
    /// Edit actual amounts
    Actual {
        #[command(subcommand)]
        action: ActualCommand,
    },
    /// Edit income
    Income {
        #[command(subcommand)]
        action: IncomeCommand,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Export or import a JSON backup
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },
    /// Rename retired category ids in stored records
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pfdash::cli::setup::setup(),
        Some(cmd) => pfdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
