use crate::store::backup::{self, Backup};
use crate::store::ledger::Ledger;
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Clone, Subcommand)]
pub enum BackupCommand {
    /// Write every record to a JSON file
    Export { path: PathBuf },
    /// Load a JSON backup, replacing existing data unless --merge
    Import {
        path: PathBuf,
        #[arg(long)]
        merge: bool,
    },
}

pub async fn run(ledger: &Ledger, command: BackupCommand) -> Result<()> {
    match command {
        BackupCommand::Export { path } => {
            let data = backup::export(ledger).await?;
            data.write_to_path(&path)?;
            println!(
                "Exported {} plans, {} actuals to {}",
                data.plans.len(),
                data.actuals.len(),
                path.display()
            );
        }
        BackupCommand::Import { path, merge } => {
            let data = Backup::read_from_path(&path)?;
            backup::import(ledger, data, merge).await?;
            println!("Imported {}", path.display());
        }
    }
    Ok(())
}
