//! JSON export and import of the whole ledger.

use super::ledger::{
    ACTUALS, CUSTOM_CATEGORIES, INCOME_TOTALS, INCOMES, Ledger, PLANS, SETTINGS,
};
use crate::core::records::{ActualRecord, IncomeItem, IncomeTotals, PlanRecord, Settings};
use crate::core::store::{CustomCategories, SettingsStore};
use crate::core::taxonomy::Category;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub exported_at: i64,
    #[serde(default)]
    pub plans: Vec<PlanRecord>,
    #[serde(default)]
    pub actuals: Vec<ActualRecord>,
    #[serde(default)]
    pub incomes: Vec<IncomeItem>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default, alias = "customCats")]
    pub custom_categories: Vec<Category>,
    #[serde(default)]
    pub income_totals: Vec<IncomeTotals>,
}

impl Backup {
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write backup: {}", path.display()))
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read backup: {}", path.display()))?;
        let backup: Backup = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse backup: {}", path.display()))?;
        if backup.version != BACKUP_VERSION {
            bail!("Unsupported backup version {}", backup.version);
        }
        Ok(backup)
    }
}

pub async fn export(ledger: &Ledger) -> Result<Backup> {
    let (plans, actuals, incomes, settings, custom_categories, income_totals) = tokio::try_join!(
        ledger.plan_months(),
        ledger.actual_months(),
        ledger.all_incomes(),
        ledger.settings(),
        ledger.custom_categories(),
        ledger.all_income_totals(),
    )?;

    Ok(Backup {
        version: BACKUP_VERSION,
        exported_at: Utc::now().timestamp_millis(),
        plans,
        actuals,
        incomes,
        settings: Some(settings),
        custom_categories,
        income_totals,
    })
}

/// Loads a backup into the ledger. Without `merge` every collection is
/// cleared first; with it, records in the backup overwrite those with the
/// same key and everything else is kept.
pub async fn import(ledger: &Ledger, backup: Backup, merge: bool) -> Result<()> {
    if !merge {
        ledger
            .clear_collections(&[
                PLANS,
                ACTUALS,
                INCOMES,
                SETTINGS,
                CUSTOM_CATEGORIES,
                INCOME_TOTALS,
            ])
            .await?;
    }

    for plan in &backup.plans {
        ledger.set_plan(plan.month_key, &plan.data).await?;
    }
    for actuals in &backup.actuals {
        ledger.set_actuals(actuals.month_key, &actuals.data).await?;
    }
    for totals in &backup.income_totals {
        ledger
            .put_raw(INCOME_TOTALS, &totals.month_key.to_string(), totals)
            .await?;
    }
    for item in &backup.incomes {
        ledger.put_raw(INCOMES, &item.id, item).await?;
    }
    for category in &backup.custom_categories {
        ledger.put_raw(CUSTOM_CATEGORIES, &category.id, category).await?;
    }
    if let Some(settings) = &backup.settings {
        ledger.replace_settings(settings).await?;
    }

    info!(
        plans = backup.plans.len(),
        actuals = backup.actuals.len(),
        incomes = backup.incomes.len(),
        merge,
        "Imported backup"
    );
    Ok(())
}
