//! Budget records on top of a [`Store`]: the read interfaces the engine's
//! caller needs, plus validated writes.
//!
//! Values are JSON. Monthly records are keyed by their month (`YYYY-MM`).

use super::{KeyValueCollection, Store};
use crate::core::money::{normalize_map, round2, validate_amount};
use crate::core::month::MonthKey;
use crate::core::records::{
    ActualRecord, AmountMap, IncomeEntry, IncomeItem, IncomeSource, IncomeTotals, PlanRecord,
    Settings,
};
use crate::core::store::{
    ActualsStore, CustomCategories, IncomeStore, IncomeTotalsStore, PlanStore, SettingsStore,
};
use crate::core::taxonomy::{CUSTOM_PREFIX, Category, CategoryId, CategoryMap, Section};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, info};

pub(crate) const PLANS: &str = "plans";
pub(crate) const ACTUALS: &str = "actuals";
pub(crate) const INCOME_TOTALS: &str = "income_totals";
pub(crate) const INCOMES: &str = "incomes";
pub(crate) const SETTINGS: &str = "settings";
pub(crate) const CUSTOM_CATEGORIES: &str = "custom_categories";
const META: &str = "meta";

const SETTINGS_KEY: &str = "settings";
const MIGRATION_FLAG: &str = "migrated:v1-allocations";
const MAX_CATEGORY_NAME: usize = 40;

/// Partial settings change; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub current_savings: Option<Decimal>,
    pub min_savings: Option<Decimal>,
    pub salary_day: Option<u8>,
    pub start_month: Option<MonthKey>,
}

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
}

impl Ledger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        self.store.collection(name)
    }

    async fn read<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        match self.collection(collection)?.get(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt record {collection}/{key}"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, collection: &str, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.collection(collection)?.put(key, bytes).await
    }

    async fn read_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.collection(collection)?
            .entries()
            .await?
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt record {collection}/{key}"))
            })
            .collect()
    }

    /// Next unused id of a named sequence, formatted `<name>:<n>`. Ids
    /// already present in `collection` (e.g. restored from a backup) are
    /// skipped.
    async fn next_id(&self, sequence: &str, collection: &str) -> Result<String> {
        let key = format!("seq:{sequence}");
        let target = self.collection(collection)?;
        let mut next: u64 = self.read(META, &key).await?.unwrap_or(0) + 1;
        loop {
            let id = format!("{sequence}:{next}");
            if target.get(&id).await?.is_none() {
                self.write(META, &key, &next).await?;
                return Ok(id);
            }
            next += 1;
        }
    }

    pub async fn category_map(&self) -> Result<CategoryMap> {
        Ok(CategoryMap::merged(&self.custom_categories().await?))
    }

    async fn known_category(&self, id: &str) -> Result<CategoryMap> {
        let categories = self.category_map().await?;
        if !categories.contains(id) {
            bail!("Unknown category: {id}");
        }
        Ok(categories)
    }

    // Plans and actuals

    pub async fn set_plan(&self, month: MonthKey, data: &AmountMap) -> Result<()> {
        let record = PlanRecord {
            month_key: month,
            data: normalize_map(data),
        };
        self.write(PLANS, &month.to_string(), &record).await?;
        debug!(%month, entries = record.data.len(), "Saved plan");
        Ok(())
    }

    pub async fn set_actuals(&self, month: MonthKey, data: &AmountMap) -> Result<()> {
        let record = ActualRecord {
            month_key: month,
            data: normalize_map(data),
        };
        self.write(ACTUALS, &month.to_string(), &record).await?;
        debug!(%month, entries = record.data.len(), "Saved actuals");
        Ok(())
    }

    /// Sets one planned amount. Zero removes the entry.
    pub async fn set_plan_amount(&self, month: MonthKey, id: &str, amount: Decimal) -> Result<()> {
        self.known_category(id).await?;
        let mut plan = self.plan(month).await?;
        apply_amount(&mut plan.data, id, amount)?;
        self.set_plan(month, &plan.data).await?;
        info!(%month, category = id, %amount, "Plan updated");
        Ok(())
    }

    /// Sets one actual amount. Zero removes the entry.
    pub async fn set_actual_amount(&self, month: MonthKey, id: &str, amount: Decimal) -> Result<()> {
        self.known_category(id).await?;
        let mut actuals = self.actuals(month).await?;
        apply_amount(&mut actuals.data, id, amount)?;
        self.set_actuals(month, &actuals.data).await?;
        info!(%month, category = id, %amount, "Actual updated");
        Ok(())
    }

    /// Copies last month's plan into `month`, either entirely or for one
    /// section. Returns the number of categories copied.
    pub async fn copy_previous_plan(&self, month: MonthKey, section: Option<Section>) -> Result<usize> {
        let categories = self.category_map().await?;
        let previous = self.plan(month.prev()).await?;
        let mut plan = self.plan(month).await?;

        let mut copied = 0;
        match section {
            Some(section) => {
                for category in categories.in_section(section) {
                    match previous.data.get(&category.id) {
                        Some(amount) => {
                            plan.data.insert(category.id.clone(), *amount);
                            copied += 1;
                        }
                        None => {
                            plan.data.remove(&category.id);
                        }
                    }
                }
            }
            None => {
                copied = previous.data.len();
                plan.data = previous.data;
            }
        }

        self.set_plan(month, &plan.data).await?;
        info!(%month, copied, "Copied previous plan");
        Ok(copied)
    }

    /// Sets actuals to the planned amounts for every planned category in the
    /// given sections. Returns the number of entries written.
    pub async fn prefill_actuals_from_plan(&self, month: MonthKey, sections: &[Section]) -> Result<usize> {
        let categories = self.category_map().await?;
        let plan = self.plan(month).await?;
        let mut actuals = self.actuals(month).await?;

        let mut filled = 0;
        for (id, amount) in &plan.data {
            if sections.contains(&categories.section_of(id)) {
                actuals.data.insert(id.clone(), *amount);
                filled += 1;
            }
        }

        self.set_actuals(month, &actuals.data).await?;
        info!(%month, filled, "Prefilled actuals from plan");
        Ok(filled)
    }

    /// Removes plan and actual entries of `month`, all or those of one section.
    pub async fn clear_month(&self, month: MonthKey, section: Option<Section>) -> Result<()> {
        let categories = self.category_map().await?;
        let mut plan = self.plan(month).await?;
        let mut actuals = self.actuals(month).await?;

        let keep = |id: &CategoryId| section.is_some_and(|s| categories.section_of(id) != s);
        plan.data.retain(|id, _| keep(id));
        actuals.data.retain(|id, _| keep(id));

        self.set_plan(month, &plan.data).await?;
        self.set_actuals(month, &actuals.data).await?;
        info!(%month, section = ?section, "Cleared month");
        Ok(())
    }

    /// Writes a small starter plan for `month`.
    pub async fn seed_sample_plan(&self, month: MonthKey) -> Result<()> {
        let sample = [
            ("living:groceries", Decimal::new(300, 0)),
            ("living:transport", Decimal::new(80, 0)),
            ("living:dining", Decimal::new(120, 0)),
            ("insurance:health", Decimal::new(50, 0)),
            ("utilities:energy", Decimal::new(70, 0)),
            ("allocations:investment", Decimal::new(100, 0)),
        ];
        let data: AmountMap = sample.iter().map(|(id, v)| (id.to_string(), *v)).collect();
        self.set_plan(month, &data).await?;
        self.set_actuals(month, &AmountMap::new()).await?;
        info!(%month, "Seeded sample plan");
        Ok(())
    }

    pub async fn plan_months(&self) -> Result<Vec<PlanRecord>> {
        self.read_all(PLANS).await
    }

    pub async fn actual_months(&self) -> Result<Vec<ActualRecord>> {
        self.read_all(ACTUALS).await
    }

    // Income

    /// Sets the monthly total of one income source. Zero removes it.
    pub async fn set_income_total(
        &self,
        month: MonthKey,
        source: IncomeSource,
        amount: Decimal,
        notes: &str,
    ) -> Result<()> {
        let mut totals = self.income_totals(month).await?;
        if amount.is_zero() {
            totals.data.remove(&source);
        } else {
            let amount = validate_amount(amount)?;
            totals
                .data
                .insert(source, IncomeEntry::new(amount, notes.trim()));
        }
        self.write(INCOME_TOTALS, &month.to_string(), &totals).await?;
        info!(%month, %source, %amount, "Income total updated");
        Ok(())
    }

    /// Copies last month's income totals into `month`.
    pub async fn copy_previous_income_totals(&self, month: MonthKey) -> Result<usize> {
        let previous = self.income_totals(month.prev()).await?;
        let totals = IncomeTotals {
            month_key: month,
            data: previous.data,
        };
        self.write(INCOME_TOTALS, &month.to_string(), &totals).await?;
        info!(%month, copied = totals.data.len(), "Copied previous income totals");
        Ok(totals.data.len())
    }

    pub async fn all_income_totals(&self) -> Result<Vec<IncomeTotals>> {
        self.read_all(INCOME_TOTALS).await
    }

    /// Records an itemized income. The date defaults to the first of the month.
    pub async fn add_income(
        &self,
        month: MonthKey,
        date: Option<&str>,
        source: &str,
        amount: Decimal,
        notes: Option<&str>,
    ) -> Result<IncomeItem> {
        let amount = validate_amount(amount)?;
        let source = source.trim();
        if source.is_empty() {
            bail!("Income source required");
        }
        let date = match date {
            Some(d) => {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date {d}, expected YYYY-MM-DD"))?;
                d.to_string()
            }
            None => month.first_day().format("%Y-%m-%d").to_string(),
        };

        let item = IncomeItem {
            id: self.next_id(INCOMES, INCOMES).await?,
            month_key: Some(month),
            date: Some(date),
            source: source.to_string(),
            amount,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };
        self.write(INCOMES, &item.id, &item).await?;
        info!(%month, id = %item.id, %amount, "Income added");
        Ok(item)
    }

    pub async fn remove_income(&self, id: &str) -> Result<()> {
        let collection = self.collection(INCOMES)?;
        if collection.get(id).await?.is_none() {
            bail!("Income not found: {id}");
        }
        collection.remove(id).await?;
        info!(id, "Income removed");
        Ok(())
    }

    pub async fn all_incomes(&self) -> Result<Vec<IncomeItem>> {
        let mut items: Vec<IncomeItem> = self.read_all(INCOMES).await?;
        items.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    // Settings

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.settings().await?;

        if let Some(currency) = update.currency {
            let currency = currency.trim().to_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("Invalid currency code: {currency}");
            }
            settings.currency = currency;
        }
        if let Some(savings) = update.current_savings {
            if savings.is_sign_negative() {
                bail!("Current savings cannot be negative");
            }
            settings.current_savings = round2(savings);
        }
        if let Some(min) = update.min_savings {
            if min.is_sign_negative() {
                bail!("Minimum savings cannot be negative");
            }
            settings.min_savings = round2(min);
        }
        if let Some(day) = update.salary_day {
            if !(1..=31).contains(&day) {
                bail!("Salary day must be between 1 and 31");
            }
            settings.salary_day = day;
        }
        if let Some(start) = update.start_month {
            settings.start_month = Some(start);
        }

        self.write(SETTINGS, SETTINGS_KEY, &settings).await?;
        info!(currency = %settings.currency, "Settings updated");
        Ok(settings)
    }

    pub(crate) async fn replace_settings(&self, settings: &Settings) -> Result<()> {
        self.write(SETTINGS, SETTINGS_KEY, settings).await
    }

    // Custom categories

    pub async fn add_custom_category(&self, section: Section, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Name required");
        }
        if name.chars().count() > MAX_CATEGORY_NAME {
            bail!("Keep category names under {MAX_CATEGORY_NAME} characters");
        }

        let id = self
            .next_id(&format!("{CUSTOM_PREFIX}{section}"), CUSTOM_CATEGORIES)
            .await?;
        let category = Category {
            id,
            name: name.to_string(),
            section,
            parent_name: section.to_string(),
        };
        self.write(CUSTOM_CATEGORIES, &category.id, &category).await?;
        info!(id = %category.id, %section, "Custom category added");
        Ok(category)
    }

    /// Removes a custom category, refusing while `month` still has a plan or
    /// actual amount for it.
    pub async fn remove_custom_category(&self, id: &str, month: MonthKey) -> Result<()> {
        let collection = self.collection(CUSTOM_CATEGORIES)?;
        if collection.get(id).await?.is_none() {
            bail!("Not a custom category: {id}");
        }

        let (plan, actuals) = tokio::try_join!(self.plan(month), self.actuals(month))?;
        let in_use = |data: &AmountMap| data.get(id).is_some_and(|v| !v.is_zero());
        if in_use(&plan.data) || in_use(&actuals.data) {
            bail!("Category {id} is in use in {month}; clear its amounts first");
        }

        collection.remove(id).await?;
        info!(id, "Custom category removed");
        Ok(())
    }

    // Maintenance

    /// Renames the retired `special:investments` id to
    /// `allocations:investment` in every stored plan and actual. Runs once.
    pub async fn migrate_legacy_ids(&self) -> Result<bool> {
        if self.read::<bool>(META, MIGRATION_FLAG).await?.unwrap_or(false) {
            debug!("Legacy id migration already applied");
            return Ok(false);
        }

        const FROM: &str = "special:investments";
        const TO: &str = "allocations:investment";

        let mut renamed = 0;
        for mut plan in self.plan_months().await? {
            if let Some(amount) = plan.data.remove(FROM) {
                *plan.data.entry(TO.to_string()).or_insert(Decimal::ZERO) += amount;
                self.set_plan(plan.month_key, &plan.data).await?;
                renamed += 1;
            }
        }
        for mut actuals in self.actual_months().await? {
            if let Some(amount) = actuals.data.remove(FROM) {
                *actuals.data.entry(TO.to_string()).or_insert(Decimal::ZERO) += amount;
                self.set_actuals(actuals.month_key, &actuals.data).await?;
                renamed += 1;
            }
        }

        self.write(META, MIGRATION_FLAG, &true).await?;
        info!(renamed, "Migrated legacy category ids");
        Ok(true)
    }

    pub(crate) async fn clear_collections(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.collection(name)?.clear().await?;
        }
        Ok(())
    }

    pub(crate) async fn put_raw<T: Serialize>(&self, collection: &str, key: &str, value: &T) -> Result<()> {
        self.write(collection, key, value).await
    }
}

fn apply_amount(data: &mut AmountMap, id: &str, amount: Decimal) -> Result<()> {
    if amount.is_zero() {
        data.remove(id);
    } else {
        data.insert(id.to_string(), validate_amount(amount)?);
    }
    Ok(())
}

#[async_trait]
impl PlanStore for Ledger {
    async fn plan(&self, month: MonthKey) -> Result<PlanRecord> {
        Ok(self
            .read(PLANS, &month.to_string())
            .await?
            .unwrap_or_else(|| PlanRecord::empty(month)))
    }
}

#[async_trait]
impl ActualsStore for Ledger {
    async fn actuals(&self, month: MonthKey) -> Result<ActualRecord> {
        Ok(self
            .read(ACTUALS, &month.to_string())
            .await?
            .unwrap_or_else(|| ActualRecord::empty(month)))
    }
}

#[async_trait]
impl IncomeTotalsStore for Ledger {
    async fn income_totals(&self, month: MonthKey) -> Result<IncomeTotals> {
        Ok(self
            .read(INCOME_TOTALS, &month.to_string())
            .await?
            .unwrap_or_else(|| IncomeTotals::empty(month)))
    }
}

#[async_trait]
impl IncomeStore for Ledger {
    async fn incomes(&self, month: MonthKey) -> Result<Vec<IncomeItem>> {
        Ok(self
            .all_incomes()
            .await?
            .into_iter()
            .filter(|i| i.belongs_to(month))
            .collect())
    }
}

#[async_trait]
impl SettingsStore for Ledger {
    async fn settings(&self) -> Result<Settings> {
        Ok(self.read(SETTINGS, SETTINGS_KEY).await?.unwrap_or_default())
    }
}

#[async_trait]
impl CustomCategories for Ledger {
    async fn custom_categories(&self) -> Result<Vec<Category>> {
        self.read_all(CUSTOM_CATEGORIES).await
    }
}
