use super::ui;
use crate::core::money::format_money;
use crate::core::records::AmountMap;
use crate::core::store::load_month_inputs;
use crate::core::taxonomy::{CategoryId, Section};
use crate::core::{MonthKey, MonthSummary, compute_month};
use crate::store::ledger::Ledger;
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

const TOP_SPEND: usize = 5;

#[derive(Debug, PartialEq)]
struct CategoryRow {
    section: Section,
    label: String,
    planned: Decimal,
    actual: Decimal,
}

impl MonthSummary {
    fn overview_table(&self) -> String {
        let currency = &self.currency;
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Cash flow"), ui::header_cell("Amount")]);

        table.add_row(vec![
            Cell::new("Income"),
            ui::money_cell(self.income_total, currency),
        ]);
        table.add_row(vec![
            Cell::new("Spend"),
            ui::money_cell(self.expense_total, currency),
        ]);
        table.add_row(vec![
            Cell::new("Investments (cash out)"),
            ui::money_cell(self.allocations_cash_out, currency),
        ]);
        table.add_row(vec![
            Cell::new("Net cash"),
            ui::total_cell(self.net_cash, currency),
        ]);
        table.add_row(vec![
            Cell::new("Savings now"),
            ui::money_cell(self.savings_now, currency),
        ]);
        table.add_row(vec![
            Cell::new("Savings after month"),
            ui::total_cell(self.savings_after_cash, currency),
        ]);
        table.add_row(vec![
            Cell::new("Minimum savings"),
            ui::money_cell(self.savings_min, currency),
        ]);
        table.to_string()
    }

    fn section_table(&self) -> String {
        let currency = &self.currency;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Section"),
            ui::header_cell("Planned"),
            ui::header_cell("Actual"),
            ui::header_cell("Delta"),
        ]);

        for section in Section::ALL {
            let planned = self.planned(section);
            let actual = self.expense(section);
            let delta = match self.variance(section) {
                Some(v) => ui::delta_cell(v.delta, currency),
                None => ui::allocation_delta_cell(self.allocations_delta, currency),
            };
            table.add_row(vec![
                Cell::new(section.as_str()),
                ui::money_cell(planned, currency),
                ui::money_cell(actual, currency),
                delta,
            ]);
        }

        table.add_row(vec![
            Cell::new(ui::style_text("Spend total", ui::StyleType::TotalLabel)),
            ui::total_cell(self.planned_total, currency),
            ui::total_cell(self.expense_total, currency),
            ui::delta_cell(self.variance_total.delta, currency),
        ]);
        table.to_string()
    }

    /// One row per category with a plan or an actual, or every known
    /// category unless `hide_empty`. Ordered by section then label.
    fn category_rows(&self, planned: &AmountMap, hide_empty: bool) -> Vec<CategoryRow> {
        let categories = &self.category_map;

        let mut ids: BTreeSet<&CategoryId> = planned.keys().collect();
        ids.extend(self.by_category_id.keys());
        if !hide_empty {
            ids.extend(categories.iter().map(|c| &c.id));
        }

        let mut rows: Vec<CategoryRow> = ids
            .into_iter()
            .map(|id| CategoryRow {
                section: categories.section_of(id),
                label: categories.get(id).map_or_else(|| id.clone(), |c| c.label()),
                planned: planned.get(id).copied().unwrap_or(Decimal::ZERO),
                actual: self.by_category_id.get(id).copied().unwrap_or(Decimal::ZERO),
            })
            .collect();
        rows.sort_by(|a, b| a.section.cmp(&b.section).then_with(|| a.label.cmp(&b.label)));
        rows
    }

    fn category_table(&self, planned: &AmountMap, hide_empty: bool) -> String {
        let currency = &self.currency;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell("Section"),
            ui::header_cell("Planned"),
            ui::header_cell("Actual"),
            ui::header_cell("Delta"),
        ]);

        for row in self.category_rows(planned, hide_empty) {
            let delta = row.actual - row.planned;
            let delta = if row.section == Section::Allocations {
                ui::allocation_delta_cell(delta, currency)
            } else {
                ui::delta_cell(delta, currency)
            };
            table.add_row(vec![
                Cell::new(row.label),
                Cell::new(ui::style_text(row.section.as_str(), ui::StyleType::Subtle)),
                ui::money_cell(row.planned, currency),
                ui::money_cell(row.actual, currency),
                delta,
            ]);
        }
        table.to_string()
    }

    /// Renders the month as tables. `planned` is the month's plan, used for
    /// the per-category rows.
    pub fn display_as_table(&self, planned: &AmountMap, hide_empty: bool) -> String {
        let mut output = format!(
            "Month: {} ({})\n\n",
            ui::style_text(&self.month.to_string(), ui::StyleType::Title),
            self.currency
        );

        output.push_str(&self.overview_table());

        let status = if self.savings_ok {
            ui::style_text("above minimum", ui::StyleType::TotalValue)
        } else {
            ui::style_text("below minimum", ui::StyleType::Error)
        };
        output.push_str(&format!(
            "\n{} {status}\n\n",
            ui::style_text("Savings:", ui::StyleType::TotalLabel)
        ));

        output.push_str(&self.section_table());
        output.push_str("\n\n");
        output.push_str(&self.category_table(planned, hide_empty));

        let top = self.top_spend(TOP_SPEND);
        if !top.is_empty() {
            let names: Vec<String> = top
                .iter()
                .map(|(id, v)| {
                    format!(
                        "{} {}",
                        self.category_map.name_of(id),
                        format_money(*v, &self.currency)
                    )
                })
                .collect();
            output.push_str(&format!(
                "\n\n{} {}",
                ui::style_text("Top spend:", ui::StyleType::TotalLabel),
                names.join(", ")
            ));
        }

        output
    }
}

pub async fn run(ledger: &Ledger, month: MonthKey, json: bool, hide_empty: bool) -> Result<()> {
    let inputs = load_month_inputs(ledger, month).await?;
    let summary = compute_month(&inputs);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.display_as_table(&inputs.plan.data, hide_empty));
    }
    Ok(())
}
