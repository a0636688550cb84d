use super::ui;
use crate::core::MonthKey;
use crate::core::store::SettingsStore;
use crate::core::trends::{TrendPoint, compute_trend};
use crate::store::ledger::Ledger;
use anyhow::{Result, bail};
use comfy_table::Cell;

pub fn display_as_table(points: &[TrendPoint], currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Planned"),
        ui::header_cell("Actual"),
        ui::header_cell("Delta"),
        ui::header_cell("Net cash"),
    ]);

    for point in points {
        table.add_row(vec![
            Cell::new(point.month.to_string()),
            ui::money_cell(point.planned, currency),
            ui::money_cell(point.actual, currency),
            ui::delta_cell(point.delta(), currency),
            ui::total_cell(point.net_cash, currency),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Spend vs plan", ui::StyleType::Title),
        table
    )
}

pub async fn run(ledger: &Ledger, end: MonthKey, months: usize) -> Result<()> {
    if months == 0 {
        bail!("Trend needs at least one month");
    }
    let (points, settings) = tokio::try_join!(compute_trend(ledger, end, months), ledger.settings())?;
    println!("{}", display_as_table(&points, &settings.currency));
    Ok(())
}
