use super::ui;
use crate::core::MonthKey;
use crate::core::taxonomy::{CategoryMap, Section};
use crate::store::ledger::Ledger;
use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;

#[derive(Debug, Clone, Subcommand)]
pub enum CategoryCommand {
    /// List static and custom categories
    List {
        /// Only this section
        #[arg(short, long)]
        section: Option<Section>,
    },
    /// Add a custom category
    Add { section: Section, name: String },
    /// Remove a custom category that has no amounts in the month
    Remove {
        id: String,
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
}

pub fn display_as_table(categories: &CategoryMap, section: Option<Section>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Name"),
        ui::header_cell("Section"),
    ]);

    for s in Section::ALL {
        if section.is_some_and(|wanted| wanted != s) {
            continue;
        }
        for category in categories.in_section(s) {
            let id = if category.is_custom() {
                Cell::new(&category.id)
            } else {
                Cell::new(ui::style_text(&category.id, ui::StyleType::Subtle))
            };
            table.add_row(vec![id, Cell::new(category.label()), Cell::new(s.as_str())]);
        }
    }
    table.to_string()
}

pub async fn run(ledger: &Ledger, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::List { section } => {
            let categories = ledger.category_map().await?;
            println!("{}", display_as_table(&categories, section));
        }
        CategoryCommand::Add { section, name } => {
            let category = ledger.add_custom_category(section, &name).await?;
            println!("Added {} ({})", category.name, category.id);
        }
        CategoryCommand::Remove { id, month } => {
            let month = month.unwrap_or_else(MonthKey::current);
            ledger.remove_custom_category(&id, month).await?;
            println!("Removed {id}");
        }
    }
    Ok(())
}
