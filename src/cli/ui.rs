use crate::core::money::format_money;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use rust_decimal::Decimal;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned money cell. Zero is dimmed.
pub fn money_cell(value: Decimal, currency: &str) -> Cell {
    let cell = Cell::new(format_money(value, currency)).set_alignment(CellAlignment::Right);
    if value.is_zero() {
        cell.fg(Color::DarkGrey)
    } else {
        cell
    }
}

/// Bold money cell for totals rows.
pub fn total_cell(value: Decimal, currency: &str) -> Cell {
    Cell::new(format_money(value, currency))
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Right)
}

/// Spend delta (actual minus planned): overspend is red, underspend green.
pub fn delta_cell(delta: Decimal, currency: &str) -> Cell {
    signed_cell(delta, currency, Color::Red, Color::Green)
}

/// Allocation delta: allocating more than planned is good news.
pub fn allocation_delta_cell(delta: Decimal, currency: &str) -> Cell {
    signed_cell(delta, currency, Color::Green, Color::Red)
}

fn signed_cell(delta: Decimal, currency: &str, above: Color, below: Color) -> Cell {
    let text = if delta.is_sign_positive() && !delta.is_zero() {
        format!("+{}", format_money(delta, currency))
    } else {
        format_money(delta, currency)
    };
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if delta.is_zero() {
        cell.fg(Color::DarkGrey)
    } else if delta.is_sign_positive() {
        cell.fg(above)
    } else {
        cell.fg(below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_delta_cell_sign() {
        assert_eq!(delta_cell(dec!(20.5), "EUR").content(), "+20.50 €");
        assert_eq!(delta_cell(dec!(-3), "EUR").content(), "-3.00 €");
        assert_eq!(delta_cell(Decimal::ZERO, "EUR").content(), "0.00 €");
    }

    #[test]
    fn test_money_cell() {
        assert_eq!(money_cell(dec!(1234.5), "USD").content(), "1,234.50 $");
        assert_eq!(total_cell(dec!(10), "CHF").content(), "10.00 CHF");
    }
}
