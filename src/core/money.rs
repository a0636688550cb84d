//! Exact decimal helpers shared by the engine and the ledger.
//!
//! Every monetary figure is a [`Decimal`]. Figures handed to callers carry
//! exactly two fraction digits; partial sums stay unrounded until exposed.

use anyhow::{Result, bail};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Rounds to two fraction digits (half away from zero) and pins the scale to 2.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Exact sum of the given amounts. An empty input sums to zero.
pub fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, v| acc + v)
}

/// Treats anything that is not a positive amount as zero.
pub fn coerce(value: Decimal) -> Decimal {
    if value.is_sign_positive() && !value.is_zero() {
        value
    } else {
        Decimal::ZERO
    }
}

/// Validates an amount entered by the user: it must be positive. The result
/// is rounded to two fraction digits.
pub fn validate_amount(value: Decimal) -> Result<Decimal> {
    if value <= Decimal::ZERO {
        bail!("Amount must be positive, got {value}");
    }
    Ok(round2(value))
}

/// Normalizes a category amount map the way stored records expect it:
/// non-positive entries are dropped and the rest rounded to two digits.
pub fn normalize_map<K: Ord + Clone>(data: &BTreeMap<K, Decimal>) -> BTreeMap<K, Decimal> {
    data.iter()
        .filter(|(_, v)| **v > Decimal::ZERO)
        .map(|(k, v)| (k.clone(), round2(*v)))
        .filter(|(_, v)| !v.is_zero())
        .collect()
}

/// Known currency symbols. Unknown codes are displayed as-is.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "EUR" => Some("€"),
        "USD" | "AUD" | "CAD" => Some("$"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats an amount for display, e.g. `1,234.50 €`. Falls back to the raw
/// currency code when no symbol is known.
pub fn format_money(value: Decimal, currency: &str) -> String {
    let value = round2(value);
    let negative = value.is_sign_negative() && !value.is_zero();
    let digits = value.abs().to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    let unit = currency_symbol(currency).unwrap_or(currency);
    format!("{sign}{grouped}.{frac_part} {unit}")
}
