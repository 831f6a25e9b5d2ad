//! # Pricing
//!
//! Prices come from free-text spreadsheet cells ("$45.00", "200", "call us").
//! Parsing strips everything that is not a digit, `.` or `-` and converts the
//! rest as a float.
//!
//! Two defaults apply when nothing numeric remains:
//!
//! - a **base price** becomes `None` ("unknown / free text"), never zero;
//! - an **option delta** becomes `0.0` ("no change").
//!
//! ## Unit Price
//!
//! | Base | Option | Unit price |
//! |------|--------|------------|
//! | `Some(b)` | none | `b` |
//! | `Some(b)` | delta `d` | `b + d` |
//! | `None` | delta `d` | `d` |
//! | `None` | none | `None` |
//!
//! A stale option index (out of range for the item) counts as "no option".
//!
//! ## Line Total
//!
//! Per-guest items multiply by `max(quantity, min_headcount)`. Flat items
//! ignore quantity. Unknown prices contribute nothing.

use crate::model::{CartEntry, CatalogItem, CompositeId, EventDetails, PricingMode};
use indexmap::IndexMap;

fn numeric_part(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

/// Parse a base price cell. Unparsable input is `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    numeric_part(text)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse an option price delta. Unparsable input is `0.0`.
pub fn parse_delta(text: &str) -> f64 {
    parse_price(text).unwrap_or(0.0)
}

/// Price of one unit of `item` with the given option selected.
pub fn unit_price(item: &CatalogItem, option: Option<usize>) -> Option<f64> {
    let delta = item.option(option).map(|opt| opt.price_delta);
    match (item.base_price, delta) {
        (Some(base), Some(delta)) => Some(base + delta),
        (Some(base), None) => Some(base),
        (None, Some(delta)) => Some(delta),
        (None, None) => None,
    }
}

/// Quantity actually billed for a per-guest item.
pub fn effective_quantity(item: &CatalogItem, quantity: u32) -> u32 {
    match item.pricing_mode {
        PricingMode::PerGuest => quantity.max(item.min_headcount),
        PricingMode::Flat => 1,
    }
}

/// Total for one cart line.
pub fn line_total(item: &CatalogItem, option: Option<usize>, quantity: u32) -> f64 {
    let Some(unit) = unit_price(item, option) else {
        return 0.0;
    };
    unit * f64::from(effective_quantity(item, quantity))
}

/// Starting quantity when an item enters the cart: the guest count for
/// per-guest items, otherwise 1.
pub fn default_quantity(item: &CatalogItem, details: &EventDetails) -> u32 {
    match item.pricing_mode {
        PricingMode::PerGuest => details.guest_count().unwrap_or(1).max(1),
        PricingMode::Flat => 1,
    }
}

/// Sum of line totals over a cart map. Entries whose item is no longer in
/// the catalog are skipped.
pub fn cart_total(records: &[CatalogItem], entries: &IndexMap<CompositeId, CartEntry>) -> f64 {
    entries
        .iter()
        .filter_map(|(id, entry)| {
            records
                .iter()
                .find(|item| item.id == id.item_id)
                .map(|item| line_total(item, id.option, entry.quantity))
        })
        .sum()
}

/// Format a price for display, e.g. `$1,234.50`.
pub fn format_price(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}
