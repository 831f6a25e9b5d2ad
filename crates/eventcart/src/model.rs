//! # Domain Model
//!
//! This module defines the core data structures: [`CatalogItem`], [`CatalogOption`],
//! [`CompositeId`], [`CartEntry`] and [`EventDetails`].
//!
//! ## Catalog Records
//!
//! Records arrive from a spreadsheet-backed store as rows of text cells
//! ([`RawRecord`]). They are converted once, at fetch time, into immutable
//! [`CatalogItem`]s. Conversion never fails: malformed cells degrade to
//! "absent" (see [`crate::pricing::parse_price`]).
//!
//! ## Option Text Format
//!
//! The options cell holds one option per line (or per `;`):
//!
//! ```text
//! Deluxe | +$40 | +1 hour
//! Basic
//! Outdoor | -$10
//! ```
//!
//! Each option is `name | price delta | duration delta`; the last two parts are
//! optional. Blank segments are skipped.
//!
//! ## Composite Ids
//!
//! A cart entry is keyed by an item plus an optional selected option. The key
//! is a structural pair, not a string: `option: None` is "no option" and
//! `option: Some(0)` is the first option. The `<itemId>` / `<itemId>-<index>`
//! text form exists only for the session wire format. Inside the item id, `-`
//! and `\\` are escaped with a backslash, so `tent-2` (no option) is written
//! `tent\\-2` and never read back as `tent` with option 2.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::pricing::{parse_delta, parse_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    #[default]
    Flat,
    PerGuest,
}

impl PricingMode {
    /// Parse the pricing cell. Anything mentioning guests or people is per-guest.
    pub fn from_cell(text: &str) -> Self {
        let normalized = text.trim().to_lowercase().replace(['_', '-'], " ");
        if normalized.contains("guest") || normalized.contains("person") {
            PricingMode::PerGuest
        } else {
            PricingMode::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub name: String,
    /// Additive change to the item's base price. Zero means "no change".
    pub price_delta: f64,
    pub duration_delta: Option<String>,
}

/// Parse the delimited options cell into an ordered option list.
pub fn parse_options(text: Option<&str>) -> Vec<CatalogOption> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.split(['\n', ';'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let mut parts = segment.split('|').map(str::trim);
            let name = parts.next().filter(|n| !n.is_empty())?;
            let price_delta = parts.next().map(parse_delta).unwrap_or(0.0);
            let duration_delta = parts
                .next()
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string());
            Some(CatalogOption {
                name: name.to_string(),
                price_delta,
                duration_delta,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// `None` when the price cell is empty or free text ("call for quote").
    pub base_price: Option<f64>,
    /// The price cell as entered, for display.
    pub price_text: String,
    pub pricing_mode: PricingMode,
    pub duration: Option<String>,
    pub status: Option<String>,
    pub min_headcount: u32,
    pub options: Vec<CatalogOption>,
    pub description: String,
    pub category: Option<String>,
    /// Key used for image lookup.
    pub image_tag: String,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            image_tag: name.clone(),
            name,
            base_price: None,
            price_text: String::new(),
            pricing_mode: PricingMode::Flat,
            duration: None,
            status: None,
            min_headcount: 0,
            options: Vec::new(),
            description: String::new(),
            category: None,
        }
    }

    /// Set the price from a raw price cell.
    pub fn with_price(mut self, text: &str) -> Self {
        self.price_text = text.to_string();
        self.base_price = parse_price(text);
        self
    }

    pub fn with_pricing_mode(mut self, mode: PricingMode) -> Self {
        self.pricing_mode = mode;
        self
    }

    pub fn with_min_headcount(mut self, min: u32) -> Self {
        self.min_headcount = min;
        self
    }

    pub fn with_duration(mut self, duration: &str) -> Self {
        self.duration = Some(duration.to_string());
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_options(mut self, text: &str) -> Self {
        self.options = parse_options(Some(text));
        self
    }

    /// Look up an option. Stale indices resolve to `None`.
    pub fn option(&self, index: Option<usize>) -> Option<&CatalogOption> {
        index.and_then(|i| self.options.get(i))
    }

    /// Name including the selected option, e.g. "Photo Booth (Deluxe)".
    pub fn display_name(&self, option: Option<usize>) -> String {
        match self.option(option) {
            Some(opt) => format!("{} ({})", self.name, opt.name),
            None => self.name.clone(),
        }
    }
}

/// A spreadsheet row as delivered by the remote store. Every cell is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<String>,
    pub pricing: Option<String>,
    pub duration: Option<String>,
    pub status: Option<String>,
    pub min_headcount: Option<String>,
    pub options: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_tag: Option<String>,
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

impl From<RawRecord> for CatalogItem {
    fn from(raw: RawRecord) -> Self {
        let name = non_blank(raw.name).unwrap_or_else(|| raw.id.clone());
        let price_text = raw.price.unwrap_or_default();
        let min_headcount = raw
            .min_headcount
            .as_deref()
            .and_then(parse_price)
            .filter(|n| *n > 0.0)
            .map(|n| n as u32)
            .unwrap_or(0);

        CatalogItem {
            base_price: parse_price(&price_text),
            price_text,
            pricing_mode: raw
                .pricing
                .as_deref()
                .map(PricingMode::from_cell)
                .unwrap_or_default(),
            duration: non_blank(raw.duration),
            status: non_blank(raw.status),
            min_headcount,
            options: parse_options(raw.options.as_deref()),
            description: raw.description.unwrap_or_default(),
            category: non_blank(raw.category),
            image_tag: non_blank(raw.image_tag).unwrap_or_else(|| name.clone()),
            id: raw.id,
            name,
        }
    }
}

/// Identity of an item + optional option selected into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositeId {
    pub item_id: String,
    pub option: Option<usize>,
}

impl CompositeId {
    pub fn item(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            option: None,
        }
    }

    pub fn with_option(item_id: impl Into<String>, option: usize) -> Self {
        Self {
            item_id: item_id.into(),
            option: Some(option),
        }
    }

    pub fn new(item_id: impl Into<String>, option: Option<usize>) -> Self {
        Self {
            item_id: item_id.into(),
            option,
        }
    }
}

const ID_ESCAPE: char = '\\';
const OPTION_SEPARATOR: char = '-';

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.item_id.chars() {
            if c == OPTION_SEPARATOR || c == ID_ESCAPE {
                write!(f, "{}", ID_ESCAPE)?;
            }
            write!(f, "{}", c)?;
        }
        if let Some(index) = self.option {
            write!(f, "{}{}", OPTION_SEPARATOR, index)?;
        }
        Ok(())
    }
}

impl FromStr for CompositeId {
    type Err = String;

    /// Parses `<itemId>` or `<itemId>-<index>`. Escaped characters belong to
    /// the item id; an unescaped `-` that is not followed by digits only is
    /// kept as part of the item id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty composite id".to_string());
        }

        let mut item_id = String::with_capacity(s.len());
        // (length of item_id before the separator, byte offset in `s`)
        let mut separator = None;
        let mut chars = s.char_indices();
        while let Some((pos, c)) = chars.next() {
            match c {
                ID_ESCAPE => item_id.push(chars.next().map_or(ID_ESCAPE, |(_, next)| next)),
                OPTION_SEPARATOR => {
                    separator = Some((item_id.len(), pos));
                    item_id.push(c);
                }
                _ => item_id.push(c),
            }
        }

        if let Some((cut, pos)) = separator {
            let suffix = &s[pos + OPTION_SEPARATOR.len_utf8()..];
            if cut > 0 && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(index) = suffix.parse::<usize>() {
                    item_id.truncate(cut);
                    return Ok(CompositeId::with_option(item_id, index));
                }
            }
        }

        Ok(CompositeId::item(item_id))
    }
}

impl TryFrom<String> for CompositeId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompositeId> for String {
    fn from(id: CompositeId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCartEntry")]
pub struct CartEntry {
    pub quantity: u32,
    pub requests: String,
}

/// Wire shape of a cart entry, before the quantity is clamped.
#[derive(Deserialize)]
struct RawCartEntry {
    #[serde(default = "one")]
    quantity: u32,
    #[serde(default)]
    requests: String,
}

fn one() -> u32 {
    1
}

impl From<RawCartEntry> for CartEntry {
    fn from(raw: RawCartEntry) -> Self {
        Self {
            requests: raw.requests,
            ..Self::new(raw.quantity)
        }
    }
}

impl CartEntry {
    /// New entry; quantity is clamped to at least 1.
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity: quantity.max(1),
            requests: String::new(),
        }
    }
}

impl Default for CartEntry {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailType {
    EventName,
    Date,
    GuestCount,
    Location,
    SpecialRequests,
}

impl DetailType {
    pub const ALL: [DetailType; 5] = [
        DetailType::EventName,
        DetailType::Date,
        DetailType::GuestCount,
        DetailType::Location,
        DetailType::SpecialRequests,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailType::EventName => "Event name",
            DetailType::Date => "Date",
            DetailType::GuestCount => "Guest count",
            DetailType::Location => "Location",
            DetailType::SpecialRequests => "Special requests",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDetails {
    values: BTreeMap<DetailType, String>,
}

impl EventDetails {
    pub fn get(&self, detail: DetailType) -> Option<&str> {
        self.values.get(&detail).map(String::as_str)
    }

    /// Set a detail. Blank values clear it.
    pub fn set(&mut self, detail: DetailType, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&detail);
        } else {
            self.values.insert(detail, value);
        }
    }

    /// Guest count, when it holds a positive number.
    pub fn guest_count(&self) -> Option<u32> {
        self.get(DetailType::GuestCount)
            .and_then(parse_price)
            .filter(|n| *n >= 1.0)
            .map(|n| n as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_handles_all_delimiters() {
        let options = parse_options(Some("Deluxe | +$40 | +1 hour\nBasic;Outdoor | -$10"));
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].name, "Deluxe");
        assert_eq!(options[0].price_delta, 40.0);
        assert_eq!(options[0].duration_delta.as_deref(), Some("+1 hour"));
        assert_eq!(options[1].name, "Basic");
        assert_eq!(options[1].price_delta, 0.0);
        assert_eq!(options[2].price_delta, -10.0);
        assert_eq!(options[2].duration_delta, None);
    }

    #[test]
    fn parse_options_absent_or_blank_is_empty() {
        assert!(parse_options(None).is_empty());
        assert!(parse_options(Some("  \n ; ")).is_empty());
    }

    #[test]
    fn option_delta_without_digits_is_zero() {
        let options = parse_options(Some("Upgrade | ask us"));
        assert_eq!(options[0].price_delta, 0.0);
    }

    #[test]
    fn raw_record_conversion() {
        let raw = RawRecord {
            id: "rec1".into(),
            name: Some("Taco Truck".into()),
            price: Some("$12.50".into()),
            pricing: Some("Per Guest".into()),
            min_headcount: Some("25 guests".into()),
            duration: Some(" 3 hours ".into()),
            status: Some("Available".into()),
            options: Some("Veggie | -$2".into()),
            ..Default::default()
        };
        let item = CatalogItem::from(raw);
        assert_eq!(item.name, "Taco Truck");
        assert_eq!(item.base_price, Some(12.5));
        assert_eq!(item.pricing_mode, PricingMode::PerGuest);
        assert_eq!(item.min_headcount, 25);
        assert_eq!(item.duration.as_deref(), Some("3 hours"));
        assert_eq!(item.options.len(), 1);
        assert_eq!(item.image_tag, "Taco Truck");
    }

    #[test]
    fn raw_record_free_text_price_is_unknown() {
        let raw = RawRecord {
            id: "rec2".into(),
            price: Some("Call for quote".into()),
            ..Default::default()
        };
        let item = CatalogItem::from(raw);
        assert_eq!(item.base_price, None);
        assert_eq!(item.price_text, "Call for quote");
        assert_eq!(item.name, "rec2");
        assert_eq!(item.pricing_mode, PricingMode::Flat);
    }

    #[test]
    fn composite_id_option_zero_is_not_no_option() {
        let zero = CompositeId::with_option("rec1", 0);
        let none = CompositeId::item("rec1");
        assert_ne!(zero, none);
        assert_eq!(zero.to_string(), "rec1-0");
        assert_eq!(none.to_string(), "rec1");
        assert_eq!("rec1-0".parse::<CompositeId>().unwrap(), zero);
        assert_eq!("rec1".parse::<CompositeId>().unwrap(), none);
    }

    #[test]
    fn composite_id_non_numeric_suffix_stays_in_item_id() {
        let id: CompositeId = "rec-abc".parse().unwrap();
        assert_eq!(id, CompositeId::item("rec-abc"));
        assert!("".parse::<CompositeId>().is_err());
    }

    #[test]
    fn composite_id_item_ending_in_digits_keeps_its_id() {
        let tent = CompositeId::item("tent-2");
        assert_eq!(tent.to_string(), "tent\\-2");
        assert_eq!(tent.to_string().parse::<CompositeId>().unwrap(), tent);

        let option = CompositeId::with_option("tent-2", 1);
        assert_eq!(option.to_string(), "tent\\-2-1");
        assert_eq!(option.to_string().parse::<CompositeId>().unwrap(), option);

        let slash = CompositeId::item("a\\b");
        assert_eq!(slash.to_string().parse::<CompositeId>().unwrap(), slash);
    }

    #[test]
    fn composite_id_hyphenated_item_round_trips_through_json() {
        let mut map = indexmap::IndexMap::new();
        map.insert(CompositeId::item("tent-2"), CartEntry::new(1));
        map.insert(CompositeId::with_option("rec-x-9", 0), CartEntry::new(2));
        let json = serde_json::to_string(&map).unwrap();
        let back: indexmap::IndexMap<CompositeId, CartEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn cart_entry_from_wire_clamps_quantity() {
        let entry: CartEntry = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert_eq!(entry, CartEntry::new(1));
        let entry: CartEntry = serde_json::from_str(r#"{"requests": "vegan"}"#).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.requests, "vegan");
    }

    #[test]
    fn composite_id_serializes_as_map_key() {
        let mut map = indexmap::IndexMap::new();
        map.insert(CompositeId::with_option("rec1", 2), CartEntry::new(3));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"rec1-2":{"quantity":3,"requests":""}}"#);

        let back: indexmap::IndexMap<CompositeId, CartEntry> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn cart_entry_quantity_is_positive() {
        assert_eq!(CartEntry::new(0).quantity, 1);
    }

    #[test]
    fn event_details_blank_clears() {
        let mut details = EventDetails::default();
        details.set(DetailType::Location, "Backyard");
        assert_eq!(details.get(DetailType::Location), Some("Backyard"));
        details.set(DetailType::Location, "  ");
        assert!(details.is_empty());
    }

    #[test]
    fn event_details_guest_count() {
        let mut details = EventDetails::default();
        details.set(DetailType::GuestCount, "about 40");
        assert_eq!(details.guest_count(), Some(40));
        details.set(DetailType::GuestCount, "lots");
        assert_eq!(details.guest_count(), None);
    }
}
