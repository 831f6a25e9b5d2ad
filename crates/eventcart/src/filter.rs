//! Catalog filtering and ordering.
//!
//! [`FilterCriteria`] narrows the catalog with AND logic over four fields.
//! Any criterion other than "all" fails an item whose field is absent or
//! unparsable. Survivors are ordered by reaction score, highest first, with
//! ties kept in fetch order.

use crate::model::CatalogItem;
use crate::reactions::Reactions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceBand {
    #[default]
    All,
    Under50,
    From50To100,
    From100To250,
    Over250,
}

impl PriceBand {
    /// Band bounds are inclusive at both ends.
    pub fn contains(&self, price: Option<f64>) -> bool {
        match (self, price) {
            (PriceBand::All, _) => true,
            (_, None) => false,
            (PriceBand::Under50, Some(p)) => p < 50.0,
            (PriceBand::From50To100, Some(p)) => (50.0..=100.0).contains(&p),
            (PriceBand::From100To250, Some(p)) => (100.0..=250.0).contains(&p),
            (PriceBand::Over250, Some(p)) => p > 250.0,
        }
    }
}

impl FromStr for PriceBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(PriceBand::All),
            "<50" | "under50" => Ok(PriceBand::Under50),
            "50-100" => Ok(PriceBand::From50To100),
            "100-250" => Ok(PriceBand::From100To250),
            ">250" | "over250" => Ok(PriceBand::Over250),
            other => Err(format!("Unknown price band: {}", other)),
        }
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceBand::All => "all",
            PriceBand::Under50 => "<50",
            PriceBand::From50To100 => "50-100",
            PriceBand::From100To250 => "100-250",
            PriceBand::Over250 => ">250",
        };
        f.write_str(label)
    }
}

/// Exact-match criterion on a text field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldMatch {
    #[default]
    All,
    Exactly(String),
}

impl FieldMatch {
    pub fn exactly(value: impl Into<String>) -> Self {
        FieldMatch::Exactly(value.into())
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            FieldMatch::All => true,
            FieldMatch::Exactly(expected) => value == Some(expected.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the item name. Empty matches everything.
    pub name: String,
    pub price_band: PriceBand,
    pub duration: FieldMatch,
    pub status: FieldMatch,
}

impl FilterCriteria {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_price_band(mut self, band: PriceBand) -> Self {
        self.price_band = band;
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = FieldMatch::exactly(duration);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = FieldMatch::exactly(status);
        self
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        let needle = self.name.trim().to_lowercase();
        (needle.is_empty() || item.name.to_lowercase().contains(&needle))
            && self.price_band.contains(item.base_price)
            && self.duration.matches(item.duration.as_deref())
            && self.status.matches(item.status.as_deref())
    }
}

/// Order by score, highest first. `sort_by` is stable, so equal scores keep
/// their input order.
pub fn sort_by_score<T, F>(items: &mut [T], reactions: &Reactions, item_id: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| {
        reactions
            .score(item_id(b))
            .cmp(&reactions.score(item_id(a)))
    });
}

/// Filter the catalog and order it by reaction score.
pub fn apply<'a>(
    items: &'a [CatalogItem],
    criteria: &FilterCriteria,
    reactions: &Reactions,
) -> Vec<&'a CatalogItem> {
    let mut matched: Vec<&CatalogItem> = items.iter().filter(|i| criteria.matches(i)).collect();
    sort_by_score(&mut matched, reactions, |item| item.id.as_str());
    matched
}

/// Distinct durations present in the catalog, for the filter drop-down.
pub fn distinct_durations(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.duration.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct statuses present in the catalog, for the filter drop-down.
pub fn distinct_statuses(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.status.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
