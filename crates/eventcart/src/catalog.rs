//! Catalog record source.
//!
//! The catalog lives in a spreadsheet-backed remote store. The core only sees
//! it through [`CatalogSource`], which yields rows already converted to
//! [`CatalogItem`]s in fetch order. That order is the tie-break for sorting,
//! so sources must not reorder rows.

use crate::error::Result;
use crate::model::{CatalogItem, RawRecord};
use async_trait::async_trait;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every catalog record. Failure is a `RemoteFetch` error.
    async fn fetch_all_records(&self) -> Result<Vec<CatalogItem>>;
}

/// Convert raw rows, dropping rows without an id.
pub fn records_from_rows(rows: Vec<RawRecord>) -> Vec<CatalogItem> {
    rows.into_iter()
        .filter(|row| !row.id.trim().is_empty())
        .map(CatalogItem::from)
        .collect()
}

/// A catalog held in memory, e.g. rows decoded from an exported JSON sheet.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    rows: Vec<RawRecord>,
}

impl StaticCatalog {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }

    /// Decode rows from a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_all_records(&self) -> Result<Vec<CatalogItem>> {
        Ok(records_from_rows(self.rows.clone()))
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::error::EventCartError;

    /// A source whose fetch always fails.
    #[derive(Debug, Default)]
    pub struct FailingCatalog;

    #[async_trait]
    impl CatalogSource for FailingCatalog {
        async fn fetch_all_records(&self) -> Result<Vec<CatalogItem>> {
            Err(EventCartError::RemoteFetch("catalog unreachable".to_string()))
        }
    }

    /// A source returning ready-made items.
    #[derive(Debug, Default)]
    pub struct ItemCatalog {
        pub items: Vec<CatalogItem>,
    }

    impl ItemCatalog {
        pub fn new(items: Vec<CatalogItem>) -> Self {
            Self { items }
        }
    }

    #[async_trait]
    impl CatalogSource for ItemCatalog {
        async fn fetch_all_records(&self) -> Result<Vec<CatalogItem>> {
            Ok(self.items.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_without_id_are_dropped() {
        let rows = vec![
            RawRecord {
                id: "rec1".into(),
                ..Default::default()
            },
            RawRecord {
                id: "  ".into(),
                ..Default::default()
            },
        ];
        let items = records_from_rows(rows);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "rec1");
    }

    #[tokio::test]
    async fn static_catalog_from_json_keeps_order() {
        let json = r#"[
            {"id": "b", "name": "Band", "price": "$900"},
            {"id": "a", "name": "Arch", "price": "$120", "options": "Floral | +$60"}
        ]"#;
        let catalog = StaticCatalog::from_json(json).unwrap();
        let items = catalog.fetch_all_records().await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(items[1].options[0].price_delta, 60.0);
    }

    #[test]
    fn static_catalog_rejects_bad_json() {
        assert!(StaticCatalog::from_json("not json").is_err());
    }
}
