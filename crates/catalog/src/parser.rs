//! Parser for catalog files.
//!
//! A catalog file is a JSON array of raw records as exported from the
//! catalog database:
//!
//! ```json
//! [{ "item_id": "W1", "name": "Tamdhu 12 Year Old", "price": 94100,
//!    "age_years": 12, "origin": "Scotland", "type": "SINGLE_MALT",
//!    "body": 2, "richness": 3, "smoke": 0, "sweetness": 3,
//!    "image_path": "/images/tamob.12yo.jpg" }]
//! ```
//!
//! Missing origin/type become `"unknown"`, missing scores become 0 and
//! scores are clamped into `[0, 5]`.

use crate::error::{CatalogError, Result};
use crate::types::{CatalogItem, FlavorProfile, UNKNOWN};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One record as it appears in the file
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "id", alias = "whiskey_id")]
    pub item_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    #[serde(alias = "age")]
    pub age_years: Option<f64>,
    pub origin: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub body: Option<f32>,
    pub richness: Option<f32>,
    pub smoke: Option<f32>,
    pub sweetness: Option<f32>,
    #[serde(alias = "image")]
    pub image_path: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Convert a raw record into a `CatalogItem`
///
/// `record` is the zero-based position in the file, used for error context.
pub fn convert_record(record: usize, raw: RawRecord) -> Result<CatalogItem> {
    let id = non_blank(raw.item_id).ok_or_else(|| CatalogError::InvalidValue {
        record,
        field: "item_id".to_string(),
        value: "<missing>".to_string(),
    })?;

    let name = non_blank(raw.name).ok_or_else(|| CatalogError::InvalidValue {
        record,
        field: "name".to_string(),
        value: "<missing>".to_string(),
    })?;

    let price = raw.price.unwrap_or(0.0);
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::InvalidValue {
            record,
            field: "price".to_string(),
            value: price.to_string(),
        });
    }

    let age = match raw.age_years {
        Some(age) if age.is_finite() && age >= 0.0 => Some(age as u32),
        Some(age) => {
            return Err(CatalogError::InvalidValue {
                record,
                field: "age_years".to_string(),
                value: age.to_string(),
            });
        }
        None => None,
    };

    Ok(CatalogItem {
        id,
        name,
        price,
        age,
        origin: non_blank(raw.origin).unwrap_or_else(|| UNKNOWN.to_string()),
        item_type: non_blank(raw.item_type).unwrap_or_else(|| UNKNOWN.to_string()),
        flavor: FlavorProfile::new(
            raw.body.unwrap_or(0.0),
            raw.richness.unwrap_or(0.0),
            raw.smoke.unwrap_or(0.0),
            raw.sweetness.unwrap_or(0.0),
        ),
        image: non_blank(raw.image_path),
    })
}

/// Parse catalog records from a JSON string
///
/// `source` only labels errors (usually the file name).
pub fn parse_items(source: &str, content: &str) -> Result<Vec<CatalogItem>> {
    let raw: Vec<RawRecord> =
        serde_json::from_str(content).map_err(|e| CatalogError::ParseError {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, record)| convert_record(idx, record))
        .collect()
}

/// Parse a catalog file from disk
pub fn parse_file(path: &Path) -> Result<Vec<CatalogItem>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_items(&path.display().to_string(), &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"[{
            "item_id": "W7", "name": "Laphroaig 10 Year Old", "price": 77400,
            "age_years": 10, "origin": "Scotland", "type": "SINGLE_MALT",
            "body": 3, "richness": 5, "smoke": 5, "sweetness": 2,
            "image_path": "/images/lrgob.10yov1.jpg"
        }]"#;

        let items = parse_items("test.json", json).unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.id, "W7");
        assert_eq!(item.age, Some(10));
        assert_eq!(item.item_type, "SINGLE_MALT");
        assert_eq!(item.flavor.smoke, 5.0);
        assert_eq!(item.image.as_deref(), Some("/images/lrgob.10yov1.jpg"));
    }

    #[test]
    fn test_missing_fields_are_normalized() {
        let json = r#"[{ "whiskey_id": "W2", "name": "Mystery Dram", "price": 50000,
                         "smoke": 9 }]"#;

        let items = parse_items("test.json", json).unwrap();
        let item = &items[0];
        assert_eq!(item.origin, UNKNOWN);
        assert_eq!(item.item_type, UNKNOWN);
        assert_eq!(item.age, None);
        assert_eq!(item.flavor.body, 0.0);
        // Clamped into [0, 5]
        assert_eq!(item.flavor.smoke, 5.0);
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"[{ "item_id": "W3", "name": "Broken", "price": -1 }]"#;
        let err = parse_items("test.json", json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidValue { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_missing_id_rejected() {
        let json = r#"[{ "name": "No Id", "price": 1000 }]"#;
        let err = parse_items("test.json", json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidValue { record: 0, .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_items("bad.json", "{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError { .. }));
    }
}
