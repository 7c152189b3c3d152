use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::feed::FeedError;

/// A complete supplier price list. One successful ingestion of this document fully replaces the shop's stock
/// listing; categories and parameters are merged into the shared reference data instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceList {
    pub shop: String,
    pub categories: Vec<FeedCategory>,
    pub goods: Vec<FeedGood>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCategory {
    pub id: i64,
    pub name: String,
}

/// One stock line in the feed. Quantities and prices are unsigned here; negative values are rejected at parse time
/// rather than reaching the quantity ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedGood {
    pub id: i64,
    pub category: i64,
    pub name: String,
    pub model: String,
    pub price: u32,
    pub price_rrc: u32,
    pub quantity: u32,
    #[serde(default, deserialize_with = "scalar_string_map")]
    pub parameters: BTreeMap<String, String>,
}

impl PriceList {
    /// Parses a price list from raw bytes. YAML is the native format; JSON documents parse through the same path
    /// since YAML is a superset.
    pub fn from_slice(raw: &[u8]) -> Result<Self, FeedError> {
        serde_yaml::from_slice(raw).map_err(|e| FeedError::Validation(e.to_string()))
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, FeedError> {
        serde_json::from_slice(raw).map_err(|e| FeedError::Validation(e.to_string()))
    }

    /// Cross-field checks that serde cannot express: a non-empty shop name, and every good referring to a category
    /// that the feed itself declares.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.shop.trim().is_empty() {
            return Err(FeedError::Validation("shop name must not be empty".to_string()));
        }
        let known: HashSet<i64> = self.categories.iter().map(|c| c.id).collect();
        for good in &self.goods {
            if !known.contains(&good.category) {
                return Err(FeedError::Validation(format!(
                    "good {} refers to category {} which is not declared in the feed",
                    good.id, good.category
                )));
            }
        }
        Ok(())
    }
}

/// Suppliers write parameter values as bare YAML scalars (strings, numbers, booleans). They are all stored as
/// strings, so coerce scalars here and reject lists/mappings.
fn scalar_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where D: Deserializer<'de> {
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, value)| {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "parameter '{name}' must be a scalar, got {other:?}"
                    )))
                },
            };
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::PriceList;

    const FEED: &str = r#"
shop: Svyaznoy
categories:
  - id: 224
    name: Смартфоны
goods:
  - id: 4216292
    category: 224
    model: apple/iphone/xs-max
    name: Смартфон Apple iPhone XS Max 512GB (золотистый)
    price: 110000
    price_rrc: 116990
    quantity: 14
    parameters:
      "Диагональ (дюйм)": 6.5
      "Встроенная память (Гб)": 512
      "Цвет": золотистый
"#;

    #[test]
    fn parses_yaml_feed() {
        let list = PriceList::from_slice(FEED.as_bytes()).unwrap();
        assert_eq!(list.shop, "Svyaznoy");
        assert_eq!(list.categories.len(), 1);
        let good = &list.goods[0];
        assert_eq!(good.quantity, 14);
        assert_eq!(good.parameters["Диагональ (дюйм)"], "6.5");
        assert_eq!(good.parameters["Встроенная память (Гб)"], "512");
        list.validate().unwrap();
    }

    #[test]
    fn missing_required_key_is_a_validation_error() {
        let broken = "shop: X\ngoods: []\n";
        let err = PriceList::from_slice(broken.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("categories"));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let broken = FEED.replace("quantity: 14", "quantity: -3");
        assert!(PriceList::from_slice(broken.as_bytes()).is_err());
    }

    #[test]
    fn undeclared_category_fails_validation() {
        let broken = FEED.replace("category: 224", "category: 999");
        let list = PriceList::from_slice(broken.as_bytes()).unwrap();
        assert!(list.validate().is_err());
    }
}
