//! Product → category mapping.
//!
//! The built-in table covers every product of the reference dataset. A JSON
//! file (see `schemas/category-map.json`) can replace it without touching
//! the rest of the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::validate_category_map;

/// Built-in categories, in display order.
const DEFAULT_CATEGORIES: [(&str, &[&str]); 4] = [
    (
        "Groceries",
        &[
            "Ketchup", "Milk", "Bread", "Potatoes", "Spinach", "Chicken", "Honey", "BBQ Sauce",
            "Soda", "Cheese", "Jam", "Rice",
        ],
    ),
    (
        "Personal Care",
        &["Toothpaste", "Soap", "Shampoo", "Shaving Cream", "Deodorant", "Diapers"],
    ),
    (
        "Household Goods",
        &["Iron", "Toilet Paper", "Laundry Detergent", "Sponges"],
    ),
    ("Home & Garden", &["Garden Hose", "Extension Cords", "Lawn Mower"]),
];

/// A named group of products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub products: Vec<String>,
}

/// On-disk form of the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryMapFile {
    categories: Vec<Category>,
}

/// Static product → category lookup table.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    categories: Vec<Category>,
    /// product -> index into `categories`
    index: HashMap<String, usize>,
}

impl CategoryMap {
    /// Build a map, rejecting a product listed under two categories.
    pub fn new(categories: Vec<Category>) -> ConfigResult<Self> {
        let index = build_index(&categories)?;
        Ok(Self { categories, index })
    }

    /// Load and validate a JSON category map file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON category map document.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let doc: Value = serde_json::from_str(content)?;
        validate_category_map(&doc).map_err(ConfigError::Schema)?;
        let file: CategoryMapFile = serde_json::from_value(doc)?;
        Self::new(file.categories)
    }

    /// Category of a product, `None` when unmapped.
    pub fn category_of(&self, product: &str) -> Option<&str> {
        self.index
            .get(product)
            .map(|&i| self.categories[i].name.as_str())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names in declaration order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn product_count(&self) -> usize {
        self.index.len()
    }

    /// JSON document in the same shape [`CategoryMap::from_json`] reads.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&CategoryMapFile {
            categories: self.categories.clone(),
        })
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        let categories: Vec<Category> = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, products)| Category {
                name: name.to_string(),
                products: products.iter().map(|p| p.to_string()).collect(),
            })
            .collect();

        // The built-in table has no duplicates
        let index = build_index(&categories).unwrap_or_default();
        Self { categories, index }
    }
}

/// product -> category position, rejecting a product listed under two categories
fn build_index(categories: &[Category]) -> ConfigResult<HashMap<String, usize>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, category) in categories.iter().enumerate() {
        for product in &category.products {
            if let Some(&prev) = index.get(product) {
                if prev != i {
                    return Err(ConfigError::DuplicateProduct {
                        product: product.clone(),
                        first: categories[prev].name.clone(),
                        second: category.name.clone(),
                    });
                }
            }
            index.insert(product.clone(), i);
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup() {
        let map = CategoryMap::default();
        assert_eq!(map.category_of("Milk"), Some("Groceries"));
        assert_eq!(map.category_of("Soap"), Some("Personal Care"));
        assert_eq!(map.category_of("Iron"), Some("Household Goods"));
        assert_eq!(map.category_of("Lawn Mower"), Some("Home & Garden"));
        assert_eq!(map.category_of("Ice Cream"), None);
        assert_eq!(map.product_count(), 25);
        assert_eq!(
            map.category_names().collect::<Vec<_>>(),
            vec!["Groceries", "Personal Care", "Household Goods", "Home & Garden"]
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let map = CategoryMap::default();
        assert_eq!(map.category_of("milk"), None);
    }

    #[test]
    fn test_from_json() {
        let map = CategoryMap::from_json(
            r#"{"categories": [
                {"name": "Frozen", "products": ["Ice Cream", "Peas"]},
                {"name": "Fruit", "products": ["Oranges"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(map.category_of("Ice Cream"), Some("Frozen"));
        assert_eq!(map.category_of("Oranges"), Some("Fruit"));
        assert_eq!(map.category_of("Milk"), None);
    }

    #[test]
    fn test_from_json_schema_error() {
        let err = CategoryMap::from_json(r#"{"Groceries": ["Milk"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
    }

    #[test]
    fn test_duplicate_across_categories() {
        let err = CategoryMap::new(vec![
            Category { name: "A".into(), products: vec!["Milk".into()] },
            Category { name: "B".into(), products: vec!["Milk".into()] },
        ])
        .unwrap_err();
        match err {
            ConfigError::DuplicateProduct { product, first, second } => {
                assert_eq!(product, "Milk");
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_map_has_unique_products() {
        let map = CategoryMap::default();
        let index = build_index(map.categories()).unwrap();
        assert_eq!(index, map.index);
        assert_eq!(index.len(), 25);

        let rebuilt = CategoryMap::new(map.categories().to_vec()).unwrap();
        assert_eq!(rebuilt.index, map.index);
    }

    #[test]
    fn test_json_roundtrip_of_default() {
        let map = CategoryMap::default();
        let json = map.to_json().unwrap();
        let reloaded = CategoryMap::from_json(&json).unwrap();
        assert_eq!(reloaded.categories(), map.categories());
    }
}
