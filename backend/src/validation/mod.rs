//! JSON Schema validation for configuration documents.
//!
//! The category map file is checked against an embedded JSON Schema
//! (Draft 7) before it replaces the built-in mapping.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `category-map.json`
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use retail_promo::validate_category_map;
//!
//! let doc = json!({
//!     "categories": [{ "name": "Groceries", "products": ["Milk", "Bread"] }]
//! });
//! assert!(validate_category_map(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static CATEGORY_MAP_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/category-map.json"))
        .map_err(|e| format!("Invalid embedded schema: {}", e))
});

/// Validate a JSON document against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use retail_promo::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a category map document.
pub fn validate_category_map(data: &Value) -> Result<(), Vec<String>> {
    let schema = CATEGORY_MAP_SCHEMA.as_ref().map_err(|e| vec![e.clone()])?;
    validate(schema, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_category_map() {
        let doc = json!({
            "categories": [
                { "name": "Groceries", "products": ["Milk", "Bread"] },
                { "name": "Home & Garden", "products": [] }
            ]
        });
        assert!(validate_category_map(&doc).is_ok());
    }

    #[test]
    fn test_category_map_wrong_shape() {
        // Old dict form is not accepted
        let doc = json!({ "Groceries": ["Milk"] });
        assert!(validate_category_map(&doc).is_err());

        let doc = json!({ "categories": [{ "name": "", "products": ["Milk"] }] });
        assert!(validate_category_map(&doc).is_err());
    }

    #[test]
    fn test_duplicate_products_in_category_rejected() {
        let doc = json!({
            "categories": [{ "name": "Groceries", "products": ["Milk", "Milk"] }]
        });
        let errors = validate_category_map(&doc).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "x" })).is_ok());
        let errors = validate(&schema, &json!({ "name": 1 })).unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
