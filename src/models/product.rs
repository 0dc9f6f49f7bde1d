// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Product records, stock validation and the create-product form.

use super::identity::{opaque_id, optional_opaque_id};
use crate::error::{AppError, Result};
use crate::services::transport::{FilePart, MultipartPayload};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Message shown when a stock value is rejected.
pub const INVALID_STOCK_MESSAGE: &str = "Stock must be a non-negative whole number.";

/// A listed second-hand item, as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    /// Owning seller's identity id
    #[serde(default, deserialize_with = "optional_opaque_id")]
    pub admin_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Display string; never parsed as a number
    #[serde(default, deserialize_with = "optional_opaque_id")]
    pub price: String,
    /// URL or server-relative path
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: u32,
    /// Server-computed label such as "available" or "sold"
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seller_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seller_phone: String,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive match of `term` against name or description.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Missing and `null` both decode to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse raw user input (a form field) into a stock count.
///
/// Only plain non-negative integers are accepted: `"-1"`, `"abc"` and
/// `"3.5"` are all rejected.
pub fn parse_stock(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| AppError::Validation(INVALID_STOCK_MESSAGE.to_string()))
}

/// Check a stock value that is about to be sent in a JSON body.
pub fn validate_stock_value(value: &Value) -> Result<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| AppError::Validation(INVALID_STOCK_MESSAGE.to_string())),
        Value::String(s) => parse_stock(s),
        _ => Err(AppError::Validation(INVALID_STOCK_MESSAGE.to_string())),
    }
}

/// Seller form for listing a new product.
#[derive(Debug, Clone, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "Product name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    #[validate(length(min = 1, message = "Price is required."))]
    pub price: String,
    pub stock: u32,
    /// Photo of the item; uploads are refused without one
    pub image: Option<FilePart>,
}

impl NewProduct {
    /// Validate the form and build the multipart body for `POST /products`.
    pub fn into_payload(self) -> Result<MultipartPayload> {
        self.validate()
            .map_err(|e| AppError::Validation(first_validation_message(&e)))?;

        let image = self
            .image
            .filter(|img| !img.bytes.is_empty())
            .ok_or_else(|| AppError::Validation("Please upload a product image.".to_string()))?;

        Ok(MultipartPayload::new()
            .text("name", self.name)
            .text("description", self.description)
            .text("price", self.price)
            .text("stock", self.stock.to_string())
            .file(FilePart {
                field: "image".to_string(),
                ..image
            }))
    }
}

/// First human-readable message out of a validator error set.
pub(crate) fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo() -> FilePart {
        FilePart {
            field: "photo".to_string(),
            file_name: "chair.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![0xff, 0xd8, 0xff],
        }
    }

    #[test]
    fn test_parse_stock() {
        assert_eq!(parse_stock("0").unwrap(), 0);
        assert_eq!(parse_stock(" 12 ").unwrap(), 12);
        assert!(parse_stock("-1").is_err());
        assert!(parse_stock("abc").is_err());
        assert!(parse_stock("").is_err());
        assert!(parse_stock("2.5").is_err());
    }

    #[test]
    fn test_validate_stock_value() {
        assert_eq!(validate_stock_value(&json!(3)).unwrap(), 3);
        assert_eq!(validate_stock_value(&json!("4")).unwrap(), 4);
        assert!(validate_stock_value(&json!(-1)).is_err());
        assert!(validate_stock_value(&json!(1.5)).is_err());
        assert!(validate_stock_value(&json!("abc")).is_err());
        assert!(validate_stock_value(&json!(null)).is_err());
    }

    #[test]
    fn test_product_decodes_numeric_fields_and_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": 10,
            "adminId": 3,
            "name": "Kursi rotan",
            "price": 150000,
            "stock": 2
        }))
        .unwrap();

        assert_eq!(product.id, "10");
        assert_eq!(product.admin_id, "3");
        assert_eq!(product.price, "150000");
        assert!(product.is_in_stock());
        assert_eq!(product.status, "");
    }

    #[test]
    fn test_product_tolerates_null_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": "p2",
            "adminId": null,
            "name": "Lemari",
            "description": null,
            "price": null,
            "image": null,
            "stock": null,
            "sellerPhone": null
        }))
        .unwrap();

        assert_eq!(product.admin_id, "");
        assert_eq!(product.description, "");
        assert_eq!(product.price, "");
        assert_eq!(product.stock, 0);
        assert_eq!(product.seller_phone, "");
    }

    #[test]
    fn test_product_rejects_null_id() {
        let result: std::result::Result<Product, _> =
            serde_json::from_value(json!({"id": null, "name": "Lemari"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_product_rejects_negative_stock() {
        let result: std::result::Result<Product, _> =
            serde_json::from_value(json!({"id": "p1", "stock": -3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let product = Product {
            id: "p1".into(),
            admin_id: "1".into(),
            name: "Sepeda Lipat".into(),
            description: "Masih mulus".into(),
            price: "500000".into(),
            image: String::new(),
            location: String::new(),
            stock: 1,
            status: "available".into(),
            seller_name: String::new(),
            seller_phone: String::new(),
        };
        assert!(product.matches("sepeda"));
        assert!(product.matches("MULUS"));
        assert!(!product.matches("meja"));
    }

    #[test]
    fn test_new_product_requires_image() {
        let form = NewProduct {
            name: "Meja".into(),
            description: "Kayu jati".into(),
            price: "200000".into(),
            stock: 1,
            image: None,
        };
        let err = form.into_payload().unwrap_err();
        assert_eq!(err.to_string(), "Please upload a product image.");
    }

    #[test]
    fn test_new_product_builds_multipart() {
        let form = NewProduct {
            name: "Meja".into(),
            description: "Kayu jati".into(),
            price: "200000".into(),
            stock: 0,
            image: Some(photo()),
        };
        let payload = form.into_payload().unwrap();

        assert_eq!(payload.field("stock"), Some("0"));
        assert_eq!(payload.field("name"), Some("Meja"));
        let file = payload.file_part().unwrap();
        assert_eq!(file.field, "image");
        assert_eq!(file.file_name, "chair.jpg");
    }

    #[test]
    fn test_new_product_requires_name() {
        let form = NewProduct {
            name: String::new(),
            description: "Kayu jati".into(),
            price: "200000".into(),
            stock: 1,
            image: Some(photo()),
        };
        let err = form.into_payload().unwrap_err();
        assert_eq!(err.to_string(), "Product name is required.");
    }
}
