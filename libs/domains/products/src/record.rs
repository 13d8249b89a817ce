//! Persisted shape of a product and the mapping to and from the API types.
//!
//! Prices are stored as decimal strings so the store never rounds them.

use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

pub const COLLECTION: &str = "products";

/// Document stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Field assignments for a partial update, price already encoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<String>,
    pub category: Option<Option<String>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
    }

    pub fn apply_to(&self, record: &mut ProductRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(price) = &self.price {
            record.price = price.clone();
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
    }
}

/// Store-agnostic form of a [`ProductFilter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub name_contains: Option<String>,
    pub category_contains: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductQuery {
    /// Empty `name`/`category` strings are dropped.
    pub fn from_filter(filter: &ProductFilter) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|s| !s.is_empty());

        Self {
            name_contains: non_empty(&filter.name),
            category_contains: non_empty(&filter.category),
            min_price: filter.min_price,
            max_price: filter.max_price,
        }
    }

    pub fn has_price_bounds(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Evaluate the query against one record.
    ///
    /// A record whose stored price does not parse never satisfies a price bound.
    pub fn matches(&self, record: &ProductRecord) -> bool {
        if let Some(needle) = &self.name_contains {
            if !contains_ignore_case(&record.name, needle) {
                return false;
            }
        }

        if let Some(needle) = &self.category_contains {
            match &record.category {
                Some(category) if contains_ignore_case(category, needle) => {}
                _ => return false,
            }
        }

        if !self.has_price_bounds() {
            return true;
        }

        let Ok(price) = parse_price(&record.price) else {
            return false;
        };
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Accepts plain (`"79.99"`) and scientific (`"1e-05"`) notation.
fn parse_price(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let raw = raw.trim();
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw))
}

pub fn encode(input: &CreateProduct) -> ProductRecord {
    ProductRecord {
        id: None,
        name: input.name.clone(),
        description: input.description.clone(),
        price: input.price.to_string(),
        category: input.category.clone(),
    }
}

pub fn encode_changes(update: &UpdateProduct) -> ProductChanges {
    ProductChanges {
        name: update.name.clone(),
        description: update.description.clone(),
        price: update.price.map(|price| price.to_string()),
        category: update.category.clone(),
    }
}

pub fn decode(record: ProductRecord) -> ProductResult<Product> {
    let Some(id) = record.id else {
        return Err(ProductError::MalformedRecord {
            id: "<missing>".to_string(),
            reason: "record has no _id".to_string(),
        });
    };

    let price = parse_price(&record.price).map_err(|e| ProductError::MalformedRecord {
        id: id.to_hex(),
        reason: format!("price {:?} is not a decimal: {}", record.price, e),
    })?;

    Ok(Product {
        id: id.to_hex(),
        name: record.name,
        description: record.description,
        price,
        category: record.category,
    })
}

/// Validate an external identifier before it reaches the store.
pub fn parse_identifier(raw: &str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| ProductError::InvalidIdentifier(raw.to_string()))
}
