use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// 24-character hex identifier assigned by the store
    #[serde(rename = "_id", alias = "id")]
    #[schema(example = "65f1c0a2e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[schema(example = "Desk Lamp")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Serialized as a decimal string, e.g. `"79.99"`
    #[schema(value_type = String, example = "79.99")]
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

/// Payload for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100, example = "Desk Lamp")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Must be greater than zero. Accepts a JSON number or string.
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64, example = 79.99)]
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

/// Partial update. Absent fields are left untouched.
///
/// `description` and `category` distinguish "absent" from an explicit `null`,
/// which clears the stored value. A `null` name or price counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(min_length = 1, max_length = 100)]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[validate(custom(function = "validate_price"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

impl UpdateProduct {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
    }
}

/// Query parameters for listing products. All filters are AND-combined.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    /// Inclusive lower price bound
    #[validate(custom(function = "validate_price_bound"))]
    #[param(value_type = Option<f64>, minimum = 0)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[validate(custom(function = "validate_price_bound"))]
    #[param(value_type = Option<f64>, minimum = 0)]
    pub max_price: Option<Decimal>,
}

/// Missing field stays `None`, `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("range").with_message("price must be greater than 0".into()))
    }
}

fn validate_price_bound(bound: &Decimal) -> Result<(), ValidationError> {
    if bound.is_sign_negative() && !bound.is_zero() {
        Err(ValidationError::new("range")
            .with_message("price bound must be greater than or equal to 0".into()))
    } else {
        Ok(())
    }
}
