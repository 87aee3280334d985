use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Regex pattern for URL-safe slugs
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Custom validator for explicitly supplied slugs.
///
/// An empty string passes: it is treated the same as an absent slug and
/// derived from the name before persisting.
fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if !slug.is_empty() && !SLUG_PATTERN.is_match(slug) {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases the name, collapses every run of non-alphanumeric characters
/// into a single hyphen, and trims leading/trailing hyphens:
/// `"Gaming  Mice!" -> "gaming-mice"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Category entity - a named grouping of products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier
    pub id: i32,
    /// Display name
    pub name: String,
    /// URL-safe unique slug
    pub slug: String,
}

/// Product entity - a catalog item with its category embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier
    pub id: i32,
    /// Display name
    pub name: String,
    /// The category this product belongs to
    pub category: Category,
    /// Free-form description
    pub description: String,
    /// Price with two decimal places, serialized as a string ("19.99")
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    /// Optional image URL
    pub image_url: Option<String>,
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Optional explicit slug; derived from the name when omitted or empty
    #[validate(length(max = 100), custom(function = "validate_slug"))]
    pub slug: Option<String>,
}

/// DTO for partially updating a category
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: Option<String>,
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category_id: i32,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// DTO for partially updating a product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "19.99")]
    pub price: Option<Decimal>,
    #[validate(url)]
    pub image_url: Option<String>,
}

fn validate_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() {
        return Err(validator::ValidationError::new("negative_price"));
    }
    Ok(())
}

/// Query filters for the public product listing
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    /// Exact, case-sensitive category name match
    #[serde(rename = "category__name")]
    pub category_name: Option<String>,
    /// Case-insensitive substring match against product name or description
    pub search: Option<String>,
    /// Upper price bound; a non-numeric value is ignored
    pub max_price: Option<String>,
}

impl ProductFilter {
    /// Parse `max_price` leniently: a value that is not a valid decimal is
    /// treated as if the parameter was absent.
    pub fn max_price(&self) -> Option<Decimal> {
        self.max_price.as_deref().and_then(|raw| raw.parse().ok())
    }
}

/// Query filters for the admin product listing
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct AdminProductFilter {
    pub category_id: Option<i32>,
    /// Case-insensitive substring match against product name or description
    pub search: Option<String>,
}
