use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    AdminProductFilter, Category, CreateCategory, CreateProduct, Product, ProductFilter,
    UpdateCategory, UpdateProduct, slugify,
};

/// Repository trait for catalog persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// List all categories, id ascending
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Get a category by ID
    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>>;

    /// Create a category, deriving the slug from the name when absent
    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category>;

    /// Partially update a category
    async fn update_category(&self, id: i32, input: UpdateCategory) -> CatalogResult<Category>;

    /// Delete a category and all of its products
    async fn delete_category(&self, id: i32) -> CatalogResult<bool>;

    /// List products matching the public filters, id ascending
    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// List products matching the admin filters, id ascending
    async fn list_products_admin(
        &self,
        filter: AdminProductFilter,
    ) -> CatalogResult<Vec<Product>>;

    /// Get a product by ID with its category embedded
    async fn get_product(&self, id: i32) -> CatalogResult<Option<Product>>;

    /// Create a product; the category must exist
    async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product>;

    /// Partially update a product
    async fn update_product(&self, id: i32, input: UpdateProduct) -> CatalogResult<Product>;

    /// Delete a product by ID
    async fn delete_product(&self, id: i32) -> CatalogResult<bool>;
}

/// Matches the public listing filters against a product row
fn matches_search(needle: &str, name: &str, description: &str) -> bool {
    let needle = needle.to_lowercase();
    name.to_lowercase().contains(&needle) || description.to_lowercase().contains(&needle)
}

#[derive(Debug, Clone)]
struct StoredProduct {
    id: i32,
    name: String,
    category_id: i32,
    description: String,
    price: rust_decimal::Decimal,
    image_url: Option<String>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    categories: HashMap<i32, Category>,
    products: HashMap<i32, StoredProduct>,
    next_category_id: i32,
    next_product_id: i32,
}

impl InMemoryState {
    fn embed(&self, stored: &StoredProduct) -> CatalogResult<Product> {
        let category = self
            .categories
            .get(&stored.category_id)
            .cloned()
            .ok_or_else(|| {
                CatalogError::Internal(format!(
                    "product {} references missing category {}",
                    stored.id, stored.category_id
                ))
            })?;

        Ok(Product {
            id: stored.id,
            name: stored.name.clone(),
            category,
            description: stored.description.clone(),
            price: stored.price,
            image_url: stored.image_url.clone(),
        })
    }
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut state = self.state.write().await;

        let slug = match input.slug.filter(|s| !s.is_empty()) {
            Some(slug) => slug,
            None => slugify(&input.name),
        };

        if state.categories.values().any(|c| c.slug == slug) {
            return Err(CatalogError::DuplicateSlug(slug));
        }

        state.next_category_id += 1;
        let category = Category {
            id: state.next_category_id,
            name: input.name,
            slug,
        };
        state.categories.insert(category.id, category.clone());

        tracing::info!(category_id = category.id, "Created category");
        Ok(category)
    }

    async fn update_category(&self, id: i32, input: UpdateCategory) -> CatalogResult<Category> {
        let mut state = self.state.write().await;

        if !state.categories.contains_key(&id) {
            return Err(CatalogError::CategoryNotFound(id));
        }

        if let Some(ref slug) = input.slug {
            let taken = state
                .categories
                .values()
                .any(|c| c.id != id && c.slug == *slug);
            if taken {
                return Err(CatalogError::DuplicateSlug(slug.clone()));
            }
        }

        let category = state
            .categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound(id))?;
        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(slug) = input.slug {
            category.slug = slug;
        }
        let updated = category.clone();

        tracing::info!(category_id = id, "Updated category");
        Ok(updated)
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;

        if state.categories.remove(&id).is_none() {
            return Ok(false);
        }

        // Cascade: drop every product in the deleted category
        state.products.retain(|_, p| p.category_id != id);

        tracing::info!(category_id = id, "Deleted category and its products");
        Ok(true)
    }

    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let state = self.state.read().await;
        let max_price = filter.max_price();

        let mut matches: Vec<&StoredProduct> = state
            .products
            .values()
            .filter(|p| {
                if let Some(ref category_name) = filter.category_name {
                    let category = state.categories.get(&p.category_id);
                    if category.map(|c| c.name != *category_name).unwrap_or(true) {
                        return false;
                    }
                }
                if let Some(ref search) = filter.search {
                    if !matches_search(search, &p.name, &p.description) {
                        return false;
                    }
                }
                if let Some(max) = max_price {
                    if p.price > max {
                        return false;
                    }
                }
                true
            })
            .collect();
        matches.sort_by_key(|p| p.id);

        matches.into_iter().map(|p| state.embed(p)).collect()
    }

    async fn list_products_admin(
        &self,
        filter: AdminProductFilter,
    ) -> CatalogResult<Vec<Product>> {
        let state = self.state.read().await;

        let mut matches: Vec<&StoredProduct> = state
            .products
            .values()
            .filter(|p| {
                if let Some(category_id) = filter.category_id {
                    if p.category_id != category_id {
                        return false;
                    }
                }
                if let Some(ref search) = filter.search {
                    if !matches_search(search, &p.name, &p.description) {
                        return false;
                    }
                }
                true
            })
            .collect();
        matches.sort_by_key(|p| p.id);

        matches.into_iter().map(|p| state.embed(p)).collect()
    }

    async fn get_product(&self, id: i32) -> CatalogResult<Option<Product>> {
        let state = self.state.read().await;
        match state.products.get(&id) {
            Some(stored) => Ok(Some(state.embed(stored)?)),
            None => Ok(None),
        }
    }

    async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        let mut state = self.state.write().await;

        if !state.categories.contains_key(&input.category_id) {
            return Err(CatalogError::CategoryNotFound(input.category_id));
        }

        state.next_product_id += 1;
        let stored = StoredProduct {
            id: state.next_product_id,
            name: input.name,
            category_id: input.category_id,
            description: input.description,
            price: input.price,
            image_url: input.image_url,
        };
        let product = state.embed(&stored)?;
        state.products.insert(stored.id, stored);

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn update_product(&self, id: i32, input: UpdateProduct) -> CatalogResult<Product> {
        let mut state = self.state.write().await;

        if !state.products.contains_key(&id) {
            return Err(CatalogError::ProductNotFound(id));
        }

        if let Some(category_id) = input.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(CatalogError::CategoryNotFound(category_id));
            }
        }

        let stored = state
            .products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        if let Some(name) = input.name {
            stored.name = name;
        }
        if let Some(category_id) = input.category_id {
            stored.category_id = category_id;
        }
        if let Some(description) = input.description {
            stored.description = description;
        }
        if let Some(price) = input.price {
            stored.price = price;
        }
        if let Some(image_url) = input.image_url {
            stored.image_url = Some(image_url);
        }
        let stored = stored.clone();

        tracing::info!(product_id = id, "Updated product");
        state.embed(&stored)
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;

        if state.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
