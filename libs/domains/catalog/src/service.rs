use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    AdminProductFilter, Category, CreateCategory, CreateProduct, Product, ProductFilter,
    UpdateCategory, UpdateProduct, slugify,
};
use crate::repository::CatalogRepository;

/// Service layer for catalog business logic
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i32) -> CatalogResult<Category> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.repository.create_category(input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: i32,
        input: UpdateCategory,
    ) -> CatalogResult<Category> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.repository.update_category(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> CatalogResult<()> {
        let deleted = self.repository.delete_category(id).await?;

        if !deleted {
            return Err(CatalogError::CategoryNotFound(id));
        }

        Ok(())
    }

    /// Suggested slug for a display name (admin form convenience)
    pub fn suggest_slug(&self, name: &str) -> String {
        slugify(name)
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        self.repository.list_products(filter).await
    }

    #[instrument(skip(self))]
    pub async fn list_products_admin(
        &self,
        filter: AdminProductFilter,
    ) -> CatalogResult<Vec<Product>> {
        self.repository.list_products_admin(filter).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> CatalogResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.repository.create_product(input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i32, input: UpdateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.repository.update_product(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> CatalogResult<()> {
        let deleted = self.repository.delete_product(id).await?;

        if !deleted {
            return Err(CatalogError::ProductNotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn sample_category() -> Category {
        Category {
            id: 1,
            name: "Books".to_string(),
            slug: "books".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_product_maps_missing_to_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_product()
            .with(eq(42))
            .returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.get_product(42).await;

        assert!(matches!(result, Err(CatalogError::ProductNotFound(42))));
    }

    #[tokio::test]
    async fn test_get_category_maps_missing_to_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_get_category()
            .with(eq(7))
            .returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.get_category(7).await;

        assert!(matches!(result, Err(CatalogError::CategoryNotFound(7))));
    }

    #[tokio::test]
    async fn test_create_category_rejects_invalid_input_before_repository() {
        // No expectations set: the repository must not be reached
        let mock_repo = MockCatalogRepository::new();
        let service = CatalogService::new(mock_repo);

        let result = service
            .create_category(CreateCategory {
                name: String::new(),
                slug: None,
            })
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_price_before_repository() {
        let mock_repo = MockCatalogRepository::new();
        let service = CatalogService::new(mock_repo);

        let result = service
            .create_product(CreateProduct {
                name: "Widget".to_string(),
                category_id: 1,
                description: String::new(),
                price: Decimal::new(-1, 0),
                image_url: None,
            })
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_category_maps_false_to_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_delete_category()
            .with(eq(9))
            .returning(|_| Ok(false));

        let service = CatalogService::new(mock_repo);
        let result = service.delete_category(9).await;

        assert!(matches!(result, Err(CatalogError::CategoryNotFound(9))));
    }

    #[tokio::test]
    async fn test_list_categories_passes_through() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_list_categories()
            .returning(|| Ok(vec![sample_category()]));

        let service = CatalogService::new(mock_repo);
        let categories = service.list_categories().await.unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "books");
    }

    #[test]
    fn test_suggest_slug() {
        let service = CatalogService::new(MockCatalogRepository::new());
        assert_eq!(service.suggest_slug("Home & Garden"), "home-garden");
    }
}
