use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::CatalogResult;
use crate::models::{
    AdminProductFilter, Category, CreateCategory, CreateProduct, Product, ProductFilter,
    UpdateCategory, UpdateProduct,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

const CATALOG_TAG: &str = "catalog";
const ADMIN_TAG: &str = "catalog-admin";

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        list_products,
        get_product,
        admin_list_categories,
        admin_create_category,
        admin_update_category,
        admin_delete_category,
        admin_slugify,
        admin_list_products,
        admin_create_product,
        admin_update_product,
        admin_delete_product,
    ),
    components(
        schemas(
            Category,
            Product,
            CreateCategory,
            UpdateCategory,
            CreateProduct,
            UpdateProduct,
            SlugSuggestion
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = CATALOG_TAG, description = "Public read-only catalog endpoints"),
        (name = ADMIN_TAG, description = "Administrative catalog management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the catalog router: public read endpoints plus the admin surface
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/categories", get(list_categories))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route(
            "/admin/categories",
            get(admin_list_categories).post(admin_create_category),
        )
        .route(
            "/admin/categories/{id}",
            put(admin_update_category).delete(admin_delete_category),
        )
        .route("/admin/slugify", get(admin_slugify))
        .route(
            "/admin/products",
            get(admin_list_products).post(admin_create_product),
        )
        .route(
            "/admin/products/{id}",
            put(admin_update_product).delete(admin_delete_product),
        )
        .with_state(shared_service)
}

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = CATALOG_TAG,
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Category>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// List products with optional filters
#[utoipa::path(
    get,
    path = "/products",
    tag = CATALOG_TAG,
    params(ProductFilter),
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(filter): Query<ProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.list_products(filter).await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = CATALOG_TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// List all categories (admin)
#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = ADMIN_TAG,
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_list_categories<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Category>>> {
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = ADMIN_TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created successfully", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_create_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    tag = ADMIN_TAG,
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated successfully", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_update_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CatalogResult<Json<Category>> {
    let category = service.update_category(id, input).await?;
    Ok(Json(category))
}

/// Delete a category and all of its products
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = ADMIN_TAG,
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_delete_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<impl IntoResponse> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, IntoParams)]
struct SlugifyQuery {
    /// Display name to derive a slug from
    name: String,
}

/// Suggested slug for a category or product name
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlugSuggestion {
    pub slug: String,
}

/// Suggest a URL-safe slug for a display name
#[utoipa::path(
    get,
    path = "/admin/slugify",
    tag = ADMIN_TAG,
    params(SlugifyQuery),
    responses(
        (status = 200, description = "Suggested slug", body = SlugSuggestion)
    )
)]
async fn admin_slugify<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<SlugifyQuery>,
) -> Json<SlugSuggestion> {
    Json(SlugSuggestion {
        slug: service.suggest_slug(&query.name),
    })
}

/// List products with admin filters
#[utoipa::path(
    get,
    path = "/admin/products",
    tag = ADMIN_TAG,
    params(AdminProductFilter),
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(filter): Query<AdminProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    let products = service.list_products_admin(filter).await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/admin/products",
    tag = ADMIN_TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_create_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    tag = ADMIN_TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_update_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    tag = ADMIN_TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_delete_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
