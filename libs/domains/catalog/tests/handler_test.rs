//! Handler tests for the catalog domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (query params, JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes
//! - Error responses
//!
//! They run against the in-memory repository, so no database is needed.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn test_app() -> Router {
    let repository = InMemoryCatalogRepository::new();
    let service = CatalogService::new(repository);
    handlers::router(service)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn seed_category(app: &Router, name: &str) -> Category {
    let response = post_json(app, "/admin/categories", json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

async fn seed_product(app: &Router, name: &str, category_id: i32, price: &str) -> Product {
    let response = post_json(
        app,
        "/admin/products",
        json!({
            "name": name,
            "category_id": category_id,
            "description": format!("{} description", name),
            "price": price
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_list_categories_returns_200_with_shape() {
    let app = test_app();
    seed_category(&app, "Electronics").await;
    seed_category(&app, "Home & Garden").await;

    let response = get(&app, "/categories").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["name"], "Electronics");
    assert_eq!(body[0]["slug"], "electronics");
    assert_eq!(body[1]["slug"], "home-garden");
}

#[tokio::test]
async fn test_get_product_returns_embedded_category_and_string_price() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;
    let product = seed_product(&app, "Dune", category.id, "9.99").await;

    let response = get(&app, &format!("/products/{}", product.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["name"], "Dune");
    assert_eq!(body["price"], "9.99");
    assert_eq!(body["category"]["id"], category.id);
    assert_eq!(body["category"]["slug"], "books");
    assert_eq!(body["image_url"], Value::Null);
}

#[tokio::test]
async fn test_get_unknown_product_returns_404_error_body() {
    let app = test_app();

    let response = get(&app, "/products/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 1004);
    assert!(body["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_list_products_filters_by_category_name() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    let music = seed_category(&app, "Music").await;
    seed_product(&app, "Dune", books.id, "9.99").await;
    seed_product(&app, "Abbey Road", music.id, "19.99").await;

    let response = get(&app, "/products?category__name=Books").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].name, "Dune");

    // Case-sensitive: lowercase does not match
    let response = get(&app, "/products?category__name=books").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_list_products_search_matches_name_and_description() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    seed_product(&app, "Dune", books.id, "9.99").await;
    seed_product(&app, "Neuromancer", books.id, "12.50").await;

    let response = get(&app, "/products?search=DUNE").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].name, "Dune");

    // Description of every seeded product contains "description"
    let response = get(&app, "/products?search=description").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 2);
}

#[tokio::test]
async fn test_list_products_max_price_filter() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    seed_product(&app, "Cheap", books.id, "5.00").await;
    seed_product(&app, "Pricey", books.id, "50.00").await;

    let response = get(&app, "/products?max_price=10").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].name, "Cheap");
}

#[tokio::test]
async fn test_list_products_malformed_max_price_returns_all() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    seed_product(&app, "Dune", books.id, "9.99").await;

    let response = get(&app, "/products?max_price=abc").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
}

#[tokio::test]
async fn test_list_products_combined_filters() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    let music = seed_category(&app, "Music").await;
    seed_product(&app, "Dune", books.id, "9.99").await;
    seed_product(&app, "Dune Soundtrack", music.id, "14.99").await;
    seed_product(&app, "Dune Deluxe Soundtrack", music.id, "49.99").await;

    let response = get(&app, "/products?category__name=Music&search=dune&max_price=20").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].name, "Dune Soundtrack");
}

#[tokio::test]
async fn test_admin_create_category_returns_201_and_derives_slug() {
    let app = test_app();

    let response = post_json(&app, "/admin/categories", json!({ "name": "Home & Garden" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let category: Category = json_body(response.into_body()).await;
    assert_eq!(category.slug, "home-garden");
}

#[tokio::test]
async fn test_admin_create_category_duplicate_slug_returns_409() {
    let app = test_app();
    seed_category(&app, "Books").await;

    let response = post_json(&app, "/admin/categories", json!({ "name": "books" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 1008);
}

#[tokio::test]
async fn test_admin_create_category_validates_input() {
    let app = test_app();

    // Empty name fails validation in the extractor
    let response = post_json(&app, "/admin/categories", json!({ "name": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_update_category() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/admin/categories/{}", category.id))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "name": "Paper Books" })).unwrap(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Category = json_body(response.into_body()).await;
    assert_eq!(updated.name, "Paper Books");
    // Slug is untouched unless supplied
    assert_eq!(updated.slug, "books");
}

#[tokio::test]
async fn test_admin_delete_category_cascades() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;
    let product = seed_product(&app, "Dune", category.id, "9.99").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/admin/categories/{}", category.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &format!("/products/{}", product.id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_delete_unknown_category_returns_404() {
    let app = test_app();

    let request = Request::builder()
        .method("DELETE")
        .uri("/admin/categories/777")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_slugify_endpoint() {
    let app = test_app();

    let response = get(&app, "/admin/slugify?name=Gaming%20%26%20Consoles").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["slug"], "gaming-consoles");
}

#[tokio::test]
async fn test_admin_create_product_unknown_category_returns_404() {
    let app = test_app();

    let response = post_json(
        &app,
        "/admin/products",
        json!({
            "name": "Orphan",
            "category_id": 123,
            "price": "1.00"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_create_product_negative_price_returns_400() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;

    let response = post_json(
        &app,
        "/admin/products",
        json!({
            "name": "Dune",
            "category_id": category.id,
            "price": "-5.00"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_list_products_filters_by_category_id() {
    let app = test_app();
    let books = seed_category(&app, "Books").await;
    let music = seed_category(&app, "Music").await;
    seed_product(&app, "Dune", books.id, "9.99").await;
    seed_product(&app, "Abbey Road", music.id, "19.99").await;

    let response = get(&app, &format!("/admin/products?category_id={}", music.id)).await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].name, "Abbey Road");
}

#[tokio::test]
async fn test_admin_update_product_partial() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;
    let product = seed_product(&app, "Dune", category.id, "9.99").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/admin/products/{}", product.id))
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "price": "11.49" })).unwrap(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["price"], "11.49");
    assert_eq!(body["name"], "Dune");
}

#[tokio::test]
async fn test_admin_delete_product() {
    let app = test_app();
    let category = seed_category(&app, "Books").await;
    let product = seed_product(&app, "Dune", category.id, "9.99").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/admin/products/{}", product.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/products").await;
    let body: Vec<Product> = json_body(response.into_body()).await;
    assert!(body.is_empty());
}
