//! Database-backed tests: catalog API and the full cart to WhatsApp flow.
//!
//! These tests require a `PostgreSQL` database at `TEST_DATABASE_URL`.
//! Migrations are applied on connect.
//!
//! Run with: cargo test -p asthmi-integration-tests -- --ignored

use asthmi_core::{Product, ProductRecord, VariantRecord};
use asthmi_integration_tests::{TEST_ORDER_NUMBER, TestClient, test_app, test_database_url};
use asthmi_storefront::db::ProductRepository;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use sqlx::PgPool;

async fn seeded_pool() -> PgPool {
    let pool = PgPool::connect(&test_database_url())
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let ghee = Product::try_from(ProductRecord {
        id: Some("it-ghee".to_string()),
        name: Some("Desi Ghee".to_string()),
        category: Some("Dairy".to_string()),
        mrp: Some(Decimal::from(650)),
        price: Some(Decimal::from(550)),
        stock: Some(3),
        variants: Some(vec![
            VariantRecord {
                id: Some("500g".to_string()),
                name: Some("500 g".to_string()),
                price: Some(Decimal::from(300)),
                ..VariantRecord::default()
            },
            VariantRecord {
                id: Some("1kg".to_string()),
                name: Some("1 kg".to_string()),
                ..VariantRecord::default()
            },
        ]),
        ..ProductRecord::default()
    })
    .expect("valid product");

    let paneer = Product::try_from(ProductRecord {
        id: Some("it-paneer".to_string()),
        name: Some("Malai Paneer".to_string()),
        category: Some("Dairy".to_string()),
        price: Some(Decimal::from(120)),
        stock: Some(40),
        ..ProductRecord::default()
    })
    .expect("valid product");

    let repo = ProductRepository::new(&pool);
    repo.upsert_product(&ghee).await.expect("Failed to seed ghee");
    repo.upsert_product(&paneer).await.expect("Failed to seed paneer");
    pool
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TEST_DATABASE_URL)"]
async fn test_product_detail_and_related() {
    let mut client = TestClient::new(test_app(seeded_pool().await));

    let response = client.get("/api/products/it-ghee").await;
    assert_eq!(response.status, StatusCode::OK);
    let product = response.json();
    assert_eq!(product["name"], "Desi Ghee");
    assert_eq!(product["discount_percent"], 15);
    assert_eq!(product["badge"], "Only 3 left");
    assert_eq!(product["default_variant"], "500g");
    assert!(
        product["related"]
            .as_array()
            .expect("related is a list")
            .iter()
            .any(|p| p["id"] == "it-paneer")
    );

    let response = client.get("/api/products/it-missing").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TEST_DATABASE_URL)"]
async fn test_listing_filters_by_category_and_sorts() {
    let mut client = TestClient::new(test_app(seeded_pool().await));

    let response = client
        .get("/api/products?category=Dairy&sort=price-low&max_price=")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let ids: Vec<String> = response
        .json()
        .as_array()
        .expect("listing is a list")
        .iter()
        .filter_map(|p| p["id"].as_str().map(str::to_string))
        .filter(|id| id.starts_with("it-"))
        .collect();
    assert_eq!(ids, ["it-paneer", "it-ghee"]);

    let response = client.get("/api/search/suggestions?q=paneer").await;
    assert!(
        response
            .json()
            .as_array()
            .expect("suggestions are a list")
            .iter()
            .any(|s| s["id"] == "it-paneer")
    );
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TEST_DATABASE_URL)"]
async fn test_cart_flow_hands_off_to_whatsapp() {
    let app = test_app(seeded_pool().await);
    let mut client = TestClient::new(app.clone());

    let response = client
        .post_form("/cart/add", "product_id=it-ghee&variant_id=500g&quantity=2")
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));
    assert_eq!(response.body.trim(), "2");

    client.post_form("/cart/add", "product_id=it-ghee&variant_id=500g").await;
    client.post_form("/cart/add", "product_id=it-paneer&variant_id=").await;

    let cart = client.get("/cart/json").await.json();
    assert_eq!(cart["item_count"], 4);
    assert_eq!(cart["items"][0]["id"], "it-ghee-500g");
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["items"][0]["size"], "500 g");
    assert_eq!(cart["total"], "₹1020");

    let response = client
        .post_form("/cart/update", "item_id=it-paneer&delta=-1")
        .await;
    assert!(!response.body.contains("Malai Paneer"));

    let response = client
        .post_form(
            "/checkout",
            "name=Ravi&phone=9876543210&address=12+Temple+Road&city=Pune&pincode=411001",
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.header("location").expect("redirect location");
    assert!(location.starts_with(&format!("https://wa.me/{TEST_ORDER_NUMBER}?text=")));
    assert!(location.contains("Desi%20Ghee%20%5B500%20g%5D%20%28x3%29"));

    // Handoff leaves the cart alone
    assert_eq!(client.get("/cart/json").await.json()["item_count"], 3);

    // A visitor without the cookie has their own cart
    let mut stranger = TestClient::new(app);
    assert_eq!(stranger.get("/cart/json").await.json()["item_count"], 0);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TEST_DATABASE_URL)"]
async fn test_add_rejects_unknown_product_and_variant() {
    let mut client = TestClient::new(test_app(seeded_pool().await));

    let response = client.post_form("/cart/add", "product_id=it-missing").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client
        .post_form("/cart/add", "product_id=it-ghee&variant_id=2kg")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(client.get("/cart/json").await.json()["item_count"], 0);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (TEST_DATABASE_URL)"]
async fn test_readiness_with_database() {
    let response = TestClient::new(test_app(seeded_pool().await))
        .get("/health/ready")
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
