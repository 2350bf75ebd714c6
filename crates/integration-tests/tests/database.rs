//! Database-backed tests.
//!
//! These tests require a `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`; migrations are applied on connect. Rows use unique
//! slugs so runs do not collide.
//!
//! Run with: `cargo test -p teainn-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

use teainn_core::Slug;
use teainn_integration_tests::{
    app_with_pool, database_pool, json_request, read_json, request, session_cookie, test_config,
    unique_slug,
};
use teainn_server::config::BootstrapAdmin;
use teainn_server::db::{
    AdminRepository, CategoryRepository, ProductRepository, RepositoryError, SettingsRepository,
};
use teainn_server::models::{
    Category, NewCategory, NewProduct, NewSize, Product, ProductChanges, ProductFilter,
};
use teainn_server::services::{AuthError, AuthService};
use teainn_server::state::AppState;

async fn create_category(pool: &PgPool, is_active: bool) -> Category {
    CategoryRepository::new(pool)
        .create(&NewCategory {
            name: "測試分類".to_owned(),
            slug: Slug::parse(&unique_slug("category")).unwrap(),
            description: None,
            order: 0,
            is_active,
        })
        .await
        .unwrap()
}

fn size(name: &str, price_add: i32, order: i32) -> NewSize {
    NewSize {
        name: name.to_owned(),
        price_add,
        is_default: order == 1,
        order,
    }
}

async fn create_product(pool: &PgPool, category: &Category, order: i32) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            name: "測試飲品".to_owned(),
            slug: Slug::parse(&unique_slug("product")).unwrap(),
            description: None,
            price: 60,
            image: None,
            category_id: category.id,
            is_active: true,
            is_featured: false,
            is_new: false,
            order,
            calories: None,
            tags: Vec::new(),
            sizes: vec![size("中杯", 0, 1), size("大杯", 10, 2)],
            toppings: Vec::new(),
        })
        .await
        .unwrap()
}

/// Create an admin and log in through the router, returning the session cookie.
async fn admin_cookie(app: &Router, pool: &PgPool) -> String {
    let username = unique_slug("admin");
    AuthService::new(pool, None)
        .create_admin(&username, "jasmine-green-42", None)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/admin/login",
            &json!({ "username": username, "password": "jasmine-green-42" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response).unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

/// Send an authenticated admin request and return status and JSON body.
async fn admin_call(
    app: &Router,
    cookie: &str,
    method: Method,
    uri: &str,
    body: &Value,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(with_cookie(json_request(method, uri, body), cookie))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request(Method::GET, uri))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_deleting_category_removes_its_products() {
    let pool = database_pool().await;
    let category = create_category(&pool, true).await;
    let product = create_product(&pool, &category, 0).await;

    CategoryRepository::new(&pool)
        .delete(category.id)
        .await
        .unwrap();

    let products = ProductRepository::new(&pool);
    assert!(products.get(product.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_product_update_replaces_sizes() {
    let pool = database_pool().await;
    let category = create_category(&pool, true).await;
    let product = create_product(&pool, &category, 0).await;
    assert_eq!(product.sizes.len(), 2);

    let updated = ProductRepository::new(&pool)
        .update(
            product.id,
            ProductChanges {
                sizes: Some(vec![size("特大杯", 20, 1)]),
                ..ProductChanges::default()
            },
        )
        .await
        .unwrap();

    let names: Vec<&str> = updated.sizes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["特大杯"]);
    assert_eq!(updated.sizes[0].price_add, 20);
    // Fields not in the change set are kept
    assert_eq!(updated.price, 60);
    assert_eq!(updated.name, "測試飲品");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_duplicate_category_slug_conflicts() {
    let pool = database_pool().await;
    let slug = Slug::parse(&unique_slug("dup")).unwrap();
    let new = NewCategory {
        name: "重複".to_owned(),
        slug,
        description: None,
        order: 0,
        is_active: true,
    };

    let categories = CategoryRepository::new(&pool);
    categories.create(&new).await.unwrap();
    let second = categories.create(&new).await;

    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_public_product_list_is_ordered_and_filtered() {
    let pool = database_pool().await;
    let category = create_category(&pool, true).await;
    let second = create_product(&pool, &category, 2).await;
    let first = create_product(&pool, &category, 1).await;
    let hidden = create_product(&pool, &category, 0).await;
    ProductRepository::new(&pool)
        .update(
            hidden.id,
            ProductChanges {
                is_active: Some(false),
                ..ProductChanges::default()
            },
        )
        .await
        .unwrap();

    let listed = ProductRepository::new(&pool)
        .list(&ProductFilter::public(
            Some(category.slug.as_str().to_owned()),
            false,
        ))
        .await
        .unwrap();

    let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, [first.id, second.id]);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_unknown_category_is_invalid_reference() {
    let pool = database_pool().await;
    let category = create_category(&pool, true).await;
    let product = create_product(&pool, &category, 0).await;

    let result = ProductRepository::new(&pool)
        .update(
            product.id,
            ProductChanges {
                category_id: Some(teainn_core::CategoryId::new(i32::MAX)),
                ..ProductChanges::default()
            },
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::InvalidReference(_))));
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_settings_upsert_keeps_other_keys() {
    let pool = database_pool().await;
    let settings = SettingsRepository::new(&pool);
    let kept = unique_slug("kept");
    let changed = unique_slug("changed");

    settings
        .upsert_many(&BTreeMap::from([
            (kept.clone(), "a".to_owned()),
            (changed.clone(), "b".to_owned()),
        ]))
        .await
        .unwrap();
    settings
        .upsert_many(&BTreeMap::from([(changed.clone(), "c".to_owned())]))
        .await
        .unwrap();

    let all = settings.get_all().await.unwrap();
    assert_eq!(all.get(&kept).map(String::as_str), Some("a"));
    assert_eq!(all.get(&changed).map(String::as_str), Some("c"));
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_admin_login_then_settings_round_trip() {
    let pool = database_pool().await;
    let username = unique_slug("admin");
    AuthService::new(&pool, None)
        .create_admin(&username, "jasmine-green-42", Some("測試管理員"))
        .await
        .unwrap();

    let other_key = unique_slug("other");
    SettingsRepository::new(&pool)
        .upsert_many(&BTreeMap::from([(other_key.clone(), "unchanged".to_owned())]))
        .await
        .unwrap();

    let app = app_with_pool(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/admin/login",
            &json!({ "username": username, "password": "jasmine-green-42" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();
    assert_eq!(read_json(response).await["name"], "測試管理員");

    let mut save = json_request(
        Method::POST,
        "/api/admin/settings",
        &json!({ "phone": "02-1111" }),
    );
    save.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(save).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(Method::GET, "/api/settings"))
        .await
        .unwrap();
    let settings = read_json(response).await;
    assert_eq!(settings["phone"], "02-1111");
    assert_eq!(settings[other_key.as_str()], "unchanged");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_wrong_password_is_rejected() {
    let pool = database_pool().await;
    let username = unique_slug("admin");
    AuthService::new(&pool, None)
        .create_admin(&username, "jasmine-green-42", None)
        .await
        .unwrap();

    let response = app_with_pool(pool)
        .oneshot(json_request(
            Method::POST,
            "/api/admin/login",
            &json!({ "username": username, "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

// =============================================================================
// Public lists
// =============================================================================

type BodyFn = fn(i32, bool) -> Value;

fn category_body(order: i32, is_active: bool) -> Value {
    json!({ "name": "分類", "slug": unique_slug("category"), "order": order, "isActive": is_active })
}

fn store_body(order: i32, is_active: bool) -> Value {
    json!({
        "name": "門市",
        "slug": unique_slug("store"),
        "address": "台北市大安區",
        "openingHours": "10:00-22:00",
        "order": order,
        "isActive": is_active,
    })
}

fn event_body(order: i32, is_active: bool) -> Value {
    json!({ "title": "活動", "slug": unique_slug("event"), "order": order, "isActive": is_active })
}

fn promotion_body(order: i32, is_active: bool) -> Value {
    json!({ "title": unique_slug("promotion"), "order": order, "isActive": is_active })
}

fn franchise_body(order: i32, is_active: bool) -> Value {
    json!({
        "name": unique_slug("plan"),
        "investment": "150 萬",
        "order": order,
        "isActive": is_active,
    })
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_public_lists_hide_inactive_rows_and_sort_by_order() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;

    let resources: [(&str, &str, BodyFn); 5] = [
        ("/api/admin/categories", "/api/categories", category_body),
        ("/api/admin/stores", "/api/stores", store_body),
        ("/api/admin/events", "/api/events", event_body),
        ("/api/admin/promotions", "/api/promotions", promotion_body),
        ("/api/admin/franchise-plans", "/api/franchise-plans", franchise_body),
    ];

    for (admin_uri, public_uri, body) in resources {
        let mut created = Vec::new();
        for (order, is_active) in [(2, true), (1, true), (0, false)] {
            let (status, row) =
                admin_call(&app, &cookie, Method::POST, admin_uri, &body(order, is_active)).await;
            assert_eq!(status, StatusCode::CREATED, "{admin_uri}: {row}");
            created.push(row["id"].clone());
        }
        let (later, earlier) = (&created[0], &created[1]);

        let (status, listed) = get_json(&app, public_uri).await;
        assert_eq!(status, StatusCode::OK);
        let ours: Vec<&Value> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|row| &row["id"])
            .filter(|id| created.contains(*id))
            .collect();

        assert_eq!(ours, [earlier, later], "{public_uri}");
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_inactive_event_is_hidden_by_slug() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;

    let active = event_body(0, true);
    let inactive = event_body(0, false);
    for body in [&active, &inactive] {
        let (status, _) = admin_call(&app, &cookie, Method::POST, "/api/admin/events", body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/events/{}", active["slug"].as_str().unwrap());
    let (status, event) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["slug"], active["slug"]);

    let uri = format!("/api/events/{}", inactive["slug"].as_str().unwrap());
    let (status, body) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "活動已下架" }));

    let uri = format!("/api/events/{}", unique_slug("missing"));
    let (status, body) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "活動不存在" }));
}

// =============================================================================
// Contact inbox and dashboard
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_contact_submission_reaches_admin_inbox() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;
    let email = format!("{}@example.com", unique_slug("guest"));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/contact",
            &json!({ "name": "王小明", "email": email, "message": "想詢問加盟" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        read_json(response).await,
        json!({ "message": "感謝您的訊息，我們會盡快回覆！" })
    );

    let (status, inbox) =
        admin_call(&app, &cookie, Method::GET, "/api/admin/contact-messages", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let message = inbox
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["email"] == email.as_str())
        .unwrap()
        .clone();
    assert_eq!(message["isRead"], false);
    assert_eq!(message["message"], "想詢問加盟");

    // An empty body marks the message read
    let uri = format!("/api/admin/contact-messages/{}", message["id"]);
    let (status, updated) = admin_call(&app, &cookie, Method::PUT, &uri, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isRead"], true);

    let (_, updated) =
        admin_call(&app, &cookie, Method::PUT, &uri, &json!({ "isRead": false })).await;
    assert_eq!(updated["isRead"], false);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_dashboard_counts_include_new_rows() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;

    let (status, _) =
        admin_call(&app, &cookie, Method::POST, "/api/admin/events", &event_body(0, true)).await;
    assert_eq!(status, StatusCode::CREATED);
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/contact",
            &json!({
                "name": "林小姐",
                "email": format!("{}@example.com", unique_slug("guest")),
                "message": "門市營業時間？",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, stats) =
        admin_call(&app, &cookie, Method::GET, "/api/admin/dashboard", &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let count = |key: &str| stats[key].as_i64().unwrap();
    assert!(count("activeEvents") >= 1);
    assert!(count("unreadMessages") >= 1);
    assert!(count("messages") >= count("unreadMessages"));
    for key in ["products", "stores", "categories"] {
        assert!(stats[key].is_i64(), "{key} missing from {stats}");
    }
}

// =============================================================================
// Franchise plans and content
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_franchise_plan_slug_comes_from_name() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let body = json!({ "name": format!("旗艦店 {suffix}"), "investment": "300 萬" });

    let (status, plan) =
        admin_call(&app, &cookie, Method::POST, "/api/admin/franchise-plans", &body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["slug"], format!("旗艦店-{suffix}"));

    let (status, _) =
        admin_call(&app, &cookie, Method::POST, "/api/admin/franchise-plans", &body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/admin/franchise-plans/{}", plan["id"]);
    let (status, deleted) = admin_call(&app, &cookie, Method::DELETE, &uri, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "success": true }));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_content_block_put_is_served_publicly() {
    let pool = database_pool().await;
    let app = app_with_pool(pool.clone());
    let cookie = admin_cookie(&app, &pool).await;
    let key = unique_slug("section");
    let payload = json!({ "title": "夏日新品", "items": ["芒果", "荔枝"] });

    let (status, _) = get_json(&app, &format!("/api/content/{key}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/admin/content-blocks/{key}");
    let (status, block) =
        admin_call(&app, &cookie, Method::PUT, &uri, &json!({ "payload": payload })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(block["key"], key.as_str());

    let (status, served) = get_json(&app, &format!("/api/content/{key}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, payload);
}

// =============================================================================
// Bootstrap admin
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_bootstrap_admin_is_created_on_first_login() {
    let pool = database_pool().await;
    let username = unique_slug("owner");
    let bootstrap = BootstrapAdmin {
        username: username.clone(),
        password: SecretString::from("oolong-bootstrap-77".to_owned()),
        display_name: "管理員".to_owned(),
    };
    let auth = AuthService::new(&pool, Some(&bootstrap));
    let admins = AdminRepository::new(&pool);

    let wrong = auth.login(&username, "oolong-bootstrap-78").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    assert!(admins.get_with_hash(&username).await.unwrap().is_none());

    let mut config = test_config("postgres://test");
    config.bootstrap_admin = Some(bootstrap.clone());
    let app = teainn_server::app(AppState::new(config, pool.clone()));
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/admin/login",
            &json!({ "username": username, "password": "oolong-bootstrap-77" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
    assert_eq!(read_json(response).await["name"], "管理員");

    let (created, hash) = admins.get_with_hash(&username).await.unwrap().unwrap();
    assert_eq!(created.name.as_deref(), Some("管理員"));
    assert!(hash.starts_with("$argon2id$"));

    // Later logins verify against the stored hash
    let again = auth.login(&username, "oolong-bootstrap-77").await.unwrap();
    assert_eq!(again.id, created.id);
    let (_, unchanged) = admins.get_with_hash(&username).await.unwrap().unwrap();
    assert_eq!(unchanged, hash);

    // A rotated stored password wins over the environment pair
    auth.set_password(&username, "new-oolong-password").await.unwrap();
    let stale = auth.login(&username, "oolong-bootstrap-77").await;
    assert!(matches!(stale, Err(AuthError::InvalidCredentials)));
}
