//! End-to-end CRUD tests against a real PostgreSQL database.
//!
//! Apart from the unreachable-database cases these need PostgreSQL. Run with:
//! TEST_DATABASE_URL=postgres://... cargo test -p menu-service --test menu_crud_test

mod common;

use common::{get, happy_provider, offline_router, send, spawn_app, unique_suffix, TestApp};
use menu_service::services::providers::ScriptedTextProvider;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::test]
async fn database_failures_use_operation_messages() {
    let router = offline_router(Arc::new(happy_provider()), 100);

    let (status, body) = send(&router, get("/menu")).await;
    assert_eq!(status.as_u16(), 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Gagal mengambil data menu");
    assert!(body["error"].is_string());

    let (status, body) = send(&router, get("/menu/grouped")).await;
    assert_eq!(status.as_u16(), 500);
    assert_eq!(body["message"], "Gagal mengelompokkan menu");
}

#[tokio::test]
async fn update_rejects_blank_name_before_touching_database() {
    let router = offline_router(Arc::new(happy_provider()), 100);

    for payload in [json!({ "name": "   " }), json!({ "category": "  " })] {
        let request = axum::http::Request::builder()
            .method("PUT")
            .uri("/menu/1")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send(&router, request).await;

        assert_eq!(status.as_u16(), 422);
        assert_eq!(body["success"], false);
    }
}

async fn create(app: &TestApp, body: Value) -> (StatusCode, Value) {
    let response = app
        .client
        .post(app.url("/menu"))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse JSON"))
}

async fn fetch(app: &TestApp, path: &str) -> (StatusCode, Value) {
    let response = app
        .client
        .get(app.url(path))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse JSON"))
}

#[tokio::test]
async fn create_menu_fills_missing_fields_with_ai() {
    let provider = Arc::new(happy_provider());
    let Some(app) = spawn_app(provider.clone()).await else {
        return;
    };
    let name = format!("Nasi Goreng Kampung {}", unique_suffix());

    let (status, body) = create(
        &app,
        json!({ "name": name, "category": "Makanan", "ingredients": [" nasi ", "telur"] }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], name);
    assert_eq!(body["data"]["category"], "makanan");
    assert_eq!(body["data"]["ingredients"], json!(["nasi", "telur"]));
    assert_eq!(body["data"]["calories"], 650);
    assert_eq!(body["data"]["price"], 25000.0);
    assert!(body["data"]["description"]
        .as_str()
        .unwrap()
        .starts_with("Nasi goreng gurih"));
    assert_eq!(body["ai_assistance"]["description_generated"], true);
    assert_eq!(body["ai_assistance"]["calories_estimated"], true);
    assert_eq!(body["ai_assistance"]["price_estimated"], true);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn create_menu_keeps_user_values_and_skips_ai() {
    let provider = Arc::new(happy_provider());
    let Some(app) = spawn_app(provider.clone()).await else {
        return;
    };
    let name = format!("Es Teh Manis {}", unique_suffix());

    let (status, body) = create(
        &app,
        json!({
            "name": name,
            "category": "minuman",
            "description": "Teh melati dingin dengan gula aren",
            "calories": 120,
            "price": 8000
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"], "Teh melati dingin dengan gula aren");
    assert_eq!(body["data"]["calories"], 120);
    assert_eq!(body["data"]["price"], 8000.0);
    assert_eq!(body["ai_assistance"]["description_generated"], false);
    assert_eq!(body["ai_assistance"]["note"], "Semua data diisi manual oleh user");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn create_menu_survives_failed_estimates() {
    let provider = ScriptedTextProvider::new()
        .reply_when("Food Safety", common::DESCRIPTION_REPLY)
        .otherwise("maaf, saya tidak yakin");
    let Some(app) = spawn_app(Arc::new(provider)).await else {
        return;
    };
    let name = format!("Soto Betawi {}", unique_suffix());

    let (status, body) = create(&app, json!({ "name": name, "category": "makanan" })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["calories"], 0);
    assert_eq!(body["data"]["price"], 0.0);
    assert_eq!(body["ai_assistance"]["description_generated"], true);
    assert_eq!(body["ai_assistance"]["calories_estimated"], false);
    assert_eq!(body["ai_assistance"]["price_estimated"], false);
}

#[tokio::test]
async fn get_update_delete_round_trip() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };
    let name = format!("Mie Ayam Jamur {}", unique_suffix());

    let (_, created) = create(
        &app,
        json!({ "name": name, "category": "makanan", "description": "Mie kenyal dengan ayam kecap", "calories": 550, "price": 18000 }),
    )
    .await;
    let id = created["data"]["id"].as_i64().expect("id should be numeric");

    let (status, body) = fetch(&app, &format!("/menu/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], name);

    let response = app
        .client
        .put(app.url(&format!("/menu/{}", id)))
        .json(&json!({ "price": 20000, "category": " Makanan " }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Menu berhasil diupdate");
    assert_eq!(body["data"]["price"], 20000.0);
    assert_eq!(body["data"]["calories"], 550);
    assert_eq!(body["data"]["category"], "makanan");

    let response = app
        .client
        .delete(app.url(&format!("/menu/{}", id)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], format!("Menu '{}' berhasil dihapus", name));

    let (status, body) = fetch(&app, &format!("/menu/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Menu tidak ditemukan");
}

#[tokio::test]
async fn update_rejects_invalid_fields() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    let response = app
        .client
        .put(app.url("/menu/1"))
        .json(&json!({ "name": "ab", "price": 0 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_menu_is_not_found() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };

    let response = app
        .client
        .delete(app.url("/menu/999999999"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_and_search_filter_by_keyword_and_price() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };
    let tag = unique_suffix();

    for (label, price, calories) in [("Bakso Urat", 15000, 400), ("Bakso Bakar", 30000, 700)] {
        let (status, _) = create(
            &app,
            json!({
                "name": format!("{} {}", label, tag),
                "category": "makanan",
                "description": "Bakso sapi dengan kuah kaldu bening",
                "calories": calories,
                "price": price
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = fetch(&app, &format!("/menu?q={}&max_price=20000", tag)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], format!("Bakso Urat {}", tag));
    assert_eq!(body["filters_applied"]["sort"], "created_at:desc");

    let (_, body) = fetch(&app, &format!("/menu?q={}&sort=price:desc&per_page=1", tag)).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["data"][0]["name"], format!("Bakso Bakar {}", tag));

    let (_, body) = fetch(&app, &format!("/menu?q={}&max_cal=500", tag)).await;
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = fetch(&app, &format!("/menu/search?q={}&minPrice=20000", tag)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Berhasil melakukan pencarian");
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["filters_applied"]["price_range"]["min"], 20000.0);
}

#[tokio::test]
async fn grouping_and_counts_cover_created_categories() {
    let Some(app) = spawn_app(Arc::new(happy_provider())).await else {
        return;
    };
    let tag = unique_suffix();

    for name in ["Pisang Goreng", "Tahu Isi"] {
        let (status, _) = create(
            &app,
            json!({
                "name": format!("{} {}", name, tag),
                "category": "snack",
                "description": "Camilan gorengan hangat yang renyah",
                "calories": 200,
                "price": 5000
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = fetch(&app, "/menu/stats/category-counts").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["snack"].as_i64().unwrap() >= 2);

    let (_, body) = fetch(&app, "/menu/group-by-category?mode=count").await;
    assert!(body["data"]["snack"].as_i64().unwrap() >= 2);

    let (_, body) = fetch(&app, "/menu/group-by-category?per_category=1").await;
    assert_eq!(body["summary"]["items_per_category"], 1);
    assert_eq!(body["data"]["snack"].as_array().unwrap().len(), 1);

    let (_, body) = fetch(&app, "/menu/grouped").await;
    assert!(body["data"]["snack"].as_array().unwrap().len() >= 2);
}
