//! API integration tests
//!
//! Need a running server with an admin account (ADMIN_EMAIL / ADMIN_PASSWORD).

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn admin_credentials() -> (String, String) {
    (
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@rental.local".to_string()),
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".to_string()),
    )
}

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    let (email, password) = admin_credentials();
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_equipment(client: &Client, token: &str) -> String {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": "Integration test loader",
            "description": "Wheel loader",
            "category": "loader",
            "brand": "Volvo",
            "model": "L60H",
            "daily_rate": "150"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_str().expect("No id in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();
    let (email, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "nobody@rental.local", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_register_client() {
    let client = Client::new();
    let email = format!("client-{}@rental.local", uuid::Uuid::new_v4());
    let registration = json!({
        "first_name": "Lea",
        "last_name": "Moreau",
        "email": email,
        "password": "Str0ng!pass"
    });

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&registration)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["role"], "client");

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&registration)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_list_equipment() {
    let client = Client::new();

    let response = client
        .get(format!("{}/equipment?status=available", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let items = body.as_array().expect("Expected an array");
    assert!(items.iter().all(|e| e["status"] == "available"));
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_without_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/reservations/active", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_reservation_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let equipment_id = create_equipment(&client, &token).await;

    let start = chrono::Utc::now() + chrono::Duration::days(30);
    let end = start + chrono::Duration::days(3);
    let booking = json!({
        "equipment_id": equipment_id,
        "start_date": start,
        "end_date": end,
        "delivery_required": true
    });

    // Availability quote before booking
    let response = client
        .get(format!("{}/equipment/{}/availability", BASE_URL, equipment_id))
        .query(&[("start_date", start.to_rfc3339()), ("end_date", end.to_rfc3339())])
        .send()
        .await
        .expect("Failed to send request");
    let quote: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(quote["available"], true);
    assert_eq!(quote["days"], 3);

    // Create
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&booking)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let reservation: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(reservation["status"], "pending");
    assert_eq!(reservation["number_of_days"], 3);
    let id = reservation["id"].as_str().expect("No id").to_string();

    // Approve
    let response = client
        .patch(format!("{}/reservations/{}/approve", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let reservation: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(reservation["status"], "approved");

    // Overlapping request is refused
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .bearer_auth(&token)
        .json(&booking)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Equipment with an approved reservation cannot be deleted
    let response = client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Cancel, then the equipment can go
    let response = client
        .patch(format!("{}/reservations/{}/cancel", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "cancellation_reason": "integration test" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
