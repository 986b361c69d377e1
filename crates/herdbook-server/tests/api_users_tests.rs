//! Integration tests for registration, tokens and the profile endpoints

use axum::http::StatusCode;
use serde_json::json;

mod helpers;
use helpers::{TestApp, TEST_PASSWORD};

const USERS_URL: &str = "/api/v1/users";
const TOKEN_URL: &str = "/api/v1/users/token";
const ME_URL: &str = "/api/v1/users/me";

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new().await;

    let response = app
        .post(
            USERS_URL,
            None,
            json!({ "email": "Farmer@HOLMEGROWN.com", "password": "testpass", "name": "Farmer" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.data()["email"], "Farmer@holmegrown.com");
    assert_eq!(response.data()["is_staff"], false);
    assert!(response.data().get("password").is_none());
    assert!(response.data().get("password_hash").is_none());

    let token = app
        .post(TOKEN_URL, None, json!({ "email": "Farmer@holmegrown.com", "password": "testpass" }))
        .await;
    assert_eq!(token.status, StatusCode::OK);
    let key = token.data()["token"].as_str().unwrap().to_string();
    assert_eq!(key.len(), 40);

    let me = app.get(ME_URL, Some(&key)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["name"], "Farmer");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    app.create_user("taken@farm.io").await;

    let response = app
        .post(USERS_URL, None, json!({ "email": "taken@farm.io", "password": "testpass", "name": "X" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.details()["email"][0], "user with this email already exists.");

    let response = app
        .post(USERS_URL, None, json!({ "email": "nope", "password": "pw" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.details()["email"][0], "Enter a valid email address.");
    assert_eq!(response.details()["password"][0], "Ensure this field has at least 5 characters.");
    assert_eq!(response.details()["name"][0], "This field is required.");
}

#[tokio::test]
async fn test_token_with_wrong_password() {
    let app = TestApp::new().await;
    app.create_user("farmer@farm.io").await;

    let response = app
        .post(TOKEN_URL, None, json!({ "email": "farmer@farm.io", "password": "wrongpass" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.details()["non_field_errors"][0],
        "Unable to authenticate with provided credentials"
    );
}

#[tokio::test]
async fn test_token_is_stable_across_logins() {
    let app = TestApp::new().await;
    app.create_user("farmer@farm.io").await;
    let body = json!({ "email": "farmer@farm.io", "password": TEST_PASSWORD });

    let first = app.post(TOKEN_URL, None, body.clone()).await;
    let second = app.post(TOKEN_URL, None, body).await;
    assert_eq!(first.data()["token"], second.data()["token"]);
}

#[tokio::test]
async fn test_update_me() {
    let app = TestApp::new().await;
    let (_, token) = app.login("farmer@farm.io").await;

    let response = app
        .patch(ME_URL, Some(&token), json!({ "name": "New Name", "password": "newpassword" }))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["name"], "New Name");
    assert_eq!(response.data()["email"], "farmer@farm.io");

    let old = app
        .post(TOKEN_URL, None, json!({ "email": "farmer@farm.io", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(old.status, StatusCode::BAD_REQUEST);

    let new = app
        .post(TOKEN_URL, None, json!({ "email": "farmer@farm.io", "password": "newpassword" }))
        .await;
    assert_eq!(new.status, StatusCode::OK);
}
