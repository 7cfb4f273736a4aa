//! Registration and login flow tests, including the account approval
//! workflow.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn registration_requires_approval_before_login() {
    let app = TestApp::new().await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "newcomer",
                "email": "newcomer@test.local",
                "phone": "+15551234567",
                "role": "user",
                "password": "secret99",
                "password_confirm": "secret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["status"], "pending");
    let user_id = response.body["data"]["id"].as_str().unwrap().to_string();

    // Pending accounts cannot log in.
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "newcomer@test.local",
                "password": "secret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Account awaiting approval");

    // The account shows up in the admin's pending queue.
    let response = app
        .request("GET", "/api/admin/requests", None, Some(&admin_token))
        .await;
    assert_eq!(response.body["data"]["count"], 1);

    // Approve, then login succeeds.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/requests/{user_id}/approve"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let token = app.login("newcomer@test.local", "secret99").await;
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.body["data"]["username"], "newcomer");
    assert_eq!(response.body["data"]["status"], "active");
}

#[tokio::test]
async fn rejected_accounts_cannot_login() {
    let app = TestApp::new().await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "unwanted",
                "email": "unwanted@test.local",
                "phone": "+15551234567",
                "password": "secret99",
                "password_confirm": "secret99",
            })),
            None,
        )
        .await;
    let user_id = response.body["data"]["id"].as_str().unwrap().to_string();

    app.request(
        "POST",
        &format!("/api/admin/requests/{user_id}/reject"),
        None,
        Some(&admin_token),
    )
    .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "unwanted@test.local",
                "password": "secret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["message"], "Account has been rejected");
}

#[tokio::test]
async fn registration_validation_and_conflicts() {
    let app = TestApp::new().await;

    // Mismatched confirmation.
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "someone",
                "email": "someone@test.local",
                "phone": "+15551234567",
                "password": "secret99",
                "password_confirm": "different",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Unknown role.
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "someone",
                "email": "someone@test.local",
                "phone": "+15551234567",
                "role": "archmage",
                "password": "secret99",
                "password_confirm": "secret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Duplicate email.
    app.create_active_user("existing", "password123", "user")
        .await;
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "existing2",
                "email": "existing@test.local",
                "phone": "+15551234567",
                "password": "secret99",
                "password_confirm": "secret99",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    app.create_active_user("alice", "password123", "user").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@test.local",
                "password": "not-the-password",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn refresh_issues_new_access_token() {
    let app = TestApp::new().await;
    app.create_active_user("alice", "password123", "user").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "alice@test.local",
                "password": "password123",
            })),
            None,
        )
        .await;
    let refresh_token = response.body["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let access = response.body["data"]["access_token"].as_str().unwrap();

    let response = app.request("GET", "/api/auth/me", None, Some(access)).await;
    assert_eq!(response.status, StatusCode::OK);

    // An access token is not accepted as a refresh token.
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": access })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
