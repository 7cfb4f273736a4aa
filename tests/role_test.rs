//! Role lifecycle tests: creation, protection of system roles, and
//! derived user counts.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn role_lifecycle() {
    let app = TestApp::new().await;
    let admin_token = app.login_admin().await;

    // Anyone can list active roles (registration form).
    let response = app.request("GET", "/api/roles/active", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<String> = response.body["data"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"user".to_string()));
    assert!(names.contains(&"superuser".to_string()));

    // Create a custom role.
    let response = app
        .request(
            "POST",
            "/api/roles",
            Some(serde_json::json!({
                "name": "Auditor",
                "display_name": "Auditor",
                "description": "Read-only compliance access",
                "permissions": ["read", "moderate"],
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    // Names are stored lowercase.
    assert_eq!(response.body["data"]["role"]["name"], "auditor");
    let role_id = response.body["data"]["role"]["id"].as_str().unwrap().to_string();

    // Duplicate names (case-insensitive) conflict.
    let response = app
        .request(
            "POST",
            "/api/roles",
            Some(serde_json::json!({
                "name": "AUDITOR",
                "display_name": "Auditor Again",
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Unknown permission names are rejected.
    let response = app
        .request(
            "POST",
            "/api/roles",
            Some(serde_json::json!({
                "name": "weird",
                "display_name": "Weird",
                "permissions": ["launch_missiles"],
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // A user assigned the role blocks its deletion.
    let user = app.create_active_user("dana", "password123", "user").await;
    let response = app
        .request(
            "PUT",
            &format!("/api/admin/users/{user}/role"),
            Some(serde_json::json!({ "role": "auditor" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "DELETE",
            &format!("/api/roles/{role_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Stats expose the derived count.
    let response = app
        .request("GET", "/api/roles/stats", None, Some(&admin_token))
        .await;
    let stats = response.body["data"]["stats"].as_array().unwrap();
    let auditor = stats.iter().find(|r| r["name"] == "auditor").unwrap();
    assert_eq!(auditor["user_count"], 1);

    // Reassign the user; the role becomes deletable.
    app.request(
        "PUT",
        &format!("/api/admin/users/{user}/role"),
        Some(serde_json::json!({ "role": "user" })),
        Some(&admin_token),
    )
    .await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/roles/{role_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn system_roles_are_immutable() {
    let app = TestApp::new().await;
    let admin_token = app.login_admin().await;

    let superuser_role = app
        .state
        .role_repo
        .find_by_name("superuser")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/api/roles/{}", superuser_role.id),
            Some(serde_json::json!({ "display_name": "Overlord" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "Cannot modify system roles");

    let response = app
        .request(
            "DELETE",
            &format!("/api/roles/{}", superuser_role.id),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "Cannot delete system roles");
}

#[tokio::test]
async fn role_management_requires_admin() {
    let app = TestApp::new().await;
    app.create_active_user("pleb", "password123", "user").await;
    let token = app.login("pleb@test.local", "password123").await;

    let response = app.request("GET", "/api/roles", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/roles",
            Some(serde_json::json!({ "name": "rogue", "display_name": "Rogue" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
