//! End-to-end tests for the download-request authorization workflow:
//! request creation, admin decisions, token consumption, and expiry.

mod helpers;

use http::StatusCode;

use helpers::TestApp;

/// Full happy path: request -> approve with an allowance of 2 -> two
/// downloads -> exhaustion.
#[tokio::test]
async fn request_approve_download_until_limit() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "audit-report", false).await;

    let user_token = app.login("requester@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    // File the request.
    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "audit" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();
    assert_eq!(response.body["data"]["status"], "pending");

    // Status query shows pending, no token.
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "pending");
    assert!(response.body["data"]["download_token"].is_null());

    // Admin approves with max_downloads = 2.
    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "approve", "max_downloads": 2 })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["status"], "approved");
    let token = response.body["data"]["download_token"]
        .as_str()
        .unwrap()
        .to_string();

    // Status now reports the token and counts.
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "approved");
    assert_eq!(response.body["data"]["download_token"], token.as_str());
    assert_eq!(response.body["data"]["download_count"], 0);
    assert_eq!(response.body["data"]["max_downloads"], 2);

    // First download succeeds, status remains approved.
    let (status, body) = app.download(&token, &user_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"confidential document body");

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "approved");
    assert_eq!(response.body["data"]["download_count"], 1);

    // Second download succeeds and exhausts the allowance.
    let (status, _) = app.download(&token, &user_token).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "expired");
    assert_eq!(response.body["data"]["download_count"], 2);

    // Third download fails with the limit error, not a generic failure.
    let (status, body) = app.download(&token, &user_token).await;
    assert_eq!(status, StatusCode::GONE);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "LIMIT_EXCEEDED");

    // The document aggregate counted both downloads.
    let doc = app
        .state
        .document_repo
        .find_by_id(doc.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.download_count, 2);
}

/// Rejection stores the reason, never issues a token, and frees the pair
/// for a new request.
#[tokio::test]
async fn rejection_frees_the_pair() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "blueprint", false).await;

    let user_token = app.login("requester@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "need it" })),
            Some(&user_token),
        )
        .await;
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "reject", "reason": "policy violation" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["status"], "rejected");
    assert!(response.body["data"].get("download_token").is_none());

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "rejected");
    assert_eq!(response.body["data"]["rejection_reason"], "policy violation");
    assert!(response.body["data"]["download_token"].is_null());

    // The pair is no longer active; a fresh request is accepted.
    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "second try" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
}

/// Rejecting without a reason stores the default.
#[tokio::test]
async fn rejection_without_reason_uses_default() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "handbook", false).await;

    let user_token = app.login("requester@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "research" })),
            Some(&user_token),
        )
        .await;
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();

    app.request(
        "PATCH",
        &format!("/api/admin/download-requests/{request_id}"),
        Some(serde_json::json!({ "action": "reject" })),
        Some(&admin_token),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(
        response.body["data"]["rejection_reason"],
        "No reason provided"
    );
}

/// Two concurrent requests for the same pair: exactly one wins.
#[tokio::test]
async fn concurrent_requests_yield_one_winner() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    let requester = app
        .create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "contract", false).await;

    let ctx = docsense_service::context::RequestContext::new(
        requester,
        "user".into(),
        "requester".into(),
        "127.0.0.1".into(),
        None,
    );

    let service = &app.state.download_service;
    let (a, b) = tokio::join!(
        service.create_request(&ctx, doc.id, "first"),
        service.create_request(&ctx, doc.id, "second"),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one request must win: {a:?} / {b:?}");

    let conflict = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert_eq!(conflict.kind, docsense_core::ErrorKind::Conflict);
}

/// A duplicate request while one is active fails with Conflict.
#[tokio::test]
async fn duplicate_active_request_conflicts() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "ledger", false).await;

    let user_token = app.login("requester@test.local", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "first" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "again" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

/// Deciding twice: the second decision fails and the first stands.
#[tokio::test]
async fn second_decision_fails_with_invalid_state() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "minutes", false).await;

    let user_token = app.login("requester@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "review" })),
            Some(&user_token),
        )
        .await;
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "approve" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Approve-then-reject: the reject must fail, the approval must stand.
    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "reject", "reason": "changed my mind" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "INVALID_STATE");
    assert_eq!(response.body["message"], "Request has already been processed");

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "approved");
}

/// Two admins racing to decide: one winner, one InvalidState.
#[tokio::test]
async fn racing_admins_decide_exactly_once() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    let requester = app
        .create_active_user("requester", "password123", "user")
        .await;
    let admin = app
        .create_active_user("second-admin", "password123", "superuser")
        .await;
    let doc = app.create_document(owner, "filing", false).await;

    let user_ctx = docsense_service::context::RequestContext::new(
        requester,
        "user".into(),
        "requester".into(),
        "127.0.0.1".into(),
        None,
    );
    let admin_ctx = docsense_service::context::RequestContext::new(
        admin,
        "superuser".into(),
        "second-admin".into(),
        "127.0.0.1".into(),
        None,
    );

    let service = &app.state.download_service;
    let request = service
        .create_request(&user_ctx, doc.id, "urgent")
        .await
        .unwrap();

    use docsense_service::download::Decision;
    let (a, b) = tokio::join!(
        service.decide(
            &admin_ctx,
            request.id,
            Decision::Approve { max_downloads: None },
        ),
        service.decide(
            &admin_ctx,
            request.id,
            Decision::Reject { reason: None },
        ),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one decision must win: {a:?} / {b:?}");

    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert_eq!(loser.kind, docsense_core::ErrorKind::InvalidState);
}

/// Concurrent consumption of a single-use token: no over-consumption.
#[tokio::test]
async fn concurrent_downloads_never_overconsume() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    let requester = app
        .create_active_user("requester", "password123", "user")
        .await;
    let admin = app
        .create_active_user("deciding-admin", "password123", "superuser")
        .await;
    let doc = app.create_document(owner, "one-shot", false).await;

    let user_ctx = docsense_service::context::RequestContext::new(
        requester,
        "user".into(),
        "requester".into(),
        "127.0.0.1".into(),
        None,
    );
    let admin_ctx = docsense_service::context::RequestContext::new(
        admin,
        "superuser".into(),
        "deciding-admin".into(),
        "127.0.0.1".into(),
        None,
    );

    let service = &app.state.download_service;
    let request = service
        .create_request(&user_ctx, doc.id, "one shot")
        .await
        .unwrap();
    let approved = service
        .decide(
            &admin_ctx,
            request.id,
            docsense_service::download::Decision::Approve {
                max_downloads: Some(1),
            },
        )
        .await
        .unwrap();
    let token = approved.download_token.unwrap();

    let (a, b) = tokio::join!(
        service.download_by_token(&token),
        service.download_by_token(&token),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "token must be consumed exactly once");

    let request = app
        .state
        .download_repo
        .find_by_id(request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.download_count, 1);
    assert_eq!(
        request.status,
        docsense_entity::download::RequestStatus::Expired
    );
}

/// Wall-clock expiry: the stored status stays `approved` while downloads
/// fail with EXPIRED (distinct from the limit error).
#[tokio::test]
async fn time_expired_token_reads_approved_but_fails_download() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "stale", false).await;

    let user_token = app.login("requester@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "later" })),
            Some(&user_token),
        )
        .await;
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "approve", "max_downloads": 5 })),
            Some(&admin_token),
        )
        .await;
    let token = response.body["data"]["download_token"]
        .as_str()
        .unwrap()
        .to_string();

    // Age the token past its 24-hour window.
    let past = chrono::Utc::now() - chrono::Duration::hours(1);
    sqlx::query("UPDATE download_requests SET token_expires_at = ? WHERE id = ?")
        .bind(past)
        .bind(uuid::Uuid::parse_str(&request_id).unwrap())
        .execute(&app.state.db_pool)
        .await
        .unwrap();

    // The status query still reads the stored status: approved.
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.body["data"]["status"], "approved");

    // But consumption fails with the time-expiry error.
    let (status, body) = app.download(&token, &user_token).await;
    assert_eq!(status, StatusCode::GONE);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "EXPIRED");

    // Nothing was consumed.
    let request = app
        .state
        .download_repo
        .find_by_id(uuid::Uuid::parse_str(&request_id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.download_count, 0);
}

/// Request validation and error classification edge cases.
#[tokio::test]
async fn request_validation_errors() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "doc", false).await;

    let user_token = app.login("requester@test.local", "password123").await;

    // Empty (whitespace) reason.
    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "   " })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Download reason is required");

    // Unknown document.
    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", uuid::Uuid::new_v4()),
            Some(serde_json::json!({ "reason": "x" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // No request yet: synthetic "none" status, distinct from stored ones.
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "none");

    // Unknown token is NOT_FOUND, not an expiry error.
    let (status, body) = app.download("deadbeef", &user_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "NOT_FOUND");

    // Unauthenticated status query is rejected.
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{}/download-status", doc.id),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

/// Only superusers may list or decide download requests.
#[tokio::test]
async fn request_management_is_admin_only() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("requester", "password123", "user")
        .await;
    let doc = app.create_document(owner, "doc", false).await;

    let user_token = app.login("requester@test.local", "password123").await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{}/request-download", doc.id),
            Some(serde_json::json!({ "reason": "why not" })),
            Some(&user_token),
        )
        .await;
    let request_id = response.body["data"]["request_id"].as_str().unwrap().to_string();

    let response = app
        .request("GET", "/api/admin/download-requests", None, Some(&user_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PATCH",
            &format!("/api/admin/download-requests/{request_id}"),
            Some(serde_json::json!({ "action": "approve" })),
            Some(&user_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

/// Admin listing supports status filters and newest-first ordering.
#[tokio::test]
async fn admin_listing_filters_by_status() {
    let app = TestApp::new().await;
    let owner = app.create_active_user("owner", "password123", "user").await;
    app.create_active_user("alice", "password123", "user").await;
    app.create_active_user("bob", "password123", "user").await;
    let doc = app.create_document(owner, "doc", false).await;

    let alice_token = app.login("alice@test.local", "password123").await;
    let bob_token = app.login("bob@test.local", "password123").await;
    let admin_token = app.login_admin().await;

    for (token, reason) in [(&alice_token, "a"), (&bob_token, "b")] {
        let response = app
            .request(
                "POST",
                &format!("/api/documents/{}/request-download", doc.id),
                Some(serde_json::json!({ "reason": reason })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app
        .request(
            "GET",
            "/api/admin/download-requests?status=pending",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["requests"]["items"]
            .as_array()
            .unwrap()
            .len(),
        2
    );

    let response = app
        .request(
            "GET",
            "/api/admin/download-requests?status=approved",
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(
        response.body["data"]["requests"]["items"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
}
