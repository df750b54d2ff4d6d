/// Integration tests for the task endpoints
///
/// Drive the full router (auth layer included) against the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{TestContext, ISSUER, START_MILLIS};
use serde_json::json;
use taskboard_shared::auth::session::{SessionClaims, SessionKeys};

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_health_reports_store_outage() {
    let ctx = TestContext::new();
    ctx.store.set_available(false);

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "disconnected");
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_bad_tokens_rejected() {
    let ctx = TestContext::new();

    let wrong_secret = SessionKeys::new("some-other-secret-that-is-32-bytes-long", ISSUER)
        .issue(&SessionClaims::new("u1", "u1@example.com", ISSUER, Duration::hours(1)))
        .unwrap();
    let expired = ctx
        .keys
        .issue(&SessionClaims::new("u1", "u1@example.com", ISSUER, Duration::hours(-2)))
        .unwrap();
    let wrong_issuer = ctx
        .keys
        .issue(&SessionClaims::new("u1", "u1@example.com", "elsewhere", Duration::hours(1)))
        .unwrap();

    for token in [wrong_secret, expired, wrong_issuer] {
        let (status, _) = ctx.send(Method::GET, "/v1/tasks", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let ctx = TestContext::new();
    let request = axum::http::Request::builder()
        .uri("/v1/tasks")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_then_list() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, created) = ctx
        .send(
            Method::POST,
            "/v1/tasks",
            Some(&token),
            Some(json!({ "title": " Buy milk ", "priority": "low" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], created["task"]["id"]);

    let task = &created["task"];
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["completed"], false);
    assert_eq!(task["user_id"], "u1");
    assert_eq!(task["created_at"], START_MILLIS);
    assert_eq!(task["created_at"], task["updated_at"]);

    let (status, list) = ctx.send(Method::GET, "/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["tasks"][0], *task);

    // Another user sees nothing
    let other = ctx.token("u2");
    let (_, list) = ctx.send(Method::GET, "/v1/tasks", Some(&other), None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_blank_title_is_validation_error() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/v1/tasks",
            Some(&token),
            Some(json!({ "title": "   ", "priority": "high" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "title");

    let (_, list) = ctx.send(Method::GET, "/v1/tasks", Some(&token), None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_unknown_priority_rejected() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, _) = ctx
        .send(
            Method::POST,
            "/v1/tasks",
            Some(&token),
            Some(json!({ "title": "x", "priority": "urgent" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_priority_filter_newest_first() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    ctx.create_task("u1", json!({ "title": "a", "priority": "low" })).await;
    let b = ctx.create_task("u1", json!({ "title": "b", "priority": "high" })).await;
    let c = ctx.create_task("u1", json!({ "title": "c", "priority": "high" })).await;

    let (status, list) = ctx
        .send(Method::GET, "/v1/tasks?priority=high", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 2);
    assert_eq!(list["tasks"][0]["id"], c["id"]);
    assert_eq!(list["tasks"][1]["id"], b["id"]);
}

#[tokio::test]
async fn test_completion_filter_and_bad_query() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let a = ctx.create_task("u1", json!({ "title": "a", "priority": "low" })).await;
    ctx.create_task("u1", json!({ "title": "b", "priority": "low" })).await;
    ctx.send(
        Method::POST,
        &format!("/v1/tasks/{}/toggle", a["id"].as_str().unwrap()),
        Some(&token),
        None,
    )
    .await;

    let (_, done) = ctx
        .send(Method::GET, "/v1/tasks?completed=true", Some(&token), None)
        .await;
    assert_eq!(done["count"], 1);
    assert_eq!(done["tasks"][0]["id"], a["id"]);

    let (status, _) = ctx
        .send(Method::GET, "/v1/tasks?completed=maybe", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_toggle_twice_restores_flag() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");
    let task = ctx.create_task("u1", json!({ "title": "a", "priority": "medium" })).await;
    let uri = format!("/v1/tasks/{}/toggle", task["id"].as_str().unwrap());

    let (status, once) = ctx.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, twice) = ctx.send(Method::POST, &uri, Some(&token), None).await;

    assert_eq!(once["completed"], true);
    assert_eq!(twice["completed"], false);
    assert!(once["updated_at"].as_i64() > task["updated_at"].as_i64());
    assert!(twice["updated_at"].as_i64() > once["updated_at"].as_i64());
}

#[tokio::test]
async fn test_patch_title_only() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");
    let task = ctx
        .create_task(
            "u1",
            json!({ "title": "old", "priority": "low", "description": "keep me", "due_date": START_MILLIS + 1000 }),
        )
        .await;
    ctx.clock.advance(5_000);

    let uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());
    let (status, patched) = ctx
        .send(Method::PATCH, &uri, Some(&token), Some(json!({ "title": "new" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "new");
    assert_eq!(patched["updated_at"], START_MILLIS + 5_000);
    for field in ["description", "completed", "priority", "due_date", "user_id", "created_at"] {
        assert_eq!(patched[field], task[field], "{field} changed");
    }
}

#[tokio::test]
async fn test_patch_null_clears_description() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");
    let task = ctx
        .create_task("u1", json!({ "title": "a", "priority": "low", "description": "notes" }))
        .await;

    let uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());
    let (status, patched) = ctx
        .send(Method::PATCH, &uri, Some(&token), Some(json!({ "description": null })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(patched["description"].is_null());
}

#[tokio::test]
async fn test_delete_then_get_and_delete_again() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");
    let task = ctx.create_task("u1", json!({ "title": "a", "priority": "low" })).await;
    let uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_foreign_task_forbidden() {
    let ctx = TestContext::new();
    let task = ctx.create_task("u1", json!({ "title": "mine", "priority": "low" })).await;
    let intruder = ctx.token("u2");
    let id = task["id"].as_str().unwrap();

    let cases = [
        (Method::GET, format!("/v1/tasks/{id}"), None),
        (Method::PATCH, format!("/v1/tasks/{id}"), Some(json!({ "title": "theirs" }))),
        (Method::POST, format!("/v1/tasks/{id}/toggle"), None),
        (Method::DELETE, format!("/v1/tasks/{id}"), None),
    ];

    for (method, uri, body) in cases {
        let (status, json) = ctx.send(method, &uri, Some(&intruder), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(json["error"], "forbidden");
    }

    // Still intact for its owner
    let owner = ctx.token("u1");
    let (_, fetched) = ctx
        .send(Method::GET, &format!("/v1/tasks/{id}"), Some(&owner), None)
        .await;
    assert_eq!(fetched, task);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, _) = ctx
        .send(Method::GET, "/v1/tasks/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_task_toggle_not_found() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, _) = ctx
        .send(
            Method::POST,
            &format!("/v1/tasks/{}/toggle", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    ctx.create_task(
        "u1",
        json!({ "title": "late", "priority": "high", "due_date": START_MILLIS - 1 }),
    )
    .await;
    ctx.create_task("u1", json!({ "title": "later", "priority": "low" })).await;
    let done = ctx.create_task("u1", json!({ "title": "done", "priority": "high" })).await;
    ctx.send(
        Method::POST,
        &format!("/v1/tasks/{}/toggle", done["id"].as_str().unwrap()),
        Some(&token),
        None,
    )
    .await;

    let (status, stats) = ctx.send(Method::GET, "/v1/tasks/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "total": 3,
            "completed": 1,
            "pending": 2,
            "high_priority_open": 1,
            "overdue": 1,
            "completion_rate": 33
        })
    );
}

#[tokio::test]
async fn test_store_outage_is_503() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");
    ctx.store.set_available(false);

    let (status, body) = ctx.send(Method::GET, "/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");
}
