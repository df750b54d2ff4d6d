/// Integration tests for the profile endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, START_MILLIS};

#[tokio::test]
async fn test_me_is_404_before_sync() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (status, body) = ctx.send(Method::GET, "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_sync_creates_then_refreshes() {
    let ctx = TestContext::new();

    let first = ctx.token_with_profile("u1", "a@x.com", "Ada");
    let (status, created) = ctx.send(Method::PUT, "/v1/users/me", Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["user_id"], "u1");
    assert_eq!(created["email"], "a@x.com");
    assert_eq!(created["name"], "Ada");
    assert_eq!(created["avatar"], "https://img.example.com/avatar.png");
    assert_eq!(created["created_at"], START_MILLIS);
    assert_eq!(created["last_seen"], START_MILLIS);

    ctx.clock.advance(60_000);
    let second = ctx.token_with_profile("u1", "b@x.com", "Ada");
    let (status, refreshed) = ctx.send(Method::PUT, "/v1/users/me", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["email"], "b@x.com");
    assert_eq!(refreshed["created_at"], START_MILLIS);
    assert_eq!(refreshed["last_seen"], START_MILLIS + 60_000);

    assert_eq!(ctx.store.user_count().await, 1);

    let (_, me) = ctx.send(Method::GET, "/v1/users/me", Some(&second), None).await;
    assert_eq!(me, refreshed);
}

#[tokio::test]
async fn test_sync_keeps_name_when_claim_missing() {
    let ctx = TestContext::new();

    let with_name = ctx.token_with_profile("u1", "u1@example.com", "Ada");
    ctx.send(Method::PUT, "/v1/users/me", Some(&with_name), None).await;

    // Plain token has no name or picture claims
    let plain = ctx.token("u1");
    let (_, user) = ctx.send(Method::PUT, "/v1/users/me", Some(&plain), None).await;
    assert_eq!(user["name"], "Ada");
}

#[tokio::test]
async fn test_touch_last_seen() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    // Unknown user: silently nothing
    let (status, _) = ctx.send(Method::POST, "/v1/users/me/seen", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(ctx.store.user_count().await, 0);

    ctx.send(Method::PUT, "/v1/users/me", Some(&token), None).await;
    ctx.clock.advance(1_000);

    let (status, _) = ctx.send(Method::POST, "/v1/users/me/seen", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, me) = ctx.send(Method::GET, "/v1/users/me", Some(&token), None).await;
    assert_eq!(me["last_seen"], START_MILLIS + 1_000);
}

#[tokio::test]
async fn test_concurrent_first_sync_yields_one_row() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let requests = (0..8).map(|_| ctx.send(Method::PUT, "/v1/users/me", Some(&token), None));
    for (status, _) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test]
async fn test_padded_identity_round_trips() {
    let ctx = TestContext::new();
    let token = ctx.token_with_profile(" u1", "a@x.com", "Ada");

    let (status, synced) = ctx.send(Method::PUT, "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(synced["user_id"], " u1");

    let (status, me) = ctx.send(Method::GET, "/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, synced);
}

#[tokio::test]
async fn test_repeat_sync_on_frozen_clock_advances_last_seen() {
    let ctx = TestContext::new();
    let token = ctx.token("u1");

    let (_, first) = ctx.send(Method::PUT, "/v1/users/me", Some(&token), None).await;
    let (_, second) = ctx.send(Method::PUT, "/v1/users/me", Some(&token), None).await;

    assert_eq!(first["last_seen"], START_MILLIS);
    assert_eq!(second["last_seen"], START_MILLIS + 1);
}
