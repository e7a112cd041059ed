// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! End-to-end HTTP scenarios driving the router directly with
//! [`tower::ServiceExt::oneshot`], without binding a socket.

use std::sync::Arc;

use acs_core::config::AcsConfig;
use acs_engine::AcsEngine;
use acs_repository::InMemoryRepository;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> axum::Router {
    let engine = AcsEngine::new(AcsConfig::default(), Arc::new(InMemoryRepository::new())).await.unwrap();
    acs_api::router(acs_api::AppState::new(Arc::new(engine)))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-performed-by", "tester")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn creating_a_user_returns_the_entity_envelope() {
    let app = test_app().await;
    let (status, body) = send(&app, "POST", "/api/users", json!({"name": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["value"]["name"], "alice");
    assert_eq!(body["value"]["kind"], "User");
}

#[tokio::test]
async fn fetching_a_missing_entity_maps_not_found_to_404() {
    let app = test_app().await;
    let request = Request::builder().method("GET").uri("/api/users/999").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn membership_and_grant_flow_evaluates_inherited_access() {
    let app = test_app().await;
    let (_, group) = send(&app, "POST", "/api/groups", json!({"name": "engineering"})).await;
    let group_id = group["value"]["id"].as_i64().unwrap();
    let (_, user) = send(&app, "POST", "/api/users", json!({"name": "bob"})).await;
    let user_id = user["value"]["id"].as_i64().unwrap();
    let (status, _) = send(&app, "POST", &format!("/api/groups/{group_id}/members"), json!({"member_id": user_id})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, resource) = send(&app, "POST", "/api/resources", json!({"uri_pattern": "/documents/*", "resource_type": "document"})).await;
    let resource_id = resource["value"]["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/api/permissions",
        json!({"entity_id": group_id, "resource_id": resource_id, "verb": "GET", "scheme": "https", "effect": "grant"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let check_uri = format!("/api/check?entity_id={user_id}&uri=/documents/42&verb=GET&scheme=https");
    let request = Request::builder().method("GET").uri(check_uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["value"]["outcome"], "allowed");
}

#[tokio::test]
async fn role_members_can_be_added_and_removed() {
    let app = test_app().await;
    let (_, role) = send(&app, "POST", "/api/roles", json!({"name": "reviewer"})).await;
    let role_id = role["value"]["id"].as_i64().unwrap();
    let (_, user) = send(&app, "POST", "/api/users", json!({"name": "carol"})).await;
    let user_id = user["value"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", &format!("/api/roles/{role_id}/members"), json!({"member_id": user_id})).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/roles/{role_id}/members/{user_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_reports_a_status() {
    let app = test_app().await;
    let request = Request::builder().method("GET").uri("/api/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body.get("status").is_some());
}
