// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! End-to-end coverage of the HTTP surface, exercised via
//! `tower::ServiceExt::oneshot` against the axum `Router` directly — no
//! real TCP socket. Mirrors spec.md §8's literal scenarios and boundary
//! behaviors.

use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use reconcile_http::{AppState, build_router};
use reconcile_storage::schema;
use reconcile_transaction::TransactionCoordinator;
use rusqlite::Connection;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
	let conn = Connection::open_in_memory().unwrap();
	schema::init(&conn).unwrap();
	let coordinator = TransactionCoordinator::new(conn);
	build_router(AppState::new(coordinator))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
	let request = Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap();
	send(app, request).await
}

async fn put_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
	let request = Request::builder()
		.method("PUT")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap();
	send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
	let request = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
	send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = response.into_body().collect().await.unwrap().to_bytes();
	let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
	(status, body)
}

#[tokio::test]
async fn health_check_reports_ok() {
	let app = app();
	let (status, body) = get(&app, "/api/sync/health").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ok");
	assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn scenario_a_clean_create() {
	let app = app();
	let (status, body) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "o1", "action": "CREATE", "table": "todos",
			  "data": { "id": "t1", "title": "buy milk", "status": "pending" } }
		] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], true);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["operationId"], "o1");
	assert_eq!(results[0]["status"], "APPLIED");
	assert_eq!(results[0]["data"]["title"], "buy milk");
	assert_eq!(results[0]["data"]["version"], 1);
	assert_eq!(results[0]["data"]["deletedAt"], Value::Null);
	assert_eq!(body["data"]["summary"], json!({"total":1,"applied":1,"conflicts":0,"errors":0}));
}

#[tokio::test]
async fn scenario_b_version_conflict_on_update() {
	let app = app();
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "seed", "action": "CREATE", "table": "todos",
			  "data": { "id": "t1", "title": "buy milk" } }
		] }),
	)
	.await;
	// advance to version 2
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "seed2", "action": "UPDATE", "table": "todos",
			  "data": { "id": "t1", "version": 1, "title": "buy milk" } }
		] }),
	)
	.await;

	let (status, body) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "o2", "action": "UPDATE", "table": "todos",
			  "data": { "id": "t1", "version": 1, "title": "buy bread" } }
		] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["status"], "CONFLICT");
	assert_eq!(results[0]["conflictId"], "o2");

	let (status, conflict) = get(&app, "/api/conflicts/o2").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(conflict["serverVersion"], 2);
	assert_eq!(conflict["clientVersion"], 1);
	assert_eq!(conflict["status"], "PENDING");
	assert_eq!(conflict["serverData"]["title"], "buy milk");
	assert_eq!(conflict["clientData"]["title"], "buy bread");
}

#[tokio::test]
async fn scenario_c_resolve_with_client() {
	let app = app();
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed", "action": "CREATE", "table": "todos", "data": { "id": "t1", "title": "buy milk" } }] }),
	)
	.await;
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 1, "title": "buy milk" } }] }),
	)
	.await;
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "o2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 1, "title": "buy bread" } }] }),
	)
	.await;

	let (status, conflict) = put_json(&app, "/api/conflicts/o2/resolve", json!({ "resolution": "CLIENT" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(conflict["status"], "RESOLVED");
	assert_eq!(conflict["resolvedData"]["title"], "buy bread");
	assert!(!conflict["resolvedAt"].is_null());
}

#[tokio::test]
async fn scenario_d_replay() {
	let app = app();
	let batch = json!({ "operations": [
		{ "operationId": "o1", "action": "CREATE", "table": "todos", "data": { "id": "t1", "title": "buy milk", "status": "pending" } }
	] });
	post_json(&app, "/api/sync", batch.clone()).await;
	let (status, body) = post_json(&app, "/api/sync", batch).await;

	assert_eq!(status, StatusCode::OK);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["status"], "ERROR");
	assert_eq!(results[0]["message"], "Operation already processed");
}

#[tokio::test]
async fn scenario_e_tolerant_delete() {
	let app = app();
	let (status, body) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "o3", "action": "DELETE", "table": "notes", "data": { "id": "t99", "version": 1 } }] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["status"], "APPLIED");
	assert_eq!(results[0]["message"], "already deleted");
}

#[tokio::test]
async fn scenario_f_mixed_batch() {
	let app = app();
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed", "action": "CREATE", "table": "todos", "data": { "id": "stale", "title": "a" } }] }),
	)
	.await;

	let (status, body) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "o1", "action": "CREATE", "table": "todos", "data": { "id": "new-todo", "title": "fresh" } },
			{ "operationId": "o2", "action": "UPDATE", "table": "todos", "data": { "id": "stale", "version": 99, "title": "b" } },
			{ "operationId": "o3", "action": "DELETE", "table": "todos", "data": { "id": "unknown", "version": 1 } },
		] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["status"], "APPLIED");
	assert_eq!(results[1]["status"], "CONFLICT");
	assert_eq!(results[2]["status"], "APPLIED");
	assert_eq!(body["data"]["summary"], json!({"total":3,"applied":2,"conflicts":1,"errors":0}));
}

#[tokio::test]
async fn boundary_empty_batch_is_400() {
	let app = app();
	let (status, _) = post_json(&app, "/api/sync", json!({ "operations": [] })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn boundary_batch_of_101_is_400() {
	let app = app();
	let operations: Vec<Value> = (0..101)
		.map(|i| json!({ "operationId": format!("o{i}"), "action": "DELETE", "table": "notes", "data": { "id": "x", "version": 1 } }))
		.collect();
	let (status, _) = post_json(&app, "/api/sync", json!({ "operations": operations })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn boundary_duplicate_operation_id_in_batch_is_400() {
	let app = app();
	let (status, _) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "o1", "action": "DELETE", "table": "notes", "data": { "id": "x", "version": 1 } },
			{ "operationId": "o1", "action": "DELETE", "table": "notes", "data": { "id": "y", "version": 1 } },
		] }),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn boundary_two_ops_same_record_second_sees_new_version() {
	let app = app();
	let (status, body) = post_json(
		&app,
		"/api/sync",
		json!({ "operations": [
			{ "operationId": "o1", "action": "CREATE", "table": "todos", "data": { "id": "t1", "title": "buy milk" } },
			{ "operationId": "o2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 1, "title": "buy bread" } },
		] }),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	let results = &body["data"]["results"];
	assert_eq!(results[0]["status"], "APPLIED");
	assert_eq!(results[1]["status"], "APPLIED");
	assert_eq!(results[1]["data"]["version"], 2);
}

#[tokio::test]
async fn unknown_conflict_id_is_404() {
	let app = app();
	let (status, _) = get(&app, "/api/conflicts/missing").await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dismiss_on_non_pending_conflict_is_400() {
	let app = app();
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed", "action": "CREATE", "table": "todos", "data": { "id": "t1", "title": "buy milk" } }] }),
	)
	.await;
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 1, "title": "buy milk" } }] }),
	)
	.await;
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "o2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 1, "title": "buy bread" } }] }),
	)
	.await;

	put_json(&app, "/api/conflicts/o2/dismiss", json!({})).await;
	let (status, _) = put_json(&app, "/api/conflicts/o2/dismiss", json!({})).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn conflict_list_filters_by_status_and_kind() {
	let app = app();
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "seed", "action": "CREATE", "table": "todos", "data": { "id": "t1", "title": "buy milk" } }] }),
	)
	.await;
	post_json(
		&app,
		"/api/sync",
		json!({ "operations": [{ "operationId": "o2", "action": "UPDATE", "table": "todos", "data": { "id": "t1", "version": 99, "title": "buy bread" } }] }),
	)
	.await;

	let (status, body) = get(&app, "/api/conflicts?status=PENDING&kind=todos").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 1);

	let (status, body) = get(&app, "/api/conflicts?status=RESOLVED").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 0);

	let (status, stats) = get(&app, "/api/conflicts/stats").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(stats["pending"], 1);
}
