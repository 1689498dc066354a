// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use axum::{
	Json,
	extract::{Path, Query, State},
};
use chrono::Utc;
use reconcile_core::{BatchSummary, Conflict, ConflictFilter, ConflictStats, ConflictStatus, Error, Kind, OperationResult, RecordFields, ResolutionChoice};
use reconcile_storage::ConflictStore;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
	error::ApiError,
	state::AppState,
	validate::{SyncRequestBody, parse_batch},
};

#[derive(Serialize)]
pub struct HealthResponse {
	status: &'static str,
	timestamp: chrono::DateTime<Utc>,
}

#[instrument(level = "trace")]
pub async fn health() -> Json<HealthResponse> {
	Json(HealthResponse { status: "ok", timestamp: Utc::now() })
}

#[derive(Serialize)]
pub struct SyncResponseBody {
	success: bool,
	message: &'static str,
	data: SyncResponseData,
}

#[derive(Serialize)]
pub struct SyncResponseData {
	results: Vec<OperationResult>,
	summary: BatchSummary,
}

#[instrument(level = "debug", skip(state, body))]
pub async fn sync(State(state): State<AppState>, Json(body): Json<SyncRequestBody>) -> Result<Json<SyncResponseBody>, ApiError> {
	let operations = parse_batch(body)?;
	let (results, summary) = state.processor.process_batch(operations).await;
	Ok(Json(SyncResponseBody { success: true, message: "Sync completed", data: SyncResponseData { results, summary } }))
}

#[derive(Debug, Deserialize)]
pub struct ConflictQuery {
	status: Option<String>,
	kind: Option<String>,
}

#[instrument(level = "debug", skip(state))]
pub async fn list_conflicts(
	State(state): State<AppState>,
	Query(query): Query<ConflictQuery>,
) -> Result<Json<Vec<Conflict>>, ApiError> {
	let filter = parse_conflict_filter(query)?;
	let conflicts = state.coordinator.with_transaction(move |tx| ConflictStore::list(tx, &filter)).await?;
	Ok(Json(conflicts))
}

fn parse_conflict_filter(query: ConflictQuery) -> Result<ConflictFilter, ApiError> {
	let status = query.status.as_deref().map(parse_conflict_status).transpose()?;
	let kind = query
		.kind
		.as_deref()
		.map(|k| k.parse::<Kind>())
		.transpose()
		.map_err(ApiError::from)?;
	Ok(ConflictFilter { status, kind })
}

fn parse_conflict_status(raw: &str) -> Result<ConflictStatus, ApiError> {
	match raw {
		"PENDING" => Ok(ConflictStatus::Pending),
		"RESOLVED" => Ok(ConflictStatus::Resolved),
		"DISMISSED" => Ok(ConflictStatus::Dismissed),
		other => Err(ApiError::from(Error::ShapeViolation(format!("invalid status filter '{other}'")))),
	}
}

#[instrument(level = "debug", skip(state))]
pub async fn get_conflict(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Conflict>, ApiError> {
	let conflict = state
		.coordinator
		.with_transaction(move |tx| {
			ConflictStore::get(tx, &id)?.ok_or_else(|| Error::NotFound(format!("conflict '{id}' not found")))
		})
		.await?;
	Ok(Json(conflict))
}

#[instrument(level = "trace", skip(state))]
pub async fn conflict_stats(State(state): State<AppState>) -> Result<Json<ConflictStats>, ApiError> {
	let stats = state.coordinator.with_transaction(|tx| ConflictStore::stats(tx)).await?;
	Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequestBody {
	resolution: ResolutionChoice,
	#[serde(rename = "resolvedData", default)]
	resolved_data: Option<RecordFields>,
}

#[instrument(level = "debug", skip(state, body))]
pub async fn resolve_conflict(
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(body): Json<ResolveRequestBody>,
) -> Result<Json<Conflict>, ApiError> {
	let conflict = state.resolver.resolve(id, body.resolution, body.resolved_data).await?;
	Ok(Json(conflict))
}

#[instrument(level = "debug", skip(state))]
pub async fn dismiss_conflict(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Conflict>, ApiError> {
	let conflict = state.resolver.dismiss(id).await?;
	Ok(Json(conflict))
}
