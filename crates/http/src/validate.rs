// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use std::collections::HashSet;

use reconcile_core::{Error, Kind, Operation, OperationPayload, RecordFields, Result, Status};
use serde::Deserialize;
use serde_json::{Map, Value};

const MAX_BATCH_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;

// Every field here is optional-with-default so a malformed request always
// decodes successfully at the axum `Json<T>` extractor layer and is instead
// rejected by `parse_batch` below as a `ShapeViolation` — keeping the single
// 400-style failure path spec.md §4.7 describes, rather than splitting
// "malformed JSON shape" across axum's own deserialize-rejection status code
// and ours.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequestBody {
	#[serde(default)]
	pub operations: Vec<RawOperation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawOperation {
	#[serde(rename = "operationId", default)]
	pub operation_id: String,
	#[serde(default)]
	pub action: String,
	#[serde(default)]
	pub table: String,
	#[serde(default)]
	pub data: Value,
}

/// Decodes and validates a batch request against spec.md §4.7's shape
/// constraints. On any violation, returns a single `ShapeViolation` — the
/// batch never partially reaches the sync processor.
pub fn parse_batch(body: SyncRequestBody) -> Result<Vec<Operation>> {
	let operations = body.operations;
	if operations.is_empty() || operations.len() > MAX_BATCH_LEN {
		return Err(Error::ShapeViolation(format!(
			"operations length must be in [1, {MAX_BATCH_LEN}], got {}",
			operations.len()
		)));
	}

	let mut seen_ids = HashSet::with_capacity(operations.len());
	for raw in &operations {
		if !seen_ids.insert(raw.operation_id.as_str()) {
			return Err(Error::ShapeViolation(format!("duplicate operationId '{}' in batch", raw.operation_id)));
		}
	}

	operations.into_iter().map(parse_operation).collect()
}

fn parse_operation(raw: RawOperation) -> Result<Operation> {
	let kind: Kind = raw.table.parse()?;
	let data = raw
		.data
		.as_object()
		.ok_or_else(|| Error::ShapeViolation(format!("operation '{}' is missing a data object", raw.operation_id)))?;

	let payload = match raw.action.as_str() {
		"CREATE" => parse_create(kind, &raw.operation_id, data)?,
		"UPDATE" => parse_update(&raw.operation_id, data)?,
		"DELETE" => parse_delete(&raw.operation_id, data)?,
		other => {
			return Err(Error::ShapeViolation(format!("operation '{}' has unknown action '{other}'", raw.operation_id)));
		}
	};

	Ok(Operation { operation_id: raw.operation_id, kind, payload })
}

fn parse_create(kind: Kind, operation_id: &str, data: &Map<String, Value>) -> Result<OperationPayload> {
	let id = required_string(data, "id", operation_id)?;
	let title = required_string(data, "title", operation_id)?;
	if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
		return Err(Error::ShapeViolation(format!(
			"operation '{operation_id}': title must be non-empty and at most {MAX_TITLE_LEN} characters"
		)));
	}

	let content = optional_string(data, "content");
	let status = parse_status(kind, operation_id, data)?;

	Ok(OperationPayload::Create { id, fields: RecordFields { title: Some(title), content, status } })
}

fn parse_update(operation_id: &str, data: &Map<String, Value>) -> Result<OperationPayload> {
	let id = required_string(data, "id", operation_id)?;
	let version = required_positive_version(data, operation_id)?;
	let title = optional_string(data, "title");
	let content = optional_string(data, "content");
	// UPDATE may target either kind; a status value present without knowing
	// the kind would need cross-checking the target isn't Notes, but the
	// record store's own kind-aware update already drops `status` for Notes.
	let status = match data.get("status") {
		None => None,
		Some(Value::String(s)) => Some(
			Status::from_str(s)
				.ok_or_else(|| Error::ShapeViolation(format!("operation '{operation_id}': invalid status '{s}'")))?,
		),
		Some(_) => return Err(Error::ShapeViolation(format!("operation '{operation_id}': status must be a string"))),
	};

	Ok(OperationPayload::Update { id, version, fields: RecordFields { title, content, status } })
}

fn parse_delete(operation_id: &str, data: &Map<String, Value>) -> Result<OperationPayload> {
	let id = required_string(data, "id", operation_id)?;
	let version = required_positive_version(data, operation_id)?;
	Ok(OperationPayload::Delete { id, version })
}

fn parse_status(kind: Kind, operation_id: &str, data: &Map<String, Value>) -> Result<Option<Status>> {
	if !kind.has_status() {
		return Ok(None);
	}
	match data.get("status") {
		None => Ok(None),
		Some(Value::String(s)) => Status::from_str(s)
			.map(Some)
			.ok_or_else(|| Error::ShapeViolation(format!("operation '{operation_id}': invalid status '{s}'"))),
		Some(_) => Err(Error::ShapeViolation(format!("operation '{operation_id}': status must be a string"))),
	}
}

fn required_string(data: &Map<String, Value>, field: &str, operation_id: &str) -> Result<String> {
	match data.get(field) {
		Some(Value::String(s)) => Ok(s.clone()),
		_ => Err(Error::ShapeViolation(format!("operation '{operation_id}': missing or non-string '{field}'"))),
	}
}

fn optional_string(data: &Map<String, Value>, field: &str) -> Option<String> {
	match data.get(field) {
		Some(Value::String(s)) => Some(s.clone()),
		_ => None,
	}
}

fn required_positive_version(data: &Map<String, Value>, operation_id: &str) -> Result<u64> {
	match data.get("version").and_then(Value::as_u64) {
		Some(version) if version > 0 => Ok(version),
		_ => Err(Error::ShapeViolation(format!("operation '{operation_id}': version must be a positive integer"))),
	}
}
