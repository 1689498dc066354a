// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::Utc;
use reconcile_core::{
	Action, BatchSummary, Conflict, ConflictStatus, Kind, Operation, OperationPayload, OperationResult, RecordFields,
	Result,
};
use reconcile_storage::{ConflictStore, IdempotencyLedger, InsertOutcome, RecordStore, UpdateOutcome};
use reconcile_transaction::TransactionCoordinator;
use tracing::{debug, info, instrument};

/// Consumes a batch of operations and produces a same-length, same-order
/// result vector plus a summary (spec.md §4.4.1). Operations within a batch
/// are applied sequentially, each inside its own transaction — the batch
/// itself has no atomic envelope.
#[derive(Clone)]
pub struct SyncProcessor {
	coordinator: TransactionCoordinator,
}

impl SyncProcessor {
	pub fn new(coordinator: TransactionCoordinator) -> Self {
		Self { coordinator }
	}

	#[instrument(level = "info", skip(self, operations), fields(batch_len = operations.len()))]
	pub async fn process_batch(&self, operations: Vec<Operation>) -> (Vec<OperationResult>, BatchSummary) {
		let mut results = Vec::with_capacity(operations.len());
		for operation in operations {
			results.push(self.process_one(operation).await);
		}
		let summary = BatchSummary::from_results(&results);
		info!(total = summary.total, applied = summary.applied, conflicts = summary.conflicts, errors = summary.errors, "batch processed");
		(results, summary)
	}

	#[instrument(level = "debug", skip(self, operation), fields(operation_id = %operation.operation_id))]
	async fn process_one(&self, operation: Operation) -> OperationResult {
		let operation_id = operation.operation_id.clone();
		let result = self
			.coordinator
			.with_transaction(move |tx| apply(tx, operation))
			.await;

		let result = match result {
			Ok(result) => result,
			Err(err) => OperationResult::error(operation_id.clone(), err.to_string()),
		};
		debug!(operation_id = %result.operation_id, status = ?result.status, "operation result");
		result
	}
}

/// The per-operation algorithm of spec.md §4.4.2, run inside one already-open
/// transaction. Every path returns `Ok` — a conflict or a tolerant outcome is
/// not an `Err`; only an unexpected storage failure propagates as `Err`,
/// which the caller turns into an `{ERROR, message}` result and rolls back.
fn apply(tx: &rusqlite::Transaction<'_>, operation: Operation) -> Result<OperationResult> {
	let Operation { operation_id, kind, payload } = operation;
	let now = Utc::now();

	if IdempotencyLedger::seen(tx, &operation_id)? {
		return Ok(OperationResult::error(operation_id, "Operation already processed"));
	}

	match payload {
		OperationPayload::Create { id, fields } => apply_create(tx, &operation_id, kind, &id, fields, now),
		OperationPayload::Update { id, version, fields } => {
			apply_update(tx, &operation_id, kind, &id, version, fields, now)
		}
		OperationPayload::Delete { id, version } => apply_delete(tx, &operation_id, kind, &id, version, now),
	}
}

fn apply_create(
	tx: &rusqlite::Transaction<'_>,
	operation_id: &str,
	kind: Kind,
	id: &str,
	fields: RecordFields,
	now: chrono::DateTime<Utc>,
) -> Result<OperationResult> {
	match RecordStore::insert(tx, kind, id, fields, now)? {
		InsertOutcome::Inserted(record) => {
			IdempotencyLedger::record(tx, operation_id, Action::Create, kind, now)?;
			Ok(OperationResult::applied(operation_id, record))
		}
		InsertOutcome::Duplicate => Ok(OperationResult::error(operation_id, "duplicate id")),
	}
}

fn apply_update(
	tx: &rusqlite::Transaction<'_>,
	operation_id: &str,
	kind: Kind,
	id: &str,
	client_version: u64,
	fields: RecordFields,
	now: chrono::DateTime<Utc>,
) -> Result<OperationResult> {
	let current = RecordStore::get(tx, kind, id)?;

	let server_version = match &current {
		None => 0,
		Some(record) => record.version,
	};
	// Updating a tombstone is a conflict, not a resurrection, even on the
	// rare occasion a stale client version numerically matches the
	// tombstone's current version (spec.md §4.4.2) — so this is checked
	// unconditionally, not folded into the version comparison below.
	let is_tombstone = current.as_ref().is_some_and(|record| record.is_tombstone());

	if server_version != client_version || is_tombstone {
		let conflict = ConflictStore::create(
			tx,
			Conflict {
				id: operation_id.to_string(),
				kind,
				record_id: id.to_string(),
				server_data: current.as_ref().map(record_fields),
				client_data: fields,
				server_version,
				client_version,
				status: ConflictStatus::Pending,
				created_at: now,
				resolved_at: None,
				resolved_data: None,
			},
		)?;
		return Ok(OperationResult::conflict(operation_id, conflict.id));
	}

	match RecordStore::update_if_version(tx, kind, id, client_version, fields, now)? {
		UpdateOutcome::Updated(record) => {
			IdempotencyLedger::record(tx, operation_id, Action::Update, kind, now)?;
			Ok(OperationResult::applied(operation_id, record))
		}
		// The version check above just matched; losing the race here means the
		// coordinator failed to serialize two transactions against the same
		// record, which should not happen (spec.md §4.4.2, §9).
		UpdateOutcome::VersionMismatch | UpdateOutcome::Absent => {
			Ok(OperationResult::error(operation_id, "race"))
		}
	}
}

fn apply_delete(
	tx: &rusqlite::Transaction<'_>,
	operation_id: &str,
	kind: Kind,
	id: &str,
	client_version: u64,
	now: chrono::DateTime<Utc>,
) -> Result<OperationResult> {
	let current = RecordStore::get(tx, kind, id)?;

	let Some(current) = current else {
		IdempotencyLedger::record(tx, operation_id, Action::Delete, kind, now)?;
		return Ok(OperationResult::applied_with_message(operation_id, "already deleted"));
	};

	if current.is_tombstone() {
		IdempotencyLedger::record(tx, operation_id, Action::Delete, kind, now)?;
		return Ok(OperationResult::applied_with_message(operation_id, "already deleted"));
	}

	if current.version != client_version {
		let conflict = ConflictStore::create(
			tx,
			Conflict {
				id: operation_id.to_string(),
				kind,
				record_id: id.to_string(),
				server_data: Some(record_fields(&current)),
				client_data: RecordFields::default(),
				server_version: current.version,
				client_version,
				status: ConflictStatus::Pending,
				created_at: now,
				resolved_at: None,
				resolved_data: None,
			},
		)?;
		return Ok(OperationResult::conflict(operation_id, conflict.id));
	}

	match RecordStore::soft_delete_if_version(tx, kind, id, client_version, now)? {
		UpdateOutcome::Updated(record) => {
			IdempotencyLedger::record(tx, operation_id, Action::Delete, kind, now)?;
			Ok(OperationResult::applied(operation_id, record))
		}
		UpdateOutcome::VersionMismatch | UpdateOutcome::Absent => {
			Ok(OperationResult::error(operation_id, "race"))
		}
	}
}

fn record_fields(record: &reconcile_core::Record) -> RecordFields {
	RecordFields { title: Some(record.title.clone()), content: record.content.clone(), status: record.status }
}
