// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};
use reconcile_core::{Action, Error, Kind, LedgerEntry, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::instrument;

/// Append-only log of completed `operation_id`s — the sole idempotency
/// authority (spec.md §4.2). Must be consulted before the side effect and
/// written in the same transaction as it, or I3 and idempotent retry
/// cannot both hold across a crash-restart (spec.md §4.2, §9).
pub struct IdempotencyLedger;

impl IdempotencyLedger {
	#[instrument(level = "trace", skip(conn))]
	pub fn seen(conn: &Connection, operation_id: &str) -> Result<bool> {
		let exists: Option<i64> = conn
			.query_row("SELECT 1 FROM processed_operations WHERE operation_id = ?1", params![operation_id], |row| {
				row.get(0)
			})
			.optional()?;
		Ok(exists.is_some())
	}

	/// Writes an entry. `operation_id` is unique — a second write for the
	/// same id is a programming error (the caller must have checked
	/// `seen` first within the same transaction) and surfaces as
	/// `Error::Internal`.
	#[instrument(level = "debug", skip(conn))]
	pub fn record(conn: &Connection, operation_id: &str, action: Action, kind: Kind, now: DateTime<Utc>) -> Result<()> {
		let action_str = match action {
			Action::Create => "CREATE",
			Action::Update => "UPDATE",
			Action::Delete => "DELETE",
		};

		conn.execute(
			"INSERT INTO processed_operations (operation_id, action, kind, processed_at) VALUES (?1, ?2, ?3, ?4)",
			params![operation_id, action_str, kind.as_str(), now.to_rfc3339()],
		)
		.map_err(|err| match err {
			rusqlite::Error::SqliteFailure(ref sqlite_err, _)
				if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation =>
			{
				Error::Internal(format!("operation {operation_id} already recorded in ledger"))
			}
			other => other.into(),
		})?;
		Ok(())
	}

	/// Fetches the ledger entry for `operation_id`, if any has been
	/// recorded. Not on the sync hot path (`seen` is cheaper and is what
	/// gates the per-operation algorithm) — this is for callers that need
	/// the full entry, e.g. diagnosing which action/kind a replayed
	/// `operationId` was originally recorded against.
	#[instrument(level = "trace", skip(conn))]
	pub fn get(conn: &Connection, operation_id: &str) -> Result<Option<LedgerEntry>> {
		conn.query_row(
			"SELECT operation_id, action, kind, processed_at FROM processed_operations WHERE operation_id = ?1",
			params![operation_id],
			row_to_entry,
		)
		.optional()
		.map_err(Into::into)
	}
}

fn row_to_entry(row: &Row) -> rusqlite::Result<LedgerEntry> {
	let action: String = row.get(1)?;
	let kind: String = row.get(2)?;
	let processed_at: String = row.get(3)?;

	Ok(LedgerEntry {
		operation_id: row.get(0)?,
		action: match action.as_str() {
			"CREATE" => Action::Create,
			"UPDATE" => Action::Update,
			_ => Action::Delete,
		},
		kind: kind.parse().map_err(|_| {
			rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, format!("invalid kind '{kind}'").into())
		})?,
		processed_at: DateTime::parse_from_rfc3339(&processed_at)
			.map(|dt| dt.with_timezone(&Utc))
			.map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?,
	})
}
