// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use reconcile_core::Result;
use rusqlite::Connection;

/// Creates the three logical tables from spec.md §6 if they do not already
/// exist, plus the indexes required for correctness/performance. Safe to
/// call on every process start (the "verify schema" step of §9's
/// singleton/global-state note) since every statement is idempotent.
pub fn init(conn: &Connection) -> Result<()> {
	conn.execute_batch(
		"
		CREATE TABLE IF NOT EXISTS records_todos (
			id TEXT PRIMARY KEY,
			title TEXT NOT NULL,
			content TEXT,
			status TEXT NOT NULL,
			version INTEGER NOT NULL,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			deleted_at TEXT
		);
		CREATE INDEX IF NOT EXISTS idx_records_todos_deleted_at ON records_todos (deleted_at);

		CREATE TABLE IF NOT EXISTS records_notes (
			id TEXT PRIMARY KEY,
			title TEXT NOT NULL,
			content TEXT,
			version INTEGER NOT NULL,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			deleted_at TEXT
		);
		CREATE INDEX IF NOT EXISTS idx_records_notes_deleted_at ON records_notes (deleted_at);

		CREATE TABLE IF NOT EXISTS conflicts (
			id TEXT PRIMARY KEY,
			kind TEXT NOT NULL,
			record_id TEXT NOT NULL,
			server_data TEXT,
			client_data TEXT NOT NULL,
			server_version INTEGER NOT NULL,
			client_version INTEGER NOT NULL,
			status TEXT NOT NULL,
			created_at TEXT NOT NULL,
			resolved_at TEXT,
			resolved_data TEXT
		);
		CREATE INDEX IF NOT EXISTS idx_conflicts_status ON conflicts (status);
		CREATE INDEX IF NOT EXISTS idx_conflicts_kind_record ON conflicts (kind, record_id);

		CREATE TABLE IF NOT EXISTS processed_operations (
			operation_id TEXT PRIMARY KEY,
			action TEXT NOT NULL,
			kind TEXT NOT NULL,
			processed_at TEXT NOT NULL
		);
		",
	)?;
	Ok(())
}
