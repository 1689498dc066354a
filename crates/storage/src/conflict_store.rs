// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};
use reconcile_core::{Conflict, ConflictFilter, ConflictStats, ConflictStatus, Error, Kind, RecordFields, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::instrument;

/// Persists conflict records: server snapshot + client payload + both
/// versions + lifecycle state (spec.md §3, §4.3). `id == operation_id`
/// enforces at-most-one conflict per operation (invariant P3).
pub struct ConflictStore;

impl ConflictStore {
	#[instrument(level = "debug", skip(conn, conflict))]
	pub fn create(conn: &Connection, conflict: Conflict) -> Result<Conflict> {
		let server_data = conflict.server_data.as_ref().map(serde_json::to_string).transpose()?;
		let client_data = serde_json::to_string(&conflict.client_data)?;

		conn.execute(
			"INSERT INTO conflicts (id, kind, record_id, server_data, client_data, server_version, client_version, status, created_at, resolved_at, resolved_data)
			 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, NULL)",
			params![
				conflict.id,
				conflict.kind.as_str(),
				conflict.record_id,
				server_data,
				client_data,
				conflict.server_version as i64,
				conflict.client_version as i64,
				status_str(conflict.status),
				conflict.created_at.to_rfc3339(),
			],
		)?;

		Ok(conflict)
	}

	#[instrument(level = "trace", skip(conn))]
	pub fn get(conn: &Connection, id: &str) -> Result<Option<Conflict>> {
		conn.query_row("SELECT * FROM conflicts WHERE id = ?1", params![id], row_to_conflict)
			.optional()
			.map_err(Into::into)
	}

	/// Ordered by `created_at` descending (spec.md §4.3).
	#[instrument(level = "trace", skip(conn))]
	pub fn list(conn: &Connection, filter: &ConflictFilter) -> Result<Vec<Conflict>> {
		let mut sql = String::from("SELECT * FROM conflicts WHERE 1 = 1");
		if filter.status.is_some() {
			sql.push_str(" AND status = ?1");
		}
		if filter.kind.is_some() {
			sql.push_str(if filter.status.is_some() { " AND kind = ?2" } else { " AND kind = ?1" });
		}
		sql.push_str(" ORDER BY created_at DESC");

		let mut stmt = conn.prepare(&sql)?;
		let rows = match (filter.status, filter.kind) {
			(Some(status), Some(kind)) => {
				stmt.query_map(params![status_str(status), kind.as_str()], row_to_conflict)?
			}
			(Some(status), None) => stmt.query_map(params![status_str(status)], row_to_conflict)?,
			(None, Some(kind)) => stmt.query_map(params![kind.as_str()], row_to_conflict)?,
			(None, None) => stmt.query_map([], row_to_conflict)?,
		};

		rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
	}

	/// Allowed only from `PENDING` (spec.md §4.3).
	#[instrument(level = "debug", skip(conn, resolved_data))]
	pub fn transition_to_resolved(
		conn: &Connection,
		id: &str,
		resolved_data: &RecordFields,
		now: DateTime<Utc>,
	) -> Result<Conflict> {
		let conflict = Self::require_pending(conn, id)?;
		let resolved_json = serde_json::to_string(resolved_data)?;

		conn.execute(
			"UPDATE conflicts SET status = ?1, resolved_at = ?2, resolved_data = ?3 WHERE id = ?4",
			params![status_str(ConflictStatus::Resolved), now.to_rfc3339(), resolved_json, id],
		)?;

		Ok(Conflict {
			status: ConflictStatus::Resolved,
			resolved_at: Some(now),
			resolved_data: Some(resolved_data.clone()),
			..conflict
		})
	}

	/// Allowed only from `PENDING` (spec.md §4.3).
	#[instrument(level = "debug", skip(conn))]
	pub fn transition_to_dismissed(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<Conflict> {
		let conflict = Self::require_pending(conn, id)?;

		conn.execute(
			"UPDATE conflicts SET status = ?1, resolved_at = ?2 WHERE id = ?3",
			params![status_str(ConflictStatus::Dismissed), now.to_rfc3339(), id],
		)?;

		Ok(Conflict { status: ConflictStatus::Dismissed, resolved_at: Some(now), ..conflict })
	}

	fn require_pending(conn: &Connection, id: &str) -> Result<Conflict> {
		let conflict = Self::get(conn, id)?.ok_or_else(|| Error::NotFound(format!("conflict '{id}' not found")))?;
		if conflict.status != ConflictStatus::Pending {
			return Err(Error::IllegalStateTransition(format!(
				"conflict '{id}' is {:?}, not PENDING",
				conflict.status
			)));
		}
		Ok(conflict)
	}

	#[instrument(level = "trace", skip(conn))]
	pub fn stats(conn: &Connection) -> Result<ConflictStats> {
		let mut stats = ConflictStats::default();

		let mut status_stmt = conn.prepare("SELECT status, COUNT(*) FROM conflicts GROUP BY status")?;
		let status_rows = status_stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
		for row in status_rows {
			let (status, count) = row?;
			match status.as_str() {
				"PENDING" => stats.pending = count as u64,
				"RESOLVED" => stats.resolved = count as u64,
				"DISMISSED" => stats.dismissed = count as u64,
				_ => {}
			}
		}

		let mut kind_stmt = conn.prepare("SELECT kind, COUNT(*) FROM conflicts GROUP BY kind")?;
		let kind_rows = kind_stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
		for row in kind_rows {
			let (kind, count) = row?;
			if let Ok(kind) = kind.parse::<Kind>() {
				stats.by_kind.push((kind, count as u64));
			}
		}

		Ok(stats)
	}
}

fn status_str(status: ConflictStatus) -> &'static str {
	match status {
		ConflictStatus::Pending => "PENDING",
		ConflictStatus::Resolved => "RESOLVED",
		ConflictStatus::Dismissed => "DISMISSED",
	}
}

fn row_to_conflict(row: &Row) -> rusqlite::Result<Conflict> {
	let kind: String = row.get("kind")?;
	let status: String = row.get("status")?;
	let server_data: Option<String> = row.get("server_data")?;
	let resolved_data: Option<String> = row.get("resolved_data")?;
	let resolved_at: Option<String> = row.get("resolved_at")?;
	let client_data: String = row.get("client_data")?;
	let created_at: String = row.get("created_at")?;

	Ok(Conflict {
		id: row.get("id")?,
		kind: kind.parse().map_err(|_| {
			rusqlite::Error::FromSqlConversionFailure(
				0,
				rusqlite::types::Type::Text,
				format!("invalid kind '{kind}'").into(),
			)
		})?,
		record_id: row.get("record_id")?,
		server_data: server_data.map(|s| serde_json::from_str(&s)).transpose().map_err(json_err)?,
		client_data: serde_json::from_str(&client_data).map_err(json_err)?,
		server_version: row.get::<_, i64>("server_version")? as u64,
		client_version: row.get::<_, i64>("client_version")? as u64,
		status: match status.as_str() {
			"PENDING" => ConflictStatus::Pending,
			"RESOLVED" => ConflictStatus::Resolved,
			_ => ConflictStatus::Dismissed,
		},
		created_at: parse_rfc3339(&created_at)?,
		resolved_at: resolved_at.map(|s| parse_rfc3339(&s)).transpose()?,
		resolved_data: resolved_data.map(|s| serde_json::from_str(&s)).transpose().map_err(json_err)?,
	})
}

fn json_err(err: serde_json::Error) -> rusqlite::Error {
	rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_rfc3339(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}
