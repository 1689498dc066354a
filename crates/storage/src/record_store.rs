// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};
use reconcile_core::{Kind, Record, RecordFields, Result, Status};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::instrument;

/// Outcome of `RecordStore::insert` (spec.md §4.1, invariant I3).
#[derive(Debug)]
pub enum InsertOutcome {
	Inserted(Record),
	Duplicate,
}

/// Outcome of `RecordStore::update_if_version` /
/// `RecordStore::soft_delete_if_version` (spec.md §4.1).
#[derive(Debug)]
pub enum UpdateOutcome {
	Updated(Record),
	VersionMismatch,
	Absent,
}

/// Keyed, versioned storage for todos and notes. One SQL table per kind
/// (`records_todos`, `records_notes`) per the table-per-kind design note in
/// spec.md §9 — `Kind` is a parameter passed to every method, not a trait
/// object.
pub struct RecordStore;

impl RecordStore {
	/// Returns the current record, including tombstones — used by the
	/// sync processor for conflict detection (invariant I2).
	#[instrument(level = "trace", skip(conn))]
	pub fn get(conn: &Connection, kind: Kind, id: &str) -> Result<Option<Record>> {
		let sql = format!("SELECT {} FROM {} WHERE id = ?1", select_columns(kind), kind.table_name());
		conn.query_row(&sql, params![id], |row| row_to_record(row, kind)).optional().map_err(Into::into)
	}

	/// Returns the current record, excluding tombstones — used by the
	/// query-side CRUD routes (external to this system, but the method
	/// lives here because it shares the same table).
	#[instrument(level = "trace", skip(conn))]
	pub fn get_live(conn: &Connection, kind: Kind, id: &str) -> Result<Option<Record>> {
		Ok(Self::get(conn, kind, id)?.filter(|record| !record.is_tombstone()))
	}

	/// Inserts a brand new record at `version = 1`. Rejects a second
	/// insert at the same `(kind, id)` with `Duplicate` (invariant I3);
	/// the caller (sync processor) is responsible for having already
	/// filtered idempotent replays via the ledger before calling this.
	#[instrument(level = "debug", skip(conn, fields))]
	pub fn insert(
		conn: &Connection,
		kind: Kind,
		id: &str,
		fields: RecordFields,
		now: DateTime<Utc>,
	) -> Result<InsertOutcome> {
		if Self::get(conn, kind, id)?.is_some() {
			return Ok(InsertOutcome::Duplicate);
		}

		let title = fields.title.unwrap_or_default();
		let content = fields.content;
		let now_str = now.to_rfc3339();

		if kind.has_status() {
			let status = fields.status.unwrap_or(Status::Pending);
			conn.execute(
				"INSERT INTO records_todos (id, title, content, status, version, created_at, updated_at, deleted_at)
				 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5, NULL)",
				params![id, title, content, status.as_str(), now_str],
			)?;
		} else {
			conn.execute(
				"INSERT INTO records_notes (id, title, content, version, created_at, updated_at, deleted_at)
				 VALUES (?1, ?2, ?3, 1, ?4, ?4, NULL)",
				params![id, title, content, now_str],
			)?;
		}

		Ok(InsertOutcome::Inserted(Record {
			id: id.to_string(),
			title,
			content,
			status: if kind.has_status() { Some(fields.status.unwrap_or(Status::Pending)) } else { None },
			version: 1,
			created_at: now,
			updated_at: now,
			deleted_at: None,
		}))
	}

	/// Atomic compare-and-set on `version`. Never matches a tombstone —
	/// `deleted_at != NULL` is treated as ineligible, so an update against
	/// a tombstoned id falls through to `Absent` only when the id never
	/// existed at all; a tombstoned id with a matching version still
	/// fails the `deleted_at IS NULL` guard and reports `VersionMismatch`,
	/// which the sync processor distinguishes from `Absent` by having
	/// already read the record via `get` before calling this.
	#[instrument(level = "debug", skip(conn, fields))]
	pub fn update_if_version(
		conn: &Connection,
		kind: Kind,
		id: &str,
		expected_version: u64,
		fields: RecordFields,
		now: DateTime<Utc>,
	) -> Result<UpdateOutcome> {
		let Some(current) = Self::get(conn, kind, id)? else {
			return Ok(UpdateOutcome::Absent);
		};

		let title = fields.title.unwrap_or(current.title.clone());
		let content = fields.content.or(current.content.clone());
		let now_str = now.to_rfc3339();

		let rows = if kind.has_status() {
			let status = fields.status.or(current.status).unwrap_or(Status::Pending);
			conn.execute(
				"UPDATE records_todos SET title = ?1, content = ?2, status = ?3, version = version + 1, updated_at = ?4
				 WHERE id = ?5 AND version = ?6 AND deleted_at IS NULL",
				params![title, content, status.as_str(), now_str, id, expected_version as i64],
			)?
		} else {
			conn.execute(
				"UPDATE records_notes SET title = ?1, content = ?2, version = version + 1, updated_at = ?3
				 WHERE id = ?4 AND version = ?5 AND deleted_at IS NULL",
				params![title, content, now_str, id, expected_version as i64],
			)?
		};

		if rows == 0 {
			return Ok(UpdateOutcome::VersionMismatch);
		}

		Ok(UpdateOutcome::Updated(Self::get(conn, kind, id)?.expect("just updated")))
	}

	/// Same compare-and-set discipline as `update_if_version`, but sets
	/// `deleted_at = now` instead of touching the mutable fields.
	#[instrument(level = "debug", skip(conn))]
	pub fn soft_delete_if_version(
		conn: &Connection,
		kind: Kind,
		id: &str,
		expected_version: u64,
		now: DateTime<Utc>,
	) -> Result<UpdateOutcome> {
		if Self::get(conn, kind, id)?.is_none() {
			return Ok(UpdateOutcome::Absent);
		}

		let now_str = now.to_rfc3339();
		let rows = conn.execute(
			&format!(
				"UPDATE {} SET version = version + 1, updated_at = ?1, deleted_at = ?1
				 WHERE id = ?2 AND version = ?3 AND deleted_at IS NULL",
				kind.table_name()
			),
			params![now_str, id, expected_version as i64],
		)?;

		if rows == 0 {
			return Ok(UpdateOutcome::VersionMismatch);
		}

		Ok(UpdateOutcome::Updated(Self::get(conn, kind, id)?.expect("just deleted")))
	}

	/// Unconditional write that increments version regardless of the
	/// record's current version. Used only by the conflict resolver
	/// (spec.md §4.5) to supersede both sides of a conflict.
	///
	/// If no record exists yet — an `UPDATE` conflict against an id that
	/// never existed, resolved as CLIENT/CUSTOM — the "previous version"
	/// is treated as 0, so the record comes into existence at version 1;
	/// this is the only place outside `insert` that can bring a record
	/// into existence, and it is reached only via an operator-driven
	/// resolution, never from the sync processor directly.
	#[instrument(level = "debug", skip(conn, fields))]
	pub fn force_update(conn: &Connection, kind: Kind, id: &str, fields: RecordFields, now: DateTime<Utc>) -> Result<Record> {
		let current = Self::get(conn, kind, id)?;
		if current.is_none() {
			return match Self::insert(conn, kind, id, fields, now)? {
				InsertOutcome::Inserted(record) => Ok(record),
				InsertOutcome::Duplicate => {
					// lost a race under the coordinator's serialization guarantee; re-read and
					// fall through to the unconditional UPDATE path below.
					Self::force_update(conn, kind, id, fields, now)
				}
			};
		}

		let title = fields.title.or_else(|| current.as_ref().map(|r| r.title.clone())).unwrap_or_default();
		let content = fields.content.or_else(|| current.as_ref().and_then(|r| r.content.clone()));
		let now_str = now.to_rfc3339();

		if kind.has_status() {
			let status =
				fields.status.or_else(|| current.as_ref().and_then(|r| r.status)).unwrap_or(Status::Pending);
			conn.execute(
				"UPDATE records_todos SET title = ?1, content = ?2, status = ?3, version = version + 1, updated_at = ?4, deleted_at = NULL
				 WHERE id = ?5",
				params![title, content, status.as_str(), now_str, id],
			)?;
		} else {
			conn.execute(
				"UPDATE records_notes SET title = ?1, content = ?2, version = version + 1, updated_at = ?3, deleted_at = NULL
				 WHERE id = ?4",
				params![title, content, now_str, id],
			)?;
		}

		Ok(Self::get(conn, kind, id)?.expect("force_update requires an existing record"))
	}
}

fn select_columns(kind: Kind) -> &'static str {
	if kind.has_status() {
		"id, title, content, status, version, created_at, updated_at, deleted_at"
	} else {
		"id, title, content, version, created_at, updated_at, deleted_at"
	}
}

fn row_to_record(row: &Row, kind: Kind) -> rusqlite::Result<Record> {
	if kind.has_status() {
		let status_str: String = row.get(3)?;
		Ok(Record {
			id: row.get(0)?,
			title: row.get(1)?,
			content: row.get(2)?,
			status: Status::from_str(&status_str),
			version: row.get::<_, i64>(4)? as u64,
			created_at: parse_time(row, 5)?,
			updated_at: parse_time(row, 6)?,
			deleted_at: row.get::<_, Option<String>>(7)?.map(|s| parse_rfc3339(&s)).transpose()?,
		})
	} else {
		Ok(Record {
			id: row.get(0)?,
			title: row.get(1)?,
			content: row.get(2)?,
			status: None,
			version: row.get::<_, i64>(3)? as u64,
			created_at: parse_time(row, 4)?,
			updated_at: parse_time(row, 5)?,
			deleted_at: row.get::<_, Option<String>>(6)?.map(|s| parse_rfc3339(&s)).transpose()?,
		})
	}
}

fn parse_time(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
	let raw: String = row.get(idx)?;
	parse_rfc3339(&raw)
}

fn parse_rfc3339(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use reconcile_core::Kind;

	fn conn() -> Connection {
		let conn = Connection::open_in_memory().unwrap();
		crate::schema::init(&conn).unwrap();
		conn
	}

	fn fields(title: &str) -> RecordFields {
		RecordFields { title: Some(title.to_string()), content: None, status: None }
	}

	#[test]
	fn insert_then_get_round_trips() {
		let conn = conn();
		let now = Utc::now();
		let outcome = RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();
		assert!(matches!(outcome, InsertOutcome::Inserted(_)));

		let record = RecordStore::get(&conn, Kind::Todos, "t1").unwrap().unwrap();
		assert_eq!(record.version, 1);
		assert_eq!(record.title, "buy milk");
		assert_eq!(record.status, Some(Status::Pending));
	}

	#[test]
	fn insert_duplicate_id_is_rejected() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("a"), now).unwrap();
		let outcome = RecordStore::insert(&conn, Kind::Todos, "t1", fields("b"), now).unwrap();
		assert!(matches!(outcome, InsertOutcome::Duplicate));
	}

	#[test]
	fn update_if_version_advances_version_by_one() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();

		let outcome = RecordStore::update_if_version(
			&conn,
			Kind::Todos,
			"t1",
			1,
			RecordFields { title: Some("buy bread".into()), content: None, status: None },
			now,
		)
		.unwrap();

		match outcome {
			UpdateOutcome::Updated(record) => {
				assert_eq!(record.version, 2);
				assert_eq!(record.title, "buy bread");
			}
			other => panic!("expected Updated, got {other:?}"),
		}
	}

	#[test]
	fn update_if_version_mismatch_does_not_mutate() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();

		let outcome =
			RecordStore::update_if_version(&conn, Kind::Todos, "t1", 99, fields("buy bread"), now).unwrap();
		assert!(matches!(outcome, UpdateOutcome::VersionMismatch));

		let record = RecordStore::get(&conn, Kind::Todos, "t1").unwrap().unwrap();
		assert_eq!(record.version, 1);
		assert_eq!(record.title, "buy milk");
	}

	#[test]
	fn update_against_absent_record_reports_absent() {
		let conn = conn();
		let outcome = RecordStore::update_if_version(&conn, Kind::Todos, "missing", 1, fields("x"), Utc::now()).unwrap();
		assert!(matches!(outcome, UpdateOutcome::Absent));
	}

	#[test]
	fn update_does_not_match_a_tombstone() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();
		RecordStore::soft_delete_if_version(&conn, Kind::Todos, "t1", 1, now).unwrap();

		let outcome = RecordStore::update_if_version(&conn, Kind::Todos, "t1", 2, fields("resurrect"), now).unwrap();
		assert!(matches!(outcome, UpdateOutcome::VersionMismatch));
	}

	#[test]
	fn soft_delete_sets_tombstone_and_excludes_from_live() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();
		let outcome = RecordStore::soft_delete_if_version(&conn, Kind::Todos, "t1", 1, now).unwrap();

		match outcome {
			UpdateOutcome::Updated(record) => {
				assert_eq!(record.version, 2);
				assert!(record.is_tombstone());
			}
			other => panic!("expected Updated, got {other:?}"),
		}

		assert!(RecordStore::get_live(&conn, Kind::Todos, "t1").unwrap().is_none());
		assert!(RecordStore::get(&conn, Kind::Todos, "t1").unwrap().is_some());
	}

	#[test]
	fn force_update_ignores_version_and_clears_tombstone() {
		let conn = conn();
		let now = Utc::now();
		RecordStore::insert(&conn, Kind::Todos, "t1", fields("buy milk"), now).unwrap();
		RecordStore::soft_delete_if_version(&conn, Kind::Todos, "t1", 1, now).unwrap();

		let record = RecordStore::force_update(&conn, Kind::Todos, "t1", fields("resurrected"), now).unwrap();
		assert_eq!(record.version, 3);
		assert_eq!(record.title, "resurrected");
		assert!(!record.is_tombstone());
	}

	#[test]
	fn notes_have_no_status() {
		let conn = conn();
		RecordStore::insert(&conn, Kind::Notes, "n1", fields("a note"), Utc::now()).unwrap();
		let record = RecordStore::get(&conn, Kind::Notes, "n1").unwrap().unwrap();
		assert_eq!(record.status, None);
	}
}
