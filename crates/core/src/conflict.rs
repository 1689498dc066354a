// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Kind, RecordFields};

/// Lifecycle state of a conflict (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictStatus {
	Pending,
	Resolved,
	Dismissed,
}

/// Durable evidence of an operation whose client version did not match
/// server state, created by the sync processor and terminated by the
/// conflict resolver. `id == operation_id`: both are the same string,
/// which is what guarantees at-most-one conflict per operation (spec.md §9
/// "Idempotency key vs conflict id").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
	pub id: String,
	pub kind: Kind,
	pub record_id: String,
	/// Snapshot of the mutable fields at detection time. `None` when the
	/// record did not exist (an `AbsentTarget` conflict).
	pub server_data: Option<RecordFields>,
	pub client_data: RecordFields,
	pub server_version: u64,
	pub client_version: u64,
	pub status: ConflictStatus,
	pub created_at: DateTime<Utc>,
	pub resolved_at: Option<DateTime<Utc>>,
	pub resolved_data: Option<RecordFields>,
}

/// Optional filter for `ConflictStore::list`.
#[derive(Debug, Clone, Default)]
pub struct ConflictFilter {
	pub status: Option<ConflictStatus>,
	pub kind: Option<Kind>,
}

/// Aggregate counts returned by `ConflictStore::stats`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictStats {
	pub pending: u64,
	pub resolved: u64,
	pub dismissed: u64,
	pub by_kind: Vec<(Kind, u64)>,
}
