// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};

use crate::{Action, Kind};

/// A record that an operation has been terminally applied. Presence of
/// `operation_id` in the ledger is the sole authority for idempotent retry
/// (spec.md §3, §4.2) — it is never updated or deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
	pub operation_id: String,
	pub action: Action,
	pub kind: Kind,
	pub processed_at: DateTime<Utc>,
}
