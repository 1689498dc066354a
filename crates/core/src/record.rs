// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a todo. Notes carry no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
	Pending,
	InProgress,
	Completed,
}

impl Status {
	pub fn as_str(&self) -> &'static str {
		match self {
			Status::Pending => "pending",
			Status::InProgress => "in-progress",
			Status::Completed => "completed",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s {
			"pending" => Some(Status::Pending),
			"in-progress" => Some(Status::InProgress),
			"completed" => Some(Status::Completed),
			_ => None,
		}
	}
}

/// A todo or note as persisted by the Record Store (spec.md §3).
///
/// `deleted_at.is_some()` marks a tombstone: excluded from live (query-side)
/// lookups but still visible to the sync processor for conflict detection
/// (invariant I2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
	pub id: String,
	pub title: String,
	pub content: Option<String>,
	/// `Some` only for `Kind::Todos`.
	pub status: Option<Status>,
	pub version: u64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
	pub fn is_tombstone(&self) -> bool {
		self.deleted_at.is_some()
	}
}
