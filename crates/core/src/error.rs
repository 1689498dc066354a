// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use thiserror::Error;

/// The single error currency threaded through storage, transaction, engine
/// and http. `From<rusqlite::Error>` and `From<serde_json::Error>` let every
/// downstream crate use plain `?` against this one type instead of carrying
/// a local error enum per layer.
#[derive(Debug, Error)]
pub enum Error {
	/// The wire layer rejected a request before it reached the sync
	/// processor or any other endpoint handler (spec §4.7, §7).
	#[error("malformed request: {0}")]
	ShapeViolation(String),

	/// A referenced resource (conflict id, etc.) does not exist.
	#[error("not found: {0}")]
	NotFound(String),

	/// A resolve/dismiss was attempted on a conflict that is not PENDING.
	#[error("illegal state transition: {0}")]
	IllegalStateTransition(String),

	/// An unexpected failure inside the storage or transaction layer.
	/// Rolls back the enclosing transaction; surfaced as a per-operation
	/// ERROR within sync, or a 500 for other endpoints.
	#[error("internal failure: {0}")]
	Internal(String),
}

impl From<rusqlite::Error> for Error {
	fn from(err: rusqlite::Error) -> Self {
		Error::Internal(err.to_string())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Internal(err.to_string())
	}
}
