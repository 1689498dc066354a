// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! The Transaction Coordinator (C6): a serialized, atomic scope around
//! {read current record, compare version, write record, advance version,
//! write ledger, write conflict} tuples (spec.md §4.6).
//!
//! Two concurrent callers touching an overlapping record must be
//! serializable — their effects equal some serial order. SQLite already
//! gives us that for free once a writer holds an exclusive transaction, so
//! the coordinator is a single-writer mutex around one `rusqlite::Connection`
//! plus `BEGIN IMMEDIATE`/commit/rollback, rather than a hand-rolled lock
//! manager. Blocking SQLite calls run inside `spawn_blocking` so a slow
//! operation never stalls the async reactor thread — per spec.md §5, a
//! cooperative task must not hold the serialization primitive across a
//! suspension point that isn't the current operation's own I/O, and a
//! `std::sync::Mutex` held across an `.await` would do exactly that.

use std::sync::Arc;

use reconcile_core::{Error, Result};
use rusqlite::{Connection, TransactionBehavior};
use tokio::sync::Mutex;
use tracing::instrument;

/// Owns the single writer connection. Cheap to clone (`Arc`-based
/// internally); every clone shares the same serialization point.
#[derive(Clone)]
pub struct TransactionCoordinator {
	conn: Arc<Mutex<Connection>>,
}

impl TransactionCoordinator {
	pub fn new(conn: Connection) -> Self {
		Self { conn: Arc::new(Mutex::new(conn)) }
	}

	/// Runs `f` inside one `BEGIN IMMEDIATE` transaction. Commits on
	/// `Ok`, rolls back on `Err` — rollback leaves no partial writes
	/// across the record, ledger and conflict tables, since all three
	/// live in the one SQLite database this connection points at
	/// (spec.md §9, "Cross-store atomicity without distributed
	/// transactions").
	#[instrument(level = "trace", skip(self, f))]
	pub async fn with_transaction<F, T>(&self, f: F) -> Result<T>
	where
		F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T> + Send + 'static,
		T: Send + 'static,
	{
		let guard = Arc::clone(&self.conn).lock_owned().await;

		tokio::task::spawn_blocking(move || {
			let mut guard = guard;
			let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;

			match f(&tx) {
				Ok(value) => {
					tx.commit()?;
					Ok(value)
				}
				Err(err) => {
					// best-effort: the transaction also rolls back on drop
					let _ = tx.rollback();
					Err(err)
				}
			}
		})
		.await
		.map_err(|join_err| Error::Internal(format!("transaction task panicked: {join_err}")))?
	}
}
