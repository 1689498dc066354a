// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use reconcile_engine::{ConflictResolver, SyncProcessor};
use reconcile_transaction::TransactionCoordinator;

/// Axum state shared across every handler. Cheap to clone — every field is
/// an `Arc`-backed handle onto the one SQLite connection the process owns.
#[derive(Clone)]
pub struct AppState {
	pub coordinator: TransactionCoordinator,
	pub processor: SyncProcessor,
	pub resolver: ConflictResolver,
}

impl AppState {
	pub fn new(coordinator: TransactionCoordinator) -> Self {
		Self {
			processor: SyncProcessor::new(coordinator.clone()),
			resolver: ConflictResolver::new(coordinator.clone()),
			coordinator,
		}
	}
}
