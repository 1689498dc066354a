// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use chrono::Utc;
use reconcile_core::{Conflict, Error, RecordFields, ResolutionChoice, Result};
use reconcile_storage::{ConflictStore, RecordStore};
use reconcile_transaction::TransactionCoordinator;
use tracing::instrument;

/// Applies an operator's resolution choice to a conflict (spec.md §4.5).
/// Resolution bypasses the version check entirely: the conflict record
/// itself is the authority over what "current" becomes, so the record is
/// advanced with `RecordStore::force_update` rather than a compare-and-set.
#[derive(Clone)]
pub struct ConflictResolver {
	coordinator: TransactionCoordinator,
}

impl ConflictResolver {
	pub fn new(coordinator: TransactionCoordinator) -> Self {
		Self { coordinator }
	}

	/// `custom_data` is required iff `choice == Custom`; the caller (wire
	/// layer) is responsible for that precondition, enforced here as an
	/// `Error::ShapeViolation` so it still surfaces as a client error
	/// rather than an internal one.
	#[instrument(level = "debug", skip(self, custom_data))]
	pub async fn resolve(
		&self,
		conflict_id: String,
		choice: ResolutionChoice,
		custom_data: Option<RecordFields>,
	) -> Result<Conflict> {
		if choice == ResolutionChoice::Custom && custom_data.is_none() {
			return Err(Error::ShapeViolation("resolvedData is required for a CUSTOM resolution".into()));
		}

		self.coordinator
			.with_transaction(move |tx| {
				let conflict = ConflictStore::get(tx, &conflict_id)?
					.ok_or_else(|| Error::NotFound(format!("conflict '{conflict_id}' not found")))?;

				let selected = match choice {
					ResolutionChoice::Client => conflict.client_data.clone(),
					ResolutionChoice::Server => conflict.server_data.clone().unwrap_or_default(),
					ResolutionChoice::Custom => custom_data.clone().expect("checked above"),
				};

				// SERVER on an absent-record conflict (serverData = null) has
				// nothing to apply to the record; it collapses to marking the
				// conflict resolved without a force_update (spec.md §4.5 step 2).
				let is_absent_target = conflict.server_version == 0 && conflict.server_data.is_none();
				if choice == ResolutionChoice::Server && is_absent_target {
					return ConflictStore::transition_to_resolved(tx, &conflict_id, &selected, Utc::now());
				}

				RecordStore::force_update(tx, conflict.kind, &conflict.record_id, selected.clone(), Utc::now())?;
				ConflictStore::transition_to_resolved(tx, &conflict_id, &selected, Utc::now())
			})
			.await
	}

	#[instrument(level = "debug", skip(self))]
	pub async fn dismiss(&self, conflict_id: String) -> Result<Conflict> {
		self.coordinator
			.with_transaction(move |tx| ConflictStore::transition_to_dismissed(tx, &conflict_id, Utc::now()))
			.await
	}
}
