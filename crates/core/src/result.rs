// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use serde::Serialize;

use crate::Record;

/// Terminal outcome of one operation within a batch (spec.md §4.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationStatus {
	Applied,
	Conflict,
	Error,
}

/// Per-operation result, in the same order and length as the input batch
/// (invariant P7).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
	pub operation_id: String,
	pub status: OperationStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<Record>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub conflict_id: Option<String>,
}

impl OperationResult {
	pub fn applied(operation_id: impl Into<String>, data: Record) -> Self {
		Self {
			operation_id: operation_id.into(),
			status: OperationStatus::Applied,
			message: None,
			data: Some(data),
			conflict_id: None,
		}
	}

	pub fn applied_with_message(operation_id: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			operation_id: operation_id.into(),
			status: OperationStatus::Applied,
			message: Some(message.into()),
			data: None,
			conflict_id: None,
		}
	}

	pub fn conflict(operation_id: impl Into<String>, conflict_id: impl Into<String>) -> Self {
		Self {
			operation_id: operation_id.into(),
			status: OperationStatus::Conflict,
			message: None,
			data: None,
			conflict_id: Some(conflict_id.into()),
		}
	}

	pub fn error(operation_id: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			operation_id: operation_id.into(),
			status: OperationStatus::Error,
			message: Some(message.into()),
			data: None,
			conflict_id: None,
		}
	}
}

/// Aggregate counts across a batch's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
	pub total: usize,
	pub applied: usize,
	pub conflicts: usize,
	pub errors: usize,
}

impl BatchSummary {
	pub fn from_results(results: &[OperationResult]) -> Self {
		let mut summary = BatchSummary { total: results.len(), ..Default::default() };
		for result in results {
			match result.status {
				OperationStatus::Applied => summary.applied += 1,
				OperationStatus::Conflict => summary.conflicts += 1,
				OperationStatus::Error => summary.errors += 1,
			}
		}
		summary
	}
}
