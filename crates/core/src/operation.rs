// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use serde::{Deserialize, Serialize};

use crate::{Kind, Status};

/// The action an operation performs, shared by the operation itself and by
/// the ledger entry written once it terminates successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
	Create,
	Update,
	Delete,
}

/// The mutable fields of a record a client may set. `None` on an `Update`
/// means "leave unchanged"; on a `Create` `title` is mandatory and is
/// validated non-empty by the wire layer before an `Operation` is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<Status>,
}

/// The kind-aware, shape-validated payload of one client operation. The
/// http wire layer is the only place that constructs one of these directly
/// from untrusted JSON (`Batch::validate` in `reconcile-http`); everything
/// downstream treats it as trusted.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationPayload {
	Create { id: String, fields: RecordFields },
	Update { id: String, version: u64, fields: RecordFields },
	Delete { id: String, version: u64 },
}

impl OperationPayload {
	pub fn action(&self) -> Action {
		match self {
			OperationPayload::Create { .. } => Action::Create,
			OperationPayload::Update { .. } => Action::Update,
			OperationPayload::Delete { .. } => Action::Delete,
		}
	}

	pub fn record_id(&self) -> &str {
		match self {
			OperationPayload::Create { id, .. }
			| OperationPayload::Update { id, .. }
			| OperationPayload::Delete { id, .. } => id,
		}
	}

	/// The client's version, for operations that carry one. `Create`
	/// never does — the server always assigns version 1.
	pub fn client_version(&self) -> Option<u64> {
		match self {
			OperationPayload::Create { .. } => None,
			OperationPayload::Update { version, .. } | OperationPayload::Delete { version, .. } => {
				Some(*version)
			}
		}
	}
}

/// One unit of client intent, uniquely identified by `operation_id` — the
/// idempotency key (spec.md §4.2) and, on conflict, the conflict's primary
/// key (spec.md §4.3) in one.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
	pub operation_id: String,
	pub kind: Kind,
	pub payload: OperationPayload,
}
