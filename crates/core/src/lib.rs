// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! Domain types shared by every crate in the workspace: the record and
//! conflict shapes from the data model, the operation payloads the wire
//! layer decodes into, and the single error currency (`Error`/`Result`)
//! threaded through storage, transaction, engine and http.

mod conflict;
mod error;
mod kind;
mod ledger;
mod operation;
mod record;
mod resolution;
mod result;

pub use conflict::{Conflict, ConflictFilter, ConflictStats, ConflictStatus};
pub use error::Error;
pub use kind::Kind;
pub use ledger::LedgerEntry;
pub use operation::{Action, Operation, OperationPayload, RecordFields};
pub use record::{Record, Status};
pub use resolution::ResolutionChoice;
pub use result::{BatchSummary, OperationResult, OperationStatus};

pub type Result<T> = std::result::Result<T, Error>;
