// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! Durable keyed storage for todos and notes (C1), the idempotency ledger
//! (C2) and the conflict store (C3). Every method here takes a borrowed
//! `rusqlite::Connection` — usually the connection inside an open
//! `rusqlite::Transaction`, handed down by `reconcile_transaction`'s
//! coordinator — and none of them opens a transaction itself; atomicity
//! across a read-then-write across these three is the coordinator's job
//! (spec.md §4.6), not this crate's.

mod conflict_store;
mod ledger;
mod record_store;
pub mod schema;

pub use conflict_store::ConflictStore;
pub use ledger::IdempotencyLedger;
pub use record_store::{InsertOutcome, RecordStore, UpdateOutcome};
