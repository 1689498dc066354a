// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! The Sync Processor (C4) and Conflict Resolver (C5) — the heart of the
//! system. Both are generic over nothing but a `TransactionCoordinator`:
//! each call opens its own serialized transaction, runs the per-operation
//! (or per-resolution) algorithm, and commits or rolls back.

mod resolver;
mod sync_processor;

pub use resolver::ConflictResolver;
pub use sync_processor::SyncProcessor;
