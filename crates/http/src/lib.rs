// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! The Wire Layer (C7): decodes and shape-validates sync batches, serves the
//! conflict read routes, and dispatches resolve/dismiss requests to
//! `reconcile-engine`. Everything downstream of `validate::parse_batch`
//! treats its input as trusted.

mod error;
mod handlers;
mod state;
mod validate;

use axum::{
	Router,
	routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the full route table, wired to `state`. Matches the endpoint
/// table in spec.md §6 exactly — no additional routes.
pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route("/api/sync", post(handlers::sync))
		.route("/api/sync/health", get(handlers::health))
		.route("/api/conflicts", get(handlers::list_conflicts))
		.route("/api/conflicts/stats", get(handlers::conflict_stats))
		.route("/api/conflicts/{id}", get(handlers::get_conflict))
		.route("/api/conflicts/{id}/resolve", put(handlers::resolve_conflict))
		.route("/api/conflicts/{id}/dismiss", put(handlers::dismiss_conflict))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
