// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

//! Process bootstrap: read environment configuration, open the SQLite
//! connection, verify the schema, wire up the stores and the wire layer,
//! and serve until a shutdown signal arrives (spec.md §6, §9 "singleton /
//! global state").

use std::env;

use reconcile_http::{AppState, build_router};
use reconcile_storage::schema;
use reconcile_transaction::TransactionCoordinator;
use rusqlite::Connection;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "reconcile.sqlite3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
	let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

	info!(database_url = %database_url, bind_addr = %bind_addr, "starting reconcile-server");

	let conn = if database_url == ":memory:" {
		Connection::open_in_memory()
	} else {
		Connection::open(&database_url)
	}
	.expect("failed to open database connection");

	schema::init(&conn).expect("failed to initialize schema");

	let coordinator = TransactionCoordinator::new(conn);
	let state = AppState::new(coordinator);
	let router = build_router(state);

	let listener = tokio::net::TcpListener::bind(&bind_addr).await.expect("failed to bind address");
	info!(bind_addr = %bind_addr, "listening");

	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.expect("server error");

	info!("shutdown complete");
}

async fn shutdown_signal() {
	tokio::signal::ctrl_c().await.expect("failed to listen for ctrl_c");
	info!("shutdown signal received");
}
