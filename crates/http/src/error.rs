// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use reconcile_core::Error;
use serde::Serialize;

/// `reconcile_core::Error` is foreign to this crate, so `IntoResponse`
/// cannot be implemented on it directly here (orphan rule) — this newtype
/// is the seam. Status codes follow the table in spec.md §6.
pub struct ApiError(Error);

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		ApiError(err)
	}
}

#[derive(Serialize)]
struct ErrorBody {
	success: bool,
	error: String,
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match &self.0 {
			Error::ShapeViolation(_) => StatusCode::BAD_REQUEST,
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			// spec.md §6 reserves 409 for single-record CRUD version
			// conflicts outside this core; a resolve/dismiss on a
			// non-PENDING conflict is reported as a plain 400 instead.
			Error::IllegalStateTransition(_) => StatusCode::BAD_REQUEST,
			Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		(status, Json(ErrorBody { success: false, error: self.0.to_string() })).into_response()
	}
}
