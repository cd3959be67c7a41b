// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, http::StatusCode};

use crate::api::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = String),
        (status = 503, description = "Database unreachable", body = String)
    ),
    tag = "health"
)]
/// GET /health - plain-text liveness including a database round-trip.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
	match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => (StatusCode::OK, "OK"),
		Err(e) => {
			tracing::warn!(error = %e, "health check failed");
			(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
		}
	}
}
