// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Twitter connection status for cross-posting.

use axum::{extract::State, Json};
use otogram_server_auth::Provider;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
	routes::auth::MessageResponse,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionResponse {
	pub connected: bool,
}

#[utoipa::path(
    get,
    path = "/api/twitter/check",
    responses(
        (status = 200, description = "Whether a Twitter token is stored", body = ConnectionResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "twitter"
)]
pub async fn check_connection(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
) -> Result<Json<ConnectionResponse>, ServerError> {
	let connected = state
		.tokens
		.get_token(user.user_id, Provider::Twitter)
		.await?
		.is_some();
	Ok(Json(ConnectionResponse { connected }))
}

#[utoipa::path(
    post,
    path = "/api/twitter/disconnect",
    responses(
        (status = 200, description = "Token removed", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "twitter"
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn disconnect(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
) -> Result<Json<MessageResponse>, ServerError> {
	let removed = state
		.tokens
		.delete_token(user.user_id, Provider::Twitter)
		.await?;
	tracing::info!(removed, "Twitter disconnected");
	Ok(Json(MessageResponse::new("Twitter disconnected successfully")))
}
