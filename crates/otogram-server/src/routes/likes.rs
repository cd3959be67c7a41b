// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::{Path, State},
	Json,
};
use otogram_server_auth::PostId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
	pub liked: bool,
}

pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, ServerError> {
	PostId::parse(raw).ok_or_else(|| ServerError::BadRequest("Invalid post ID".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 400, description = "Invalid post ID", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, post_id = %id))]
pub async fn toggle_like(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
	Path(id): Path<String>,
) -> Result<Json<LikeResponse>, ServerError> {
	let post_id = parse_post_id(&id)?;
	if !state.posts.post_exists(post_id).await? {
		return Err(ServerError::NotFound("Post not found".to_string()));
	}

	let liked = state.likes.toggle_like(user.user_id, post_id).await?;
	tracing::debug!(liked, "like toggled");
	Ok(Json(LikeResponse { liked }))
}
