// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::{Path, State},
	Json,
};
use otogram_server_db::Reply;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
	extract::JsonBody,
	routes::likes::parse_post_id,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReplyRequest {
	#[serde(default)]
	pub content: String,
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/reply",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "The stored reply with its author", body = Reply),
        (status = 400, description = "Invalid post ID or empty content", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, post_id = %id))]
pub async fn create_reply(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
	Path(id): Path<String>,
	JsonBody(request): JsonBody<CreateReplyRequest>,
) -> Result<Json<Reply>, ServerError> {
	let post_id = parse_post_id(&id)?;
	if request.content.trim().is_empty() {
		return Err(ServerError::BadRequest("Content is required".to_string()));
	}
	if !state.posts.post_exists(post_id).await? {
		return Err(ServerError::NotFound("Post not found".to_string()));
	}

	let reply = state
		.replies
		.create_reply(post_id, user.user_id, &request.content)
		.await?;
	tracing::info!(reply_id = %reply.id, "reply created");
	Ok(Json(reply))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/replies",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Replies, oldest first", body = Vec<Reply>),
        (status = 400, description = "Invalid post ID", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn list_replies(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Vec<Reply>>, ServerError> {
	let post_id = parse_post_id(&id)?;
	Ok(Json(state.replies.list_replies(post_id).await?))
}
