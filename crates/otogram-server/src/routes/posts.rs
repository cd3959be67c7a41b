// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post feed and creation handlers.

use axum::{
	extract::{Query, State},
	Json,
};
use otogram_server_auth::UserId;
use otogram_server_crosspost::CrossPostJob;
use otogram_server_db::{NewPost, Post, SongType};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
	api::AppState,
	auth_middleware::{OptionalAuth, RequireAuth},
	error::{ErrorResponse, ServerError},
	extract::JsonBody,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListPostsParams {
	/// Only posts by this user (profile view).
	pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub song_id: String,
	pub song_type: SongType,
	#[serde(default)]
	pub comment: String,
	#[serde(default)]
	pub tags: Vec<String>,
	/// Also publish the comment to the author's connected Twitter account.
	#[serde(default)]
	pub post_to_twitter: bool,
}

#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsParams),
    responses(
        (status = 200, description = "Posts, newest first", body = Vec<Post>),
        (status = 400, description = "invalid user_id", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn list_posts(
	State(state): State<AppState>,
	OptionalAuth(viewer): OptionalAuth,
	Query(params): Query<ListPostsParams>,
) -> Result<Json<Vec<Post>>, ServerError> {
	let author = match params.user_id.as_deref().filter(|s| !s.is_empty()) {
		Some(raw) => Some(
			UserId::parse(raw).ok_or_else(|| ServerError::BadRequest("invalid user_id".to_string()))?,
		),
		None => None,
	};

	let posts = state.posts.list_posts(author, &viewer).await?;
	Ok(Json(posts))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "The stored post", body = Post),
        (status = 400, description = "Too many tags (max 10)", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "posts"
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, post_id = tracing::field::Empty))]
pub async fn create_post(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
	JsonBody(request): JsonBody<CreatePostRequest>,
) -> Result<Json<Post>, ServerError> {
	let new_post = NewPost {
		user_id: user.user_id,
		title: request.title,
		song_id: request.song_id,
		song_type: request.song_type,
		comment: request.comment,
		tags: request.tags,
	};
	new_post.validate()?;

	let post = state.posts.create_post(&new_post).await?;
	tracing::Span::current().record("post_id", tracing::field::display(&post.id));
	tracing::info!("post created");

	if request.post_to_twitter {
		schedule_crosspost(&state, &post);
	}

	Ok(Json(post))
}

/// Hand the post to the cross-post queue. The outcome is only logged.
fn schedule_crosspost(state: &AppState, post: &Post) {
	let Some(crosspost) = &state.crosspost else {
		tracing::warn!("cross-post requested but Twitter is not configured");
		return;
	};

	let job = CrossPostJob::new(post.user_id, post.id, post.comment.clone(), &state.frontend_url);
	if !crosspost.submit(job) {
		tracing::warn!("cross-post not queued");
	}
}
