// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post and user search.

use axum::{
	extract::{Query, State},
	Json,
};
use otogram_server_auth::User;
use otogram_server_db::{Post, SearchScope};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
	api::AppState,
	auth_middleware::OptionalAuth,
	error::{ErrorResponse, ServerError},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchPostsParams {
	/// Search term, required.
	pub q: Option<String>,
	/// `title`, `comment`, `tag` or `all` (default). Unknown values mean `all`.
	#[serde(rename = "type")]
	pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchUsersParams {
	/// Display name substring. Empty lists every user.
	pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/search/posts",
    params(SearchPostsParams),
    responses(
        (status = 200, description = "Matching posts, newest first", body = Vec<Post>),
        (status = 400, description = "Query parameter 'q' is required", body = ErrorResponse)
    ),
    tag = "search"
)]
#[tracing::instrument(skip_all, fields(scope = tracing::field::Empty))]
pub async fn search_posts(
	State(state): State<AppState>,
	OptionalAuth(viewer): OptionalAuth,
	Query(params): Query<SearchPostsParams>,
) -> Result<Json<Vec<Post>>, ServerError> {
	let term = params
		.q
		.filter(|q| !q.is_empty())
		.ok_or_else(|| ServerError::BadRequest("Query parameter 'q' is required".to_string()))?;
	let scope = SearchScope::from_param(params.scope.as_deref());
	tracing::Span::current().record("scope", tracing::field::debug(&scope));

	let posts = state.posts.search_posts(scope, &term, &viewer).await?;
	tracing::debug!(results = posts.len(), "post search complete");
	Ok(Json(posts))
}

#[utoipa::path(
    get,
    path = "/api/search/users",
    params(SearchUsersParams),
    responses(
        (status = 200, description = "Matching users", body = Vec<User>)
    ),
    tag = "search"
)]
pub async fn search_users(
	State(state): State<AppState>,
	Query(params): Query<SearchUsersParams>,
) -> Result<Json<Vec<User>>, ServerError> {
	let users = state.users.search_users(params.q.as_deref()).await?;
	Ok(Json(users))
}
