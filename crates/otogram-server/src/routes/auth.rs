// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth login, logout and profile handlers.

use axum::{
	extract::{Query, State},
	http::header::SET_COOKIE,
	response::{IntoResponse, Redirect, Response},
	Json,
};
use chrono::Utc;
use otogram_server_auth::{validate_display_name, Provider, User, UserId};
use otogram_server_auth_twitter::DEFAULT_TOKEN_LIFETIME;
use otogram_server_db::OAuthToken;
use otogram_server_session::SessionRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
	extract::JsonBody,
	oauth_provider::{IdentityProvider, ProviderTokens},
};

/// Path the client app serves for first-login profile completion.
pub const SETUP_PROFILE_PATH: &str = "/setup-profile";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CallbackParams {
	pub code: Option<String>,
	pub state: Option<String>,
	pub error: Option<String>,
	pub error_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
	#[serde(default)]
	pub display_name: String,
	#[serde(default)]
	pub profile_image: String,
	#[serde(default)]
	pub bio: String,
}

fn identity_provider(
	state: &AppState,
	provider: Provider,
) -> Result<Arc<dyn IdentityProvider>, ServerError> {
	let client = match provider {
		Provider::Spotify => state.spotify.clone(),
		Provider::Twitter => state.twitter.clone(),
	};
	client.ok_or_else(|| ServerError::NotImplemented(format!("{provider} login is not configured")))
}

// =============================================================================
// Login redirect
// =============================================================================

#[utoipa::path(
    get,
    path = "/auth/spotify",
    responses(
        (status = 307, description = "Redirect to Spotify"),
        (status = 501, description = "Spotify login not configured", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_spotify(State(state): State<AppState>) -> Result<Response, ServerError> {
	login(&state, Provider::Spotify)
}

#[utoipa::path(
    get,
    path = "/auth/twitter",
    responses(
        (status = 307, description = "Redirect to Twitter"),
        (status = 501, description = "Twitter login not configured", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_twitter(State(state): State<AppState>) -> Result<Response, ServerError> {
	login(&state, Provider::Twitter)
}

#[tracing::instrument(skip(state), fields(provider = %provider))]
fn login(state: &AppState, provider: Provider) -> Result<Response, ServerError> {
	let client = identity_provider(state, provider)?;
	let url = client
		.authorization_url(state.oauth_state.value())
		.map_err(|e| {
			tracing::error!(error = %e, "failed to build authorization URL");
			ServerError::Internal("Failed to build authorization URL".to_string())
		})?;

	tracing::debug!("redirecting to OAuth provider");
	Ok(Redirect::temporary(&url).into_response())
}

// =============================================================================
// Callback
// =============================================================================

#[utoipa::path(
    get,
    path = "/auth/spotify/callback",
    params(CallbackParams),
    responses(
        (status = 303, description = "Signed in, redirect to the client app"),
        (status = 400, description = "Invalid state, missing code or provider error", body = ErrorResponse),
        (status = 500, description = "Token exchange, profile fetch or session failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn callback_spotify(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Result<Response, ServerError> {
	callback(&state, Provider::Spotify, params).await
}

#[utoipa::path(
    get,
    path = "/auth/twitter/callback",
    params(CallbackParams),
    responses(
        (status = 303, description = "Signed in, redirect to the client app"),
        (status = 400, description = "Invalid state, missing code or provider error", body = ErrorResponse),
        (status = 500, description = "Token exchange, profile fetch or session failure", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn callback_twitter(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Result<Response, ServerError> {
	callback(&state, Provider::Twitter, params).await
}

#[tracing::instrument(skip(state, params), fields(provider = %provider, user_id = tracing::field::Empty))]
async fn callback(
	state: &AppState,
	provider: Provider,
	params: CallbackParams,
) -> Result<Response, ServerError> {
	let client = identity_provider(state, provider)?;

	if let Some(error) = params.error {
		tracing::warn!(error = %error, "OAuth provider returned an error");
		return Err(ServerError::BadRequest(
			params.error_description.unwrap_or(error),
		));
	}

	let state_matches = params
		.state
		.as_deref()
		.is_some_and(|s| state.oauth_state.verify(s));
	if !state_matches {
		tracing::warn!("OAuth state mismatch");
		return Err(ServerError::BadRequest("Invalid OAuth state".to_string()));
	}

	let code = params
		.code
		.filter(|c| !c.is_empty())
		.ok_or_else(|| ServerError::BadRequest("Missing authorization code".to_string()))?;

	let tokens = client.exchange_code(&code).await.map_err(|e| {
		tracing::error!(error = %e, "token exchange failed");
		ServerError::Upstream("Failed to exchange token".to_string())
	})?;

	let identity = client
		.fetch_identity(tokens.access_token.expose())
		.await
		.map_err(|e| {
			tracing::error!(error = %e, "profile fetch failed");
			ServerError::Upstream("Failed to get user info".to_string())
		})?;

	let user = state
		.users
		.upsert_oauth_user(provider, &identity.external_id, &identity.profile_image)
		.await
		.map_err(|e| {
			tracing::error!(error = %e, "user upsert failed");
			ServerError::Internal("Failed to save user".to_string())
		})?;
	tracing::Span::current().record("user_id", tracing::field::display(&user.id));

	if client.persists_token() {
		save_provider_token(state, user.id, provider, tokens).await;
	}

	let session = state
		.session
		.create_session(SessionRequest::new(
			user.id,
			user.display_name.clone(),
			provider,
		))
		.map_err(|e| {
			tracing::error!(error = %e, "session creation failed");
			ServerError::Internal("Failed to create session".to_string())
		})?;

	let target = if user.needs_profile_setup() {
		format!("{}{SETUP_PROFILE_PATH}", state.frontend_url)
	} else {
		state.frontend_url.clone()
	};

	tracing::info!(
		needs_profile_setup = user.needs_profile_setup(),
		"OAuth login complete"
	);
	Ok(([(SET_COOKIE, session.cookie_header)], Redirect::to(&target)).into_response())
}

/// Store the provider token for later cross-posting. Failures are logged
/// and do not block the login.
async fn save_provider_token(
	state: &AppState,
	user_id: UserId,
	provider: Provider,
	tokens: ProviderTokens,
) {
	let lifetime = tokens.lifetime.unwrap_or(DEFAULT_TOKEN_LIFETIME);
	let expires_at = Utc::now()
		+ chrono::Duration::from_std(lifetime).unwrap_or_else(|_| chrono::Duration::hours(2));

	let token = OAuthToken {
		user_id,
		provider,
		access_token: tokens.access_token,
		refresh_token: tokens.refresh_token,
		expires_at,
	};

	if let Err(e) = state.tokens.upsert_token(&token).await {
		tracing::warn!(error = %e, user_id = %user_id, provider = %provider, "failed to save OAuth token");
	}
}

// =============================================================================
// Session
// =============================================================================

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
	(
		[(SET_COOKIE, state.session.clear_cookie_header())],
		Json(MessageResponse::new("Logged out successfully")),
	)
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The signed-in user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(
	State(state): State<AppState>,
	RequireAuth(current): RequireAuth,
) -> Result<Json<User>, ServerError> {
	let user = state
		.users
		.get_user_by_id(current.user_id)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;
	Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Display name is required", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all, fields(user_id = %current.user_id))]
pub async fn update_profile(
	State(state): State<AppState>,
	RequireAuth(current): RequireAuth,
	JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<User>, ServerError> {
	validate_display_name(&request.display_name)?;

	let user = state
		.users
		.update_profile(
			current.user_id,
			&request.display_name,
			&request.profile_image,
			&request.bio,
		)
		.await?
		.ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

	tracing::info!("profile updated");
	Ok(Json(user))
}
