// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session authentication for Axum.
//!
//! [`auth_layer`] reads the signed session cookie and stores an
//! [`AuthContext`] in the request extensions. A missing, tampered or expired
//! cookie yields an anonymous context, never an error. Handlers then pick
//! the identity up with [`RequireAuth`] (401 when anonymous) or
//! [`OptionalAuth`] (always succeeds with a [`Viewer`]).
//!
//! ```ignore
//! async fn create_post(RequireAuth(user): RequireAuth) -> impl IntoResponse {
//!     format!("posting as {}", user.user_id)
//! }
//! ```

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use otogram_server_auth::{extract_session_cookie_with_name, AuthContext, CurrentUser, Viewer};
use otogram_server_session::SessionService;
use tracing::instrument;

use crate::{api::AppState, error::ErrorResponse};

#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let auth_ctx = authenticate_request(request.headers(), &state.session);

	if let Some(user) = auth_ctx.user() {
		let span = tracing::Span::current();
		span.record("auth_method", "session");
		span.record("user_id", tracing::field::display(&user.user_id));
	}

	request.extensions_mut().insert(auth_ctx);
	next.run(request).await
}

/// Resolve the request's viewer from its session cookie.
pub fn authenticate_request(
	headers: &axum::http::HeaderMap,
	session: &SessionService,
) -> AuthContext {
	let Some(token) = extract_session_cookie_with_name(headers, session.cookie_name()) else {
		return AuthContext::anonymous();
	};

	match session.verify(&token) {
		Ok(claims) => AuthContext::authenticated(claims.current_user()),
		Err(e) => {
			tracing::debug!(error = %e, "ignoring invalid session cookie");
			AuthContext::anonymous()
		}
	}
}

pub(crate) fn unauthorized_response() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorResponse::new("unauthorized", "Not authenticated")),
	)
		.into_response()
}

/// Extractor for handlers that need a signed-in user.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_default();

		match auth_ctx.require_user() {
			Ok(user) => {
				tracing::debug!(user_id = %user.user_id, "Authentication required: success");
				Ok(RequireAuth(user.clone()))
			}
			Err(_) => {
				tracing::debug!("Authentication required: no valid session");
				Err(unauthorized_response())
			}
		}
	}
}

/// Extractor for read endpoints that shape results for the viewer when
/// one is signed in.
pub struct OptionalAuth(pub Viewer);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	#[instrument(name = "OptionalAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_default();

		Ok(OptionalAuth(auth_ctx.viewer))
	}
}
