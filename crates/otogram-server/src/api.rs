// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and the HTTP router.

use axum::{
	extract::DefaultBodyLimit,
	http::{header, HeaderValue, Method},
	routing::{get, post},
	Json, Router,
};
use otogram_server_auth_spotify::{SpotifyOAuthClient, SpotifyOAuthConfig};
use otogram_server_auth_twitter::{TwitterOAuthClient, TwitterOAuthConfig};
use otogram_server_config::{ProviderOAuthConfig, ServerConfig};
use otogram_server_crosspost::{CrossPostService, TwitterPublisher};
use otogram_server_db::{
	LikeRepository, LikeStore, OAuthTokenRepository, OAuthTokenStore, PostRepository, PostStore,
	ReplyRepository, ReplyStore, SqlitePool, UserRepository, UserStore,
};
use otogram_server_session::SessionService;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;

use crate::{
	api_docs::ApiDoc,
	oauth_provider::IdentityProvider,
	oauth_state::OAuthState,
	routes::{self, upload::MULTIPART_OVERHEAD},
	typed_router::{AuthedRouter, OptionalAuthRouter, PublicRouter},
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub users: Arc<dyn UserStore>,
	pub posts: Arc<dyn PostStore>,
	pub likes: Arc<dyn LikeStore>,
	pub replies: Arc<dyn ReplyStore>,
	pub tokens: Arc<dyn OAuthTokenStore>,
	pub session: Arc<SessionService>,
	pub oauth_state: Arc<OAuthState>,
	pub spotify: Option<Arc<dyn IdentityProvider>>,
	pub twitter: Option<Arc<dyn IdentityProvider>>,
	pub crosspost: Option<Arc<CrossPostService>>,
	/// Public URL of this server, used for upload links.
	pub base_url: String,
	/// Client application URL: CORS origin and post-login redirect target.
	pub frontend_url: String,
	pub uploads_dir: PathBuf,
	pub max_upload_bytes: usize,
}

/// Build the state from a migrated pool and the resolved configuration.
///
/// A provider whose client cannot be built is logged and left
/// unconfigured; its login routes then answer 501.
pub async fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let tokens: Arc<dyn OAuthTokenStore> = Arc::new(OAuthTokenRepository::new(pool.clone()));

	let spotify = config
		.oauth
		.spotify
		.as_ref()
		.and_then(|c| match SpotifyOAuthClient::new(spotify_config(c)) {
			Ok(client) => {
				tracing::info!("Spotify OAuth enabled");
				Some(Arc::new(client) as Arc<dyn IdentityProvider>)
			}
			Err(e) => {
				tracing::error!(error = %e, "Failed to create Spotify OAuth client");
				None
			}
		});

	let twitter_client = config
		.oauth
		.twitter
		.as_ref()
		.and_then(|c| match TwitterOAuthClient::new(twitter_config(c)) {
			Ok(client) => {
				tracing::info!("Twitter OAuth enabled");
				Some(client)
			}
			Err(e) => {
				tracing::error!(error = %e, "Failed to create Twitter OAuth client");
				None
			}
		});

	let crosspost = twitter_client.as_ref().map(|client| {
		let publisher = Arc::new(TwitterPublisher::new(tokens.clone(), client.clone()));
		Arc::new(CrossPostService::new(
			publisher,
			config.crosspost.queue_capacity,
		))
	});
	let twitter = twitter_client.map(|client| Arc::new(client) as Arc<dyn IdentityProvider>);

	AppState {
		users: Arc::new(UserRepository::new(pool.clone())),
		posts: Arc::new(PostRepository::new(pool.clone())),
		likes: Arc::new(LikeRepository::new(pool.clone())),
		replies: Arc::new(ReplyRepository::new(pool.clone())),
		tokens,
		pool,
		session: Arc::new(SessionService::from_config(&config.session)),
		oauth_state: Arc::new(OAuthState::generate()),
		spotify,
		twitter,
		crosspost,
		base_url: config.http.base_url.trim_end_matches('/').to_string(),
		frontend_url: config.http.frontend_url.trim_end_matches('/').to_string(),
		uploads_dir: config.uploads.dir.clone(),
		max_upload_bytes: config.uploads.max_bytes,
	}
}

fn spotify_config(c: &ProviderOAuthConfig) -> SpotifyOAuthConfig {
	SpotifyOAuthConfig {
		client_id: c.client_id.clone(),
		client_secret: c.client_secret.clone(),
		redirect_uri: c.redirect_uri.clone(),
		scopes: c.scopes.clone(),
	}
}

fn twitter_config(c: &ProviderOAuthConfig) -> TwitterOAuthConfig {
	TwitterOAuthConfig {
		client_id: c.client_id.clone(),
		client_secret: c.client_secret.clone(),
		redirect_uri: c.redirect_uri.clone(),
		scopes: c.scopes.clone(),
	}
}

/// CORS for the client application: its origin only, with credentials.
pub fn cors_layer(frontend_url: &str) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
		.allow_credentials(true);

	match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
		Ok(origin) => layer.allow_origin(origin),
		Err(e) => {
			tracing::warn!(error = %e, frontend_url, "invalid frontend URL, CORS origin not set");
			layer
		}
	}
}

pub fn create_router(state: AppState) -> Router {
	let uploads = ServeDir::new(&state.uploads_dir);

	let public = PublicRouter::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(openapi_json))
		.route(
			"/auth/spotify",
			get(routes::auth::login_spotify).post(routes::auth::login_spotify),
		)
		.route("/auth/spotify/callback", get(routes::auth::callback_spotify))
		.route(
			"/auth/twitter",
			get(routes::auth::login_twitter).post(routes::auth::login_twitter),
		)
		.route("/auth/twitter/callback", get(routes::auth::callback_twitter))
		.route("/auth/logout", post(routes::auth::logout))
		.route("/api/posts/{id}/replies", get(routes::replies::list_replies))
		.route("/api/search/users", get(routes::search::search_users))
		.build();

	let optional = OptionalAuthRouter::new()
		.route("/api/posts", get(routes::posts::list_posts))
		.route("/api/search/posts", get(routes::search::search_posts))
		.build(state.clone());

	let authed = AuthedRouter::new()
		.route("/auth/me", get(routes::auth::get_current_user))
		.route("/auth/profile", post(routes::auth::update_profile))
		.route("/api/posts", post(routes::posts::create_post))
		.route("/api/posts/{id}/like", post(routes::likes::toggle_like))
		.route("/api/posts/{id}/reply", post(routes::replies::create_reply))
		.route(
			"/api/upload/image",
			post(routes::upload::upload_image).layer(DefaultBodyLimit::max(
				state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
			)),
		)
		.route("/api/twitter/check", get(routes::twitter::check_connection))
		.route("/api/twitter/disconnect", post(routes::twitter::disconnect))
		.build(state.clone());

	Router::new()
		.merge(public)
		.merge(optional)
		.merge(authed)
		.nest_service("/uploads", uploads)
		.with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
